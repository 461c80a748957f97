//! Digest bookkeeping for a single precompile pass.

use crate::manifest::Manifest;

/// The loaded and the accumulating halves of the digest state.
///
/// `current` holds what the previous run persisted and is never mutated.
/// `pending` starts empty, collects this pass's entries, and replaces
/// `current` wholesale when the pass persists its manifest.
#[derive(Debug, Clone, Default)]
pub struct DigestStore {
    current: Manifest,
    pending: Manifest,
}

impl DigestStore {
    /// Creates a store whose current half is `current`.
    pub fn new(current: Manifest) -> Self {
        Self {
            current,
            pending: Manifest::default(),
        }
    }

    /// The state loaded from the previous run.
    pub fn current(&self) -> &Manifest {
        &self.current
    }

    /// The entries recorded so far in this pass.
    pub fn pending(&self) -> &Manifest {
        &self.pending
    }

    /// Source digest the previous run recorded for `logical_path`.
    pub fn previous_source_digest(&self, logical_path: &str) -> Option<&str> {
        self.current
            .source_digests
            .get(logical_path)
            .map(String::as_str)
    }

    /// Output path the previous run recorded for `logical_path`.
    pub fn previous_output_path(&self, logical_path: &str) -> Option<&str> {
        self.current
            .asset_digests
            .get(logical_path)
            .map(String::as_str)
    }

    /// Records the source digest computed (or carried over) in this pass.
    pub fn record_source_digest(&mut self, logical_path: &str, digest: String) {
        self.pending
            .source_digests
            .insert(logical_path.to_string(), digest);
    }

    /// Records where this pass left the asset's bytes.
    pub fn record_output_path(&mut self, logical_path: &str, output_path: String) {
        self.pending
            .asset_digests
            .insert(logical_path.to_string(), output_path);
    }

    /// Drops everything recorded for `logical_path` in this pass.
    pub fn forget(&mut self, logical_path: &str) {
        self.pending.source_digests.remove(logical_path);
        self.pending.asset_digests.remove(logical_path);
    }

    /// Consumes the store, returning this pass's manifest.
    pub fn into_pending(self) -> Manifest {
        self.pending
    }
}
