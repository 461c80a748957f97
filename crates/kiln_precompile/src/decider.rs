//! Per-asset recompilation decisions.

use std::path::{Path, PathBuf};

use crate::error::PrecompileError;
use crate::resolver::AssetResolver;
use crate::store::DigestStore;

/// What to do with one logical path in the current pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Sources changed, or the previous output is gone: compile and write.
    Recompile,
    /// Sources unchanged and the previous output is on disk.
    Reuse {
        /// The output path recorded by the previous run.
        output_path: String,
    },
    /// Non-digest pass following a digest pass: trust its manifest as is.
    SkipCheck {
        /// The output path recorded by the digest pass.
        output_path: String,
    },
}

/// Compares fresh source digests against the previous run.
pub struct Decider {
    target: PathBuf,
    nondigest_after_digest: bool,
}

impl Decider {
    /// Creates a decider checking outputs under `target`.
    ///
    /// With `nondigest_after_digest`, paths the digest pass recorded are
    /// never re-digested or checked on disk.
    pub fn new(target: &Path, nondigest_after_digest: bool) -> Self {
        Self {
            target: target.to_path_buf(),
            nondigest_after_digest,
        }
    }

    /// Decides the fate of `logical_path`, recording its source digest in
    /// the pending half of `store` first.
    ///
    /// Returns `None` when the resolver cannot resolve the path; nothing is
    /// recorded in that case.
    pub fn decide(
        &self,
        logical_path: &str,
        resolver: &dyn AssetResolver,
        store: &mut DigestStore,
    ) -> Result<Option<Decision>, PrecompileError> {
        if self.nondigest_after_digest {
            if let Some(output_path) = store.previous_output_path(logical_path) {
                let output_path = output_path.to_string();
                if let Some(digest) = store.previous_source_digest(logical_path) {
                    let digest = digest.to_string();
                    store.record_source_digest(logical_path, digest);
                }
                return Ok(Some(Decision::SkipCheck { output_path }));
            }
        }

        let Some(digest) = resolver.source_digest(logical_path)? else {
            return Ok(None);
        };
        let unchanged = store.previous_source_digest(logical_path) == Some(digest.as_str());
        let previous_output = store.previous_output_path(logical_path).map(str::to_string);
        store.record_source_digest(logical_path, digest);

        match previous_output {
            Some(output_path) if unchanged && self.target.join(&output_path).is_file() => {
                Ok(Some(Decision::Reuse { output_path }))
            }
            _ => Ok(Some(Decision::Recompile)),
        }
    }
}
