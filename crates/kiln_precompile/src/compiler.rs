//! The precompile pass.
//!
//! `StaticCompiler` ties the resolver, decider, writer, projector, manifest
//! and sweeper together into one sequential pass over every logical path.
//! Its outcome carries the new digests back to the caller, which feeds them
//! into the next pass (typically a non-digest pass after a digest pass).

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Instant;

use kiln_common::{embedded_digest, normalize_logical_path};

use crate::decider::{Decider, Decision};
use crate::error::PrecompileError;
use crate::manifest::Manifest;
use crate::nondigest::NondigestProjector;
use crate::resolver::AssetResolver;
use crate::store::DigestStore;
use crate::sweeper::{SweepReport, Sweeper};
use crate::writer::{compile_compress_pattern, AssetWriter, DEFAULT_COMPRESS_PATTERN};

/// Construction parameters for one pass.
#[derive(Debug, Clone)]
pub struct PrecompileOptions {
    /// Directory outputs and the manifest are written to.
    pub target: PathBuf,
    /// Search paths handed to the resolver for enumeration.
    pub paths: Vec<PathBuf>,
    /// Write content-addressed output paths.
    pub digest: bool,
    /// Persist the manifest (and allow cleanup).
    pub manifest: bool,
    /// Sweep unreferenced outputs after the pass. Requires `manifest`.
    pub clean_after_precompile: bool,
    /// A digest pass already ran; only meaningful when `digest` is off.
    pub digest_precompiled: bool,
    /// Source digests from the previous run.
    pub source_digests: BTreeMap<String, String>,
    /// Output paths from the previous run.
    pub asset_digests: BTreeMap<String, String>,
    /// Regular expression selecting output paths that get a `.gz` companion.
    pub compress: String,
    /// Root of the tree the sweeper cleans. Defaults to `target`.
    pub output_root: Option<PathBuf>,
}

impl PrecompileOptions {
    /// Default digest-pass options writing into `target`.
    pub fn new(target: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
            paths: Vec::new(),
            digest: true,
            manifest: true,
            clean_after_precompile: true,
            digest_precompiled: false,
            source_digests: BTreeMap::new(),
            asset_digests: BTreeMap::new(),
            compress: DEFAULT_COMPRESS_PATTERN.to_string(),
            output_root: None,
        }
    }

    /// Seeds the previous-run digests from a loaded manifest.
    pub fn with_previous(mut self, previous: Manifest) -> Self {
        self.source_digests = previous.source_digests;
        self.asset_digests = previous.asset_digests;
        self
    }

    /// Options for a non-digest pass following the pass that produced
    /// `outcome`. The follow-up pass neither persists a manifest nor sweeps.
    pub fn nondigest_after(&self, outcome: &PrecompileOutcome) -> Self {
        Self {
            digest: false,
            manifest: false,
            clean_after_precompile: false,
            digest_precompiled: outcome.digest_precompiled,
            source_digests: outcome.source_digests.clone(),
            asset_digests: outcome.asset_digests.clone(),
            ..self.clone()
        }
    }

    /// Whether this pass reuses the digests of a preceding digest pass.
    pub fn nondigest_after_digest(&self) -> bool {
        !self.digest && self.digest_precompiled
    }

    fn sweep_root(&self) -> &Path {
        self.output_root.as_deref().unwrap_or(&self.target)
    }
}

/// Per-pass counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrecompileStats {
    /// Assets compiled and written.
    pub compiled: usize,
    /// Assets whose previous output was kept as is.
    pub reused: usize,
    /// Plain copies derived from digest assets.
    pub projected: usize,
    /// Logical paths the resolver could not resolve.
    pub skipped: usize,
}

/// What a completed pass hands back to the host.
#[derive(Debug, Clone)]
pub struct PrecompileOutcome {
    /// Source digests of every asset this pass handled.
    pub source_digests: BTreeMap<String, String>,
    /// Output paths of every asset this pass handled.
    pub asset_digests: BTreeMap<String, String>,
    /// `true` once digest assets exist for these entries.
    pub digest_precompiled: bool,
    /// Counters for this pass.
    pub stats: PrecompileStats,
    /// Cleanup result, when the sweeper ran.
    pub sweep: Option<SweepReport>,
}

impl PrecompileOutcome {
    /// The outcome's digests as a manifest.
    pub fn manifest(&self) -> Manifest {
        Manifest::new(self.source_digests.clone(), self.asset_digests.clone())
    }
}

/// Runs one precompile pass against a resolver.
pub struct StaticCompiler<'r> {
    resolver: &'r dyn AssetResolver,
    options: PrecompileOptions,
}

impl<'r> StaticCompiler<'r> {
    /// Creates a compiler for one pass.
    pub fn new(resolver: &'r dyn AssetResolver, options: PrecompileOptions) -> Self {
        Self { resolver, options }
    }

    /// Runs the pass: decide and write every logical path, then persist the
    /// manifest and sweep when enabled.
    ///
    /// Any error aborts the pass and leaves the target directory as it was
    /// at that point; the manifest is only written once every path is done.
    pub fn compile(self) -> Result<PrecompileOutcome, PrecompileError> {
        let start = Instant::now();
        let opts = &self.options;
        let nondigest_after_digest = opts.nondigest_after_digest();

        let mut store = DigestStore::new(Manifest::new(
            opts.source_digests.clone(),
            opts.asset_digests.clone(),
        ));
        let writer = AssetWriter::new(
            &opts.target,
            opts.digest,
            compile_compress_pattern(&opts.compress)?,
        );
        let projector = NondigestProjector::new(&opts.target, &store.current().asset_digests)?;
        if nondigest_after_digest {
            tracing::debug!(
                known_digests = projector.known_digests().len(),
                "Projecting plain copies from digest assets"
            );
        }
        let decider = Decider::new(&opts.target, nondigest_after_digest);
        let sweeper = if opts.manifest && opts.clean_after_precompile {
            Some(Sweeper::for_target(opts.sweep_root(), &opts.target)?)
        } else {
            None
        };

        let mut stats = PrecompileStats::default();
        let mut seen = HashSet::new();

        for raw in self.resolver.logical_paths(&opts.paths)? {
            let logical_path = normalize_logical_path(&raw);
            if !seen.insert(logical_path.clone()) {
                tracing::debug!(%logical_path, "Already processed under another name");
                continue;
            }

            let Some(decision) = decider.decide(&logical_path, self.resolver, &mut store)? else {
                tracing::debug!(%logical_path, "Skipping asset the resolver cannot find");
                stats.skipped += 1;
                continue;
            };

            // A plain output left by an earlier non-digest run can't stand in
            // for a content-addressed one.
            let decision = match decision {
                Decision::Reuse { ref output_path }
                    if opts.digest && embedded_digest(output_path).is_none() =>
                {
                    Decision::Recompile
                }
                decision => decision,
            };

            match decision {
                Decision::Recompile => match self.resolver.find_asset(&logical_path)? {
                    Some(asset) => {
                        let output_path = writer.write(&asset)?;
                        store.record_output_path(&logical_path, output_path);
                        stats.compiled += 1;
                    }
                    None => {
                        tracing::debug!(%logical_path, "Asset vanished before compilation");
                        store.forget(&logical_path);
                        stats.skipped += 1;
                    }
                },
                Decision::Reuse { output_path } if !opts.digest && output_path != logical_path => {
                    // The plain copy replaces the digest file as this asset's output.
                    projector.project(&logical_path, &output_path)?;
                    stats.projected += 1;
                    store.record_output_path(&logical_path, logical_path.clone());
                }
                Decision::Reuse { output_path } | Decision::SkipCheck { output_path } => {
                    if !opts.digest && output_path != logical_path {
                        projector.project(&logical_path, &output_path)?;
                        stats.projected += 1;
                    } else {
                        tracing::debug!(
                            %logical_path,
                            digest = short_digest(store.pending().source_digests.get(&logical_path)),
                            "Not compiling, sources digest has not changed"
                        );
                        stats.reused += 1;
                    }
                    store.record_output_path(&logical_path, output_path);
                }
            }
        }

        let manifest = store.into_pending();
        if opts.manifest {
            manifest.save(&opts.target)?;
        }

        let sweep = sweeper.map(|s| s.sweep(&manifest)).transpose()?;

        tracing::info!(
            mode = if opts.digest { "digest" } else { "non-digest" },
            compiled = stats.compiled,
            reused = stats.reused,
            projected = stats.projected,
            skipped = stats.skipped,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Processed assets"
        );

        Ok(PrecompileOutcome {
            source_digests: manifest.source_digests,
            asset_digests: manifest.asset_digests,
            digest_precompiled: opts.digest || nondigest_after_digest,
            stats,
            sweep,
        })
    }
}

fn short_digest(digest: Option<&String>) -> &str {
    digest.map(|d| d.get(..7).unwrap_or(d)).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_are_a_digest_pass() {
        let opts = PrecompileOptions::new("public/assets");
        assert!(opts.digest);
        assert!(opts.manifest);
        assert!(opts.clean_after_precompile);
        assert!(!opts.nondigest_after_digest());
        assert_eq!(opts.sweep_root(), Path::new("public/assets"));
    }

    #[test]
    fn nondigest_after_carries_outcome() {
        let opts = PrecompileOptions::new("out");
        let outcome = PrecompileOutcome {
            source_digests: BTreeMap::from([("a.js".into(), "s".into())]),
            asset_digests: BTreeMap::from([("a.js".into(), "a-d.js".into())]),
            digest_precompiled: true,
            stats: PrecompileStats::default(),
            sweep: None,
        };
        let next = opts.nondigest_after(&outcome);
        assert!(!next.digest);
        assert!(!next.manifest);
        assert!(!next.clean_after_precompile);
        assert!(next.nondigest_after_digest());
        assert_eq!(next.asset_digests["a.js"], "a-d.js");
        assert_eq!(next.target, PathBuf::from("out"));
    }

    #[test]
    fn output_root_overrides_sweep_root() {
        let mut opts = PrecompileOptions::new("public/assets");
        opts.output_root = Some(PathBuf::from("public"));
        assert_eq!(opts.sweep_root(), Path::new("public"));
    }

    #[test]
    fn short_digest_truncates() {
        let d = "abcdef0123".to_string();
        assert_eq!(short_digest(Some(&d)), "abcdef0");
        assert_eq!(short_digest(None), "");
    }
}
