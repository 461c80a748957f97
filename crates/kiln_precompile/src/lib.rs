//! Incremental static-asset precompilation.
//!
//! This crate decides which assets need recompiling by comparing source
//! digests against the previous run's manifest, writes only changed outputs
//! (with gzip companions for compressible types), derives plain-named copies
//! from digest assets without recompiling them, persists the manifest, and
//! sweeps orphaned files out of the output tree.

#![warn(missing_docs)]

pub mod asset;
pub mod compiler;
pub mod decider;
pub mod error;
pub mod manifest;
pub mod nondigest;
pub mod resolver;
pub mod store;
pub mod sweeper;
pub mod writer;

pub use asset::CompiledAsset;
pub use compiler::{PrecompileOptions, PrecompileOutcome, PrecompileStats, StaticCompiler};
pub use decider::{Decider, Decision};
pub use error::PrecompileError;
pub use manifest::{Manifest, MANIFEST_FILE};
pub use nondigest::NondigestProjector;
pub use resolver::{AssetResolver, DirectoryResolver};
pub use store::DigestStore;
pub use sweeper::{SweepReport, Sweeper};
pub use writer::{compile_compress_pattern, AssetWriter, DEFAULT_COMPRESS_PATTERN};
