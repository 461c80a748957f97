//! Error types for precompilation.

use std::path::{Path, PathBuf};

/// Errors that can abort a precompile pass.
///
/// Every variant is fatal for the pass that raised it. A missing or corrupt
/// previous manifest is not an error: it loads as `None` and the pass
/// recompiles everything.
#[derive(Debug, thiserror::Error)]
pub enum PrecompileError {
    /// An I/O error occurred while reading, writing or deleting a file.
    #[error("precompile I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The manifest could not be serialized.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Description of the serialization failure.
        reason: String,
    },

    /// The asset resolver failed on a logical path.
    #[error("failed to resolve asset '{logical_path}': {reason}")]
    Resolve {
        /// The logical path being resolved.
        logical_path: String,
        /// Description of the resolution failure.
        reason: String,
    },

    /// The compressible-file pattern is not a valid regular expression.
    #[error("invalid compression pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Description of the regex error.
        reason: String,
    },

    /// The cleanup root does not contain the target directory.
    #[error("cleanup root {} does not contain target {}", root.display(), target.display())]
    OutputRoot {
        /// The configured cleanup root.
        root: PathBuf,
        /// The target directory outputs are written to.
        target: PathBuf,
    },
}

impl PrecompileError {
    /// Wraps an I/O error with the path it occurred at.
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
