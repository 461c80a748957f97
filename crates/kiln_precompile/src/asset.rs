//! Compiled asset values handed out by an [`AssetResolver`](crate::AssetResolver).

use std::io::Write;
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;
use kiln_common::{digest_path, ContentHash};

use crate::error::PrecompileError;

/// The compiled bytes of one logical asset.
///
/// The digest is taken over the compiled bytes, so two assets with identical
/// output share a content-addressed path regardless of their sources.
#[derive(Debug, Clone)]
pub struct CompiledAsset {
    logical_path: String,
    content: Vec<u8>,
    digest: ContentHash,
}

impl CompiledAsset {
    /// Wraps compiled bytes for `logical_path`.
    pub fn new(logical_path: impl Into<String>, content: Vec<u8>) -> Self {
        let digest = ContentHash::from_bytes(&content);
        Self {
            logical_path: logical_path.into(),
            content,
            digest,
        }
    }

    /// The logical path, which is also the plain output path.
    pub fn logical_path(&self) -> &str {
        &self.logical_path
    }

    /// The compiled bytes.
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Digest of the compiled bytes.
    pub fn digest(&self) -> ContentHash {
        self.digest
    }

    /// The content-addressed output path, e.g. `app-<digest>.js`.
    pub fn digest_path(&self) -> String {
        digest_path(&self.logical_path, &self.digest.to_string())
    }

    /// Writes the compiled bytes to `path`.
    pub fn write_to(&self, path: &Path) -> Result<(), PrecompileError> {
        std::fs::write(path, &self.content).map_err(|e| PrecompileError::io(path, e))
    }

    /// Writes a gzip-compressed copy of the compiled bytes to `path`.
    pub fn write_gzip_to(&self, path: &Path) -> Result<(), PrecompileError> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
        encoder
            .write_all(&self.content)
            .map_err(|e| PrecompileError::io(path, e))?;
        let compressed = encoder.finish().map_err(|e| PrecompileError::io(path, e))?;
        std::fs::write(path, compressed).map_err(|e| PrecompileError::io(path, e))
    }
}
