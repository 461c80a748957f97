//! Writes compiled assets into the target directory.

use std::path::{Path, PathBuf};

use regex::Regex;

use crate::asset::CompiledAsset;
use crate::error::PrecompileError;

/// Output paths matching this pattern also get a `.gz` companion.
pub const DEFAULT_COMPRESS_PATTERN: &str = r"\.(?:css|html|js|svg|txt|xml)$";

/// Compiles a compressible-file pattern.
pub fn compile_compress_pattern(pattern: &str) -> Result<Regex, PrecompileError> {
    Regex::new(pattern).map_err(|e| PrecompileError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

/// Places compiled bytes at their output path under the target directory.
pub struct AssetWriter {
    target: PathBuf,
    digest: bool,
    compress: Regex,
}

impl AssetWriter {
    /// Creates a writer. With `digest`, assets are written at their
    /// content-addressed path instead of their logical path.
    pub fn new(target: &Path, digest: bool, compress: Regex) -> Self {
        Self {
            target: target.to_path_buf(),
            digest,
            compress,
        }
    }

    /// The output path `asset` will be written at, relative to the target.
    pub fn output_path(&self, asset: &CompiledAsset) -> String {
        if self.digest {
            asset.digest_path()
        } else {
            asset.logical_path().to_string()
        }
    }

    /// Returns `true` if `output_path` gets a gzip companion.
    pub fn is_compressible(&self, output_path: &str) -> bool {
        self.compress.is_match(output_path)
    }

    /// Writes `asset` (and its gzip companion when compressible) and returns
    /// the output path to record in the manifest.
    pub fn write(&self, asset: &CompiledAsset) -> Result<String, PrecompileError> {
        let output_path = self.output_path(asset);
        let filename = self.target.join(&output_path);
        if let Some(parent) = filename.parent() {
            std::fs::create_dir_all(parent).map_err(|e| PrecompileError::io(parent, e))?;
        }

        asset.write_to(&filename)?;
        if self.is_compressible(&output_path) {
            let gz = self.target.join(format!("{output_path}.gz"));
            asset.write_gzip_to(&gz)?;
        }
        tracing::debug!(
            logical_path = asset.logical_path(),
            %output_path,
            digest = %asset.digest().short(),
            "Wrote asset"
        );
        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;

    fn writer(target: &Path, digest: bool) -> AssetWriter {
        AssetWriter::new(
            target,
            digest,
            compile_compress_pattern(DEFAULT_COMPRESS_PATTERN).unwrap(),
        )
    }

    #[test]
    fn digest_mode_writes_content_addressed_path() {
        let dir = tempfile::tempdir().unwrap();
        let asset = CompiledAsset::new("javascripts/app.js", b"var a;".to_vec());
        let out = writer(dir.path(), true).write(&asset).unwrap();
        assert_eq!(out, asset.digest_path());
        assert_eq!(std::fs::read(dir.path().join(&out)).unwrap(), b"var a;");
    }

    #[test]
    fn plain_mode_writes_logical_path() {
        let dir = tempfile::tempdir().unwrap();
        let asset = CompiledAsset::new("site.css", b"p {}".to_vec());
        let out = writer(dir.path(), false).write(&asset).unwrap();
        assert_eq!(out, "site.css");
        assert!(dir.path().join("site.css").is_file());
    }

    #[test]
    fn compressible_output_gets_gzip_companion() {
        let dir = tempfile::tempdir().unwrap();
        let asset = CompiledAsset::new("site.css", b"p { color: blue }".to_vec());
        let out = writer(dir.path(), true).write(&asset).unwrap();

        let gz = std::fs::File::open(dir.path().join(format!("{out}.gz"))).unwrap();
        let mut decoded = Vec::new();
        GzDecoder::new(gz).read_to_end(&mut decoded).unwrap();
        assert_eq!(decoded, b"p { color: blue }");
    }

    #[test]
    fn binary_output_has_no_gzip_companion() {
        let dir = tempfile::tempdir().unwrap();
        let asset = CompiledAsset::new("images/logo.png", vec![0x89, b'P', b'N', b'G']);
        let out = writer(dir.path(), true).write(&asset).unwrap();
        assert!(dir.path().join(&out).is_file());
        assert!(!dir.path().join(format!("{out}.gz")).exists());
    }

    #[test]
    fn custom_pattern_controls_compression() {
        let dir = tempfile::tempdir().unwrap();
        let w = AssetWriter::new(dir.path(), false, compile_compress_pattern(r"\.json$").unwrap());
        assert!(w.is_compressible("data/feed.json"));
        assert!(!w.is_compressible("app.js"));
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let err = compile_compress_pattern("(unclosed").unwrap_err();
        assert!(matches!(err, PrecompileError::InvalidPattern { .. }));
    }
}
