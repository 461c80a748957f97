//! Plain-named copies derived from already written digest assets.
//!
//! When a non-digest pass follows a digest pass, recompiling every asset a
//! second time is wasted work. Instead the plain file is projected from the
//! digest file: text assets have the digest tokens they reference removed,
//! everything else is copied byte for byte.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use kiln_common::embedded_digest;
use regex::bytes::Regex;

use crate::error::PrecompileError;

/// Extensions whose content may reference other assets by digest path.
const TEXT_EXTENSIONS: [&str; 2] = ["js", "css"];

/// Projects digest assets onto their logical paths.
pub struct NondigestProjector {
    target: PathBuf,
    known_digests: Vec<String>,
    tokens: Option<Regex>,
}

impl NondigestProjector {
    /// Creates a projector that strips every digest embedded in the output
    /// paths of `asset_digests`.
    pub fn new(
        target: &Path,
        asset_digests: &BTreeMap<String, String>,
    ) -> Result<Self, PrecompileError> {
        let mut known_digests: Vec<String> = asset_digests
            .values()
            .filter_map(|path| embedded_digest(path))
            .map(str::to_string)
            .collect();
        known_digests.sort();
        known_digests.dedup();

        let tokens = if known_digests.is_empty() {
            None
        } else {
            let alternatives: Vec<String> = known_digests
                .iter()
                .map(|d| format!("-{}", regex::escape(d)))
                .collect();
            let pattern = alternatives.join("|");
            let re = Regex::new(&pattern).map_err(|e| PrecompileError::InvalidPattern {
                pattern,
                reason: e.to_string(),
            })?;
            Some(re)
        };

        Ok(Self {
            target: target.to_path_buf(),
            known_digests,
            tokens,
        })
    }

    /// Digests this projector removes from text assets.
    pub fn known_digests(&self) -> &[String] {
        &self.known_digests
    }

    /// Removes every `-<digest>` token of a known digest from `body`.
    ///
    /// Works on raw bytes; the body need not be valid UTF-8.
    pub fn strip_digests(&self, body: &[u8]) -> Vec<u8> {
        match self.tokens {
            Some(ref re) => re.replace_all(body, &b""[..]).into_owned(),
            None => body.to_vec(),
        }
    }

    /// Writes `target/logical_path` from the digest file at
    /// `target/digest_path`.
    pub fn project(&self, logical_path: &str, digest_path: &str) -> Result<(), PrecompileError> {
        let source = self.target.join(digest_path);
        let dest = self.target.join(logical_path);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| PrecompileError::io(parent, e))?;
        }

        if is_text_asset(digest_path) {
            let mtime = fs::metadata(&source)
                .and_then(|m| m.modified())
                .map_err(|e| PrecompileError::io(&source, e))?;
            let body = fs::read(&source).map_err(|e| PrecompileError::io(&source, e))?;
            fs::write(&dest, self.strip_digests(&body))
                .map_err(|e| PrecompileError::io(&dest, e))?;
            File::options()
                .write(true)
                .open(&dest)
                .and_then(|f| f.set_modified(mtime))
                .map_err(|e| PrecompileError::io(&dest, e))?;
            tracing::debug!(
                logical_path,
                digest_path,
                "Stripped digests, copied to logical path and kept mtime"
            );
        } else {
            if dest.exists() {
                fs::remove_file(&dest).map_err(|e| PrecompileError::io(&dest, e))?;
            }
            fs::copy(&source, &dest).map_err(|e| PrecompileError::io(&source, e))?;
            tracing::debug!(logical_path, digest_path, "Copied digest asset to logical path");
        }
        Ok(())
    }
}

fn is_text_asset(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| TEXT_EXTENSIONS.contains(&ext))
}
