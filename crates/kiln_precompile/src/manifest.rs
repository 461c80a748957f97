//! The persisted precompile manifest.
//!
//! The manifest is stored as `manifest.json` in the target directory. It maps
//! every logical path to the source digest it was compiled from and to the
//! output path its bytes were written at. It is the only state carried from
//! one run to the next.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::PrecompileError;

/// Name of the manifest file within the target directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Source digests and output paths keyed by logical path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Logical path to the digest over all raw sources of that asset.
    #[serde(default)]
    pub source_digests: BTreeMap<String, String>,

    /// Logical path to the output path, relative to the target directory.
    #[serde(default)]
    pub asset_digests: BTreeMap<String, String>,
}

impl Manifest {
    /// Creates a manifest from the two mappings.
    pub fn new(
        source_digests: BTreeMap<String, String>,
        asset_digests: BTreeMap<String, String>,
    ) -> Self {
        Self {
            source_digests,
            asset_digests,
        }
    }

    /// Returns the manifest file location inside `target`.
    pub fn path(target: &Path) -> PathBuf {
        target.join(MANIFEST_FILE)
    }

    /// Loads the manifest from the target directory, returning `None` if
    /// the file doesn't exist or can't be parsed.
    ///
    /// Any error results in `None`, which makes the next pass treat every
    /// asset as stale.
    pub fn load(target: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(Self::path(target)).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Writes the manifest to the target directory, replacing any previous one.
    ///
    /// Creates the target directory if it doesn't exist.
    pub fn save(&self, target: &Path) -> Result<(), PrecompileError> {
        std::fs::create_dir_all(target).map_err(|e| PrecompileError::io(target, e))?;
        let path = Self::path(target);
        let json =
            serde_json::to_string_pretty(self).map_err(|e| PrecompileError::Serialization {
                reason: e.to_string(),
            })?;
        std::fs::write(&path, json).map_err(|e| PrecompileError::io(&path, e))
    }

    /// Returns `true` if neither mapping has entries.
    pub fn is_empty(&self) -> bool {
        self.source_digests.is_empty() && self.asset_digests.is_empty()
    }
}
