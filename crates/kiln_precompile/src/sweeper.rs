//! Removal of output files no longer referenced by the manifest.
//!
//! Files go first, then directories deepest first, so a directory emptied by
//! the file pass is removed in the same sweep.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::PrecompileError;
use crate::manifest::{Manifest, MANIFEST_FILE};
use crate::resolver::relative_slash_path;

/// What a sweep deleted, as `/`-separated paths relative to the root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Files removed.
    pub files_removed: Vec<String>,
    /// Directories removed after becoming empty.
    pub dirs_removed: Vec<String>,
}

impl SweepReport {
    /// Returns `true` if nothing was deleted.
    pub fn is_empty(&self) -> bool {
        self.files_removed.is_empty() && self.dirs_removed.is_empty()
    }
}

/// Deletes everything under an output root that the manifest doesn't name.
///
/// Manifest entries are relative to the target directory, which is either
/// the root itself or somewhere below it.
pub struct Sweeper {
    root: PathBuf,
    target_prefix: String,
}

impl Sweeper {
    /// Creates a sweeper over `root` for outputs written directly into it.
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            target_prefix: String::new(),
        }
    }

    /// Creates a sweeper over `root` for outputs written into `target`.
    ///
    /// Fails if `target` is not `root` or a directory below it.
    pub fn for_target(root: &Path, target: &Path) -> Result<Self, PrecompileError> {
        let target_prefix =
            relative_slash_path(root, target).ok_or_else(|| PrecompileError::OutputRoot {
                root: root.to_path_buf(),
                target: target.to_path_buf(),
            })?;
        Ok(Self {
            root: root.to_path_buf(),
            target_prefix,
        })
    }

    /// The files a sweep keeps, relative to the root: every output path, the
    /// manifest itself, and the `.gz` companion of each.
    pub fn known_files(&self, manifest: &Manifest) -> HashSet<String> {
        let mut known = HashSet::new();
        for file in manifest
            .asset_digests
            .values()
            .map(String::as_str)
            .chain([MANIFEST_FILE])
        {
            let rel = if self.target_prefix.is_empty() {
                file.to_string()
            } else {
                format!("{}/{file}", self.target_prefix)
            };
            known.insert(format!("{rel}.gz"));
            known.insert(rel);
        }
        known
    }

    /// Removes unknown files, then empty directories, under the root.
    pub fn sweep(&self, manifest: &Manifest) -> Result<SweepReport, PrecompileError> {
        let mut report = SweepReport::default();
        if !self.root.is_dir() {
            return Ok(report);
        }

        let known = self.known_files(manifest);
        let mut files = Vec::new();
        let mut dirs = Vec::new();
        walk_dir(&self.root, &mut files, &mut dirs)?;

        for path in files {
            let Some(rel) = relative_slash_path(&self.root, &path) else {
                continue;
            };
            if !known.contains(&rel) {
                std::fs::remove_file(&path).map_err(|e| PrecompileError::io(&path, e))?;
                tracing::debug!(path = %rel, "Deleted old asset");
                report.files_removed.push(rel);
            }
        }

        for dir in dirs.iter().rev() {
            let mut entries = std::fs::read_dir(dir).map_err(|e| PrecompileError::io(dir, e))?;
            if entries.next().is_none() {
                std::fs::remove_dir(dir).map_err(|e| PrecompileError::io(dir, e))?;
                if let Some(rel) = relative_slash_path(&self.root, dir) {
                    tracing::debug!(path = %rel, "Removed empty directory");
                    report.dirs_removed.push(rel);
                }
            }
        }

        Ok(report)
    }
}

/// Collects regular files and directories under `dir`, directories in
/// pre-order so that reversing the list visits children before parents.
fn walk_dir(
    dir: &Path,
    files: &mut Vec<PathBuf>,
    dirs: &mut Vec<PathBuf>,
) -> Result<(), PrecompileError> {
    let mut entries = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| PrecompileError::io(dir, e))? {
        let entry = entry.map_err(|e| PrecompileError::io(dir, e))?;
        entries.push(entry.path());
    }
    entries.sort();

    for path in entries {
        let meta = std::fs::symlink_metadata(&path).map_err(|e| PrecompileError::io(&path, e))?;
        if meta.is_dir() {
            dirs.push(path.clone());
            walk_dir(&path, files, dirs)?;
        } else if path.is_file() {
            files.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn manifest(outputs: &[(&str, &str)]) -> Manifest {
        let asset_digests: BTreeMap<String, String> = outputs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Manifest::new(BTreeMap::new(), asset_digests)
    }

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, rel).unwrap();
    }

    #[test]
    fn known_files_include_manifest_and_gz() {
        let dir = tempfile::tempdir().unwrap();
        let known = Sweeper::new(dir.path()).known_files(&manifest(&[("a.js", "a-1.js")]));
        assert!(known.contains("a-1.js"));
        assert!(known.contains("a-1.js.gz"));
        assert!(known.contains(MANIFEST_FILE));
        assert!(known.contains(&format!("{MANIFEST_FILE}.gz")));
        assert_eq!(known.len(), 4);
    }

    #[test]
    fn sweep_removes_unknown_and_keeps_known() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(root, "a-1.js");
        touch(root, "a-1.js.gz");
        touch(root, MANIFEST_FILE);
        touch(root, "a-0.js");
        touch(root, "a-0.js.gz");

        let report = Sweeper::new(root)
            .sweep(&manifest(&[("a.js", "a-1.js")]))
            .unwrap();

        assert_eq!(report.files_removed, vec!["a-0.js", "a-0.js.gz"]);
        assert!(root.join("a-1.js").is_file());
        assert!(root.join("a-1.js.gz").is_file());
        assert!(root.join(MANIFEST_FILE).is_file());
        assert!(!root.join("a-0.js").exists());
    }

    #[test]
    fn sweep_removes_emptied_directories_deepest_first() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(root, "old/nested/deeper/x.png");
        touch(root, "images/logo-1.png");
        touch(root, "images/stale/y.png");

        let report = Sweeper::new(root)
            .sweep(&manifest(&[("images/logo.png", "images/logo-1.png")]))
            .unwrap();

        assert_eq!(
            report.dirs_removed,
            vec!["old/nested/deeper", "old/nested", "old", "images/stale"]
        );
        assert!(!root.join("old").exists());
        assert!(root.join("images/logo-1.png").is_file());
        assert!(root.exists());
    }

    #[test]
    fn sweep_removes_preexisting_empty_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("empty/inner")).unwrap();
        let report = Sweeper::new(dir.path()).sweep(&manifest(&[])).unwrap();
        assert_eq!(report.dirs_removed, vec!["empty/inner", "empty"]);
    }

    #[test]
    fn sweep_above_target_keeps_prefixed_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let target = root.join("assets");
        touch(root, "assets/a-1.js");
        touch(root, "assets/a-1.js.gz");
        touch(root, &format!("assets/{MANIFEST_FILE}"));
        touch(root, "assets/a-0.js");
        touch(root, "a-1.js");

        let report = Sweeper::for_target(root, &target)
            .unwrap()
            .sweep(&manifest(&[("a.js", "a-1.js")]))
            .unwrap();

        assert_eq!(report.files_removed, vec!["a-1.js", "assets/a-0.js"]);
        assert!(target.join("a-1.js").is_file());
        assert!(target.join("a-1.js.gz").is_file());
        assert!(target.join(MANIFEST_FILE).is_file());
    }

    #[test]
    fn target_outside_root_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = Sweeper::for_target(&dir.path().join("packs"), &dir.path().join("assets"))
            .err()
            .unwrap();
        assert!(matches!(err, PrecompileError::OutputRoot { .. }));
    }

    #[test]
    fn for_target_at_root_matches_new() {
        let dir = tempfile::tempdir().unwrap();
        let m = manifest(&[("a.js", "a-1.js")]);
        assert_eq!(
            Sweeper::for_target(dir.path(), dir.path())
                .unwrap()
                .known_files(&m),
            Sweeper::new(dir.path()).known_files(&m)
        );
    }

    #[test]
    fn sweep_missing_root_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let report = Sweeper::new(&dir.path().join("nope"))
            .sweep(&manifest(&[]))
            .unwrap();
        assert!(report.is_empty());
    }
}
