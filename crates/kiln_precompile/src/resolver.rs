//! The asset resolver seam and a plain-directory implementation.
//!
//! The precompiler never parses or transforms sources itself. It asks an
//! [`AssetResolver`] which logical paths exist, what their source digest is,
//! and for their compiled bytes when a recompile is due.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use kiln_common::ContentHash;

use crate::asset::CompiledAsset;
use crate::error::PrecompileError;

/// Capability interface over an asset pipeline.
///
/// Implementations must be deterministic within a pass: the same logical
/// path yields the same source digest until its sources change.
pub trait AssetResolver {
    /// Enumerates the logical paths reachable from `search_paths`, in the
    /// order they should be compiled.
    fn logical_paths(&self, search_paths: &[PathBuf]) -> Result<Vec<String>, PrecompileError>;

    /// Computes the digest over every raw source contributing to
    /// `logical_path`. Returns `None` if the path cannot be resolved.
    fn source_digest(&self, logical_path: &str) -> Result<Option<String>, PrecompileError>;

    /// Compiles `logical_path`. Returns `None` if the path cannot be resolved.
    fn find_asset(&self, logical_path: &str) -> Result<Option<CompiledAsset>, PrecompileError>;
}

/// Resolves assets as the files found under a list of root directories.
///
/// Compilation is the identity: the compiled bytes are the file's bytes, and
/// the source digest is the hash of those bytes. A logical path is the
/// file's path relative to its root, with `/` separators. `dir.ext` also
/// resolves to `dir/index.ext`.
pub struct DirectoryResolver {
    roots: Vec<PathBuf>,
}

impl DirectoryResolver {
    /// Creates a resolver over `roots`, searched in order.
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    /// Finds the file backing `logical_path` in the first root that has it.
    pub fn locate(&self, logical_path: &str) -> Option<PathBuf> {
        let index_path = index_candidate(logical_path);
        for root in &self.roots {
            let direct = root.join(logical_path);
            if direct.is_file() {
                return Some(direct);
            }
            if let Some(ref index_path) = index_path {
                let candidate = root.join(index_path);
                if candidate.is_file() {
                    return Some(candidate);
                }
            }
        }
        None
    }

    fn read(&self, logical_path: &str) -> Result<Option<Vec<u8>>, PrecompileError> {
        match self.locate(logical_path) {
            Some(path) => std::fs::read(&path)
                .map(Some)
                .map_err(|e| PrecompileError::io(&path, e)),
            None => Ok(None),
        }
    }
}

impl AssetResolver for DirectoryResolver {
    fn logical_paths(&self, search_paths: &[PathBuf]) -> Result<Vec<String>, PrecompileError> {
        let mut found = BTreeSet::new();
        for root in search_paths {
            if root.is_dir() {
                walk_dir(root, root, &mut found)?;
            }
        }
        Ok(found.into_iter().collect())
    }

    fn source_digest(&self, logical_path: &str) -> Result<Option<String>, PrecompileError> {
        Ok(self
            .read(logical_path)?
            .map(|bytes| ContentHash::from_bytes(&bytes).to_string()))
    }

    fn find_asset(&self, logical_path: &str) -> Result<Option<CompiledAsset>, PrecompileError> {
        Ok(self
            .read(logical_path)?
            .map(|bytes| CompiledAsset::new(logical_path, bytes)))
    }
}

/// `dir.ext` → `dir/index.ext`; `None` for top-level names.
fn index_candidate(logical_path: &str) -> Option<String> {
    let (dir, file) = logical_path.rsplit_once('/').unwrap_or(("", logical_path));
    let dot = file.find('.')?;
    let (stem, ext) = file.split_at(dot);
    if stem.is_empty() {
        return None;
    }
    if dir.is_empty() {
        Some(format!("{stem}/index{ext}"))
    } else {
        Some(format!("{dir}/{stem}/index{ext}"))
    }
}

/// Recursively collects files under `dir` as `/`-separated paths relative
/// to `root`. Dotfiles and dot-directories are skipped.
fn walk_dir(root: &Path, dir: &Path, found: &mut BTreeSet<String>) -> Result<(), PrecompileError> {
    let entries = std::fs::read_dir(dir).map_err(|e| PrecompileError::io(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| PrecompileError::io(dir, e))?;
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        let path = entry.path();
        if path.is_dir() {
            walk_dir(root, &path, found)?;
        } else if path.is_file() {
            if let Some(rel) = relative_slash_path(root, &path) {
                found.insert(rel);
            }
        }
    }
    Ok(())
}

/// Renders `path` relative to `root` with `/` separators.
pub(crate) fn relative_slash_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("javascripts/widgets")).unwrap();
        std::fs::create_dir_all(root.join(".cache")).unwrap();
        std::fs::write(root.join("javascripts/app.js"), "var app;").unwrap();
        std::fs::write(root.join("javascripts/widgets/index.js"), "var w;").unwrap();
        std::fs::write(root.join("site.css"), "body {}").unwrap();
        std::fs::write(root.join(".cache/junk"), "x").unwrap();
        dir
    }

    #[test]
    fn logical_paths_are_relative_and_sorted() {
        let dir = make_tree();
        let resolver = DirectoryResolver::new(vec![dir.path().to_path_buf()]);
        let paths = resolver.logical_paths(&[dir.path().to_path_buf()]).unwrap();
        assert_eq!(
            paths,
            vec![
                "javascripts/app.js".to_string(),
                "javascripts/widgets/index.js".to_string(),
                "site.css".to_string(),
            ]
        );
    }

    #[test]
    fn logical_paths_skip_missing_search_path() {
        let dir = make_tree();
        let resolver = DirectoryResolver::new(vec![]);
        let paths = resolver
            .logical_paths(&[dir.path().join("does-not-exist")])
            .unwrap();
        assert!(paths.is_empty());
    }

    #[test]
    fn source_digest_hashes_file_bytes() {
        let dir = make_tree();
        let resolver = DirectoryResolver::new(vec![dir.path().to_path_buf()]);
        let digest = resolver.source_digest("site.css").unwrap().unwrap();
        assert_eq!(digest, ContentHash::from_bytes(b"body {}").to_string());
    }

    #[test]
    fn unresolvable_path_is_none() {
        let dir = make_tree();
        let resolver = DirectoryResolver::new(vec![dir.path().to_path_buf()]);
        assert!(resolver.source_digest("nope.js").unwrap().is_none());
        assert!(resolver.find_asset("nope.js").unwrap().is_none());
    }

    #[test]
    fn index_file_resolves_from_collapsed_name() {
        let dir = make_tree();
        let resolver = DirectoryResolver::new(vec![dir.path().to_path_buf()]);
        let asset = resolver
            .find_asset("javascripts/widgets.js")
            .unwrap()
            .unwrap();
        assert_eq!(asset.logical_path(), "javascripts/widgets.js");
        assert_eq!(asset.content(), b"var w;");
    }

    #[test]
    fn first_root_wins() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        std::fs::write(a.path().join("app.js"), "from a").unwrap();
        std::fs::write(b.path().join("app.js"), "from b").unwrap();
        let resolver =
            DirectoryResolver::new(vec![a.path().to_path_buf(), b.path().to_path_buf()]);
        let asset = resolver.find_asset("app.js").unwrap().unwrap();
        assert_eq!(asset.content(), b"from a");
    }

    #[test]
    fn index_candidate_shapes() {
        assert_eq!(index_candidate("widgets.js").as_deref(), Some("widgets/index.js"));
        assert_eq!(index_candidate("a/b.min.css").as_deref(), Some("a/b/index.min.css"));
        assert_eq!(index_candidate("README"), None);
    }
}
