//! Project root discovery and configuration loading.

use std::path::{Path, PathBuf};

use kiln_config::{load_config, resolve_assets, ResolvedAssets, CONFIG_FILE};

use crate::GlobalArgs;

/// Walks up from `start` looking for the nearest directory containing `kiln.toml`.
///
/// Returns the directory containing `kiln.toml`, or an error if none is found.
pub fn find_project_root(start: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILE).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(format!(
                "could not find {CONFIG_FILE} in {} or any parent directory",
                start.display()
            )
            .into());
        }
    }
}

/// Resolves the project root directory from global CLI args.
///
/// If `--config` is specified, uses that path (file → parent dir, dir → itself).
/// Otherwise walks up from the current directory looking for `kiln.toml`.
pub fn resolve_project_root(global: &GlobalArgs) -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Some(ref config_path) = global.config {
        let p = PathBuf::from(config_path);
        if p.is_file() {
            Ok(p.parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| PathBuf::from(".")))
        } else {
            Ok(p)
        }
    } else {
        find_project_root(&std::env::current_dir()?)
    }
}

/// Loads `kiln.toml` from the resolved project root and makes its paths
/// project-relative.
pub fn load_assets(global: &GlobalArgs) -> Result<ResolvedAssets, Box<dyn std::error::Error>> {
    let project_dir = resolve_project_root(global)?;
    let config = load_config(&project_dir)?;
    Ok(resolve_assets(&config, &project_dir))
}
