//! Resolution of configured paths against the project directory.

use crate::types::KilnConfig;
use std::path::{Path, PathBuf};

/// Asset settings with every path made absolute (or project-relative).
#[derive(Debug, Clone)]
pub struct ResolvedAssets {
    /// Output directory.
    pub target: PathBuf,
    /// Search paths.
    pub paths: Vec<PathBuf>,
    /// Root swept by cleanup.
    pub output_root: PathBuf,
    /// Write content-addressed file names.
    pub digest: bool,
    /// Persist the manifest.
    pub manifest: bool,
    /// Sweep unreferenced outputs.
    pub clean_after_precompile: bool,
    /// Follow a digest pass with a plain-named pass.
    pub nondigest: bool,
    /// Compressible-output pattern, if overridden.
    pub compress: Option<String>,
}

/// Joins every configured path onto `project_dir`. Absolute paths are kept.
pub fn resolve_assets(config: &KilnConfig, project_dir: &Path) -> ResolvedAssets {
    let assets = &config.assets;
    let target = project_dir.join(&assets.target);
    let output_root = assets
        .output_root
        .as_ref()
        .map(|root| project_dir.join(root))
        .unwrap_or_else(|| target.clone());

    ResolvedAssets {
        paths: assets.paths.iter().map(|p| project_dir.join(p)).collect(),
        output_root,
        target,
        digest: assets.digest,
        manifest: assets.manifest,
        clean_after_precompile: assets.clean_after_precompile,
        nondigest: assets.nondigest,
        compress: assets.compress.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_config_from_str;

    #[test]
    fn relative_paths_join_project_dir() {
        let config = load_config_from_str(
            "[assets]\ntarget = \"public/assets\"\npaths = [\"app/assets\"]\n",
        )
        .unwrap();
        let resolved = resolve_assets(&config, Path::new("/srv/site"));
        assert_eq!(resolved.target, PathBuf::from("/srv/site/public/assets"));
        assert_eq!(resolved.paths, vec![PathBuf::from("/srv/site/app/assets")]);
        assert_eq!(resolved.output_root, resolved.target);
    }

    #[test]
    fn output_root_override() {
        let config = load_config_from_str(
            "[assets]\ntarget = \"public/assets\"\npaths = \"app\"\noutput_root = \"public\"\n",
        )
        .unwrap();
        let resolved = resolve_assets(&config, Path::new("/srv/site"));
        assert_eq!(resolved.output_root, PathBuf::from("/srv/site/public"));
    }

    #[test]
    fn absolute_paths_are_kept() {
        let config =
            load_config_from_str("[assets]\ntarget = \"/var/www/assets\"\npaths = \"app\"\n")
                .unwrap();
        let resolved = resolve_assets(&config, Path::new("/srv/site"));
        assert_eq!(resolved.target, PathBuf::from("/var/www/assets"));
    }
}
