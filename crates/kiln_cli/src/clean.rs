//! `kiln clean`: removes the target directory.

use std::path::Path;

use crate::project::load_assets;
use crate::GlobalArgs;

/// Runs the `kiln clean` command. Returns exit code 0 on success.
pub fn run(global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let assets = load_assets(global)?;
    if remove_target(&assets.target)? && !global.quiet {
        eprintln!("     Removed {}", assets.target.display());
    }
    Ok(0)
}

/// Deletes `target` and everything under it. Returns `false` if it didn't exist.
fn remove_target(target: &Path) -> std::io::Result<bool> {
    if !target.exists() {
        return Ok(false);
    }
    std::fs::remove_dir_all(target)?;
    tracing::debug!(path = %target.display(), "Removed target directory");
    Ok(true)
}
