//! `kiln precompile`, `kiln primary` and `kiln nondigest`.
//!
//! Each command builds its pass options from `kiln.toml` plus the manifest
//! left in the target directory by the previous run, and resolves assets as
//! plain files under the configured search paths.

use kiln_config::ResolvedAssets;
use kiln_precompile::{
    DirectoryResolver, Manifest, PrecompileOptions, PrecompileOutcome, StaticCompiler,
};

use crate::project::load_assets;
use crate::GlobalArgs;

/// Runs the `kiln precompile` command: the primary pass, followed by a
/// non-digest pass when `nondigest` is configured and the primary pass wrote
/// digest assets. Returns exit code 0 on success.
pub fn run(global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let assets = load_assets(global)?;
    let resolver = DirectoryResolver::new(assets.paths.clone());

    let options = primary_options(&assets, Manifest::load(&assets.target));
    let outcome = StaticCompiler::new(&resolver, options.clone()).compile()?;
    report(global, "Precompiled", &assets, &outcome);

    if assets.nondigest && outcome.digest_precompiled {
        let follow_up = options.nondigest_after(&outcome);
        let outcome = StaticCompiler::new(&resolver, follow_up).compile()?;
        report(global, "Projected", &assets, &outcome);
    }
    Ok(0)
}

/// Runs the `kiln primary` command: the configured pass only.
pub fn run_primary(global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let assets = load_assets(global)?;
    let resolver = DirectoryResolver::new(assets.paths.clone());

    let options = primary_options(&assets, Manifest::load(&assets.target));
    let outcome = StaticCompiler::new(&resolver, options).compile()?;
    report(global, "Precompiled", &assets, &outcome);
    Ok(0)
}

/// Runs the `kiln nondigest` command: plain-named outputs only, reusing the
/// digest assets named by the manifest on disk when there is one.
pub fn run_nondigest(global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let assets = load_assets(global)?;
    let resolver = DirectoryResolver::new(assets.paths.clone());

    let options = nondigest_options(&assets, Manifest::load(&assets.target));
    let outcome = StaticCompiler::new(&resolver, options).compile()?;
    report(global, "Projected", &assets, &outcome);
    Ok(0)
}

/// Options for the pass `kiln.toml` describes, seeded from `previous`.
fn primary_options(assets: &ResolvedAssets, previous: Option<Manifest>) -> PrecompileOptions {
    let mut options = PrecompileOptions::new(assets.target.clone());
    options.paths = assets.paths.clone();
    options.digest = assets.digest;
    options.manifest = assets.manifest;
    options.clean_after_precompile = assets.clean_after_precompile;
    options.output_root = Some(assets.output_root.clone());
    if let Some(ref compress) = assets.compress {
        options.compress = compress.clone();
    }
    match previous {
        Some(manifest) => options.with_previous(manifest),
        None => options,
    }
}

/// Options for a standalone non-digest pass. A non-empty manifest on disk
/// means a digest pass already ran.
fn nondigest_options(assets: &ResolvedAssets, previous: Option<Manifest>) -> PrecompileOptions {
    let digest_precompiled = previous.as_ref().is_some_and(|m| !m.is_empty());
    let mut options = primary_options(assets, previous);
    options.digest = false;
    options.manifest = false;
    options.clean_after_precompile = false;
    options.digest_precompiled = digest_precompiled;
    options
}

fn report(global: &GlobalArgs, verb: &str, assets: &ResolvedAssets, outcome: &PrecompileOutcome) {
    if global.quiet {
        return;
    }
    let stats = outcome.stats;
    eprintln!(
        "  {verb} {} assets into {} ({} compiled, {} reused, {} projected, {} skipped)",
        stats.compiled + stats.reused + stats.projected,
        assets.target.display(),
        stats.compiled,
        stats.reused,
        stats.projected,
        stats.skipped
    );
    if let Some(ref sweep) = outcome.sweep {
        if !sweep.is_empty() {
            eprintln!(
                "     Removed {} stale files and {} empty directories",
                sweep.files_removed.len(),
                sweep.dirs_removed.len()
            );
        }
    }
}
