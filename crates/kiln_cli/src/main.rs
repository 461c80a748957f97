//! Kiln CLI: precompiles static assets into a deployable target directory.
//!
//! Provides `kiln precompile` for the configured pass (plus the optional
//! non-digest follow-up), `kiln primary` and `kiln nondigest` to run either
//! pass on its own, and `kiln clean` to remove the target directory.

#![warn(missing_docs)]

mod clean;
mod precompile;
mod project;

use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Kiln: an incremental static asset precompiler.
#[derive(Parser, Debug)]
#[command(name = "kiln", version, about = "Kiln Asset Precompiler")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a custom `kiln.toml` configuration file or its directory.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Run the primary pass, then the non-digest pass if configured.
    Precompile,
    /// Run only the primary pass.
    Primary,
    /// Write plain-named copies from the manifest on disk.
    Nondigest,
    /// Remove the target directory.
    Clean,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

impl GlobalArgs {
    /// The default log filter for these flags, used when `RUST_LOG` is unset.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(global.log_level())),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let result = match cli.command {
        Command::Precompile => precompile::run(&global),
        Command::Primary => precompile::run_primary(&global),
        Command::Nondigest => precompile::run_nondigest(&global),
        Command::Clean => clean::run(&global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
