//! kiln: an incremental compile-and-link driver.
//!
//! Running `kiln` with no arguments hashes every `src/**/*.cpp`, recompiles
//! the ones whose content changed since the last run, links every object in
//! `build/` into `kette.bin` and records the new hashes in
//! `build/hashes.json`.

#![warn(missing_docs)]

mod build;
mod logging;

use std::num::NonZeroUsize;
use std::process;

use clap::Parser;

/// Rebuild only what changed.
#[derive(Parser, Debug)]
#[command(name = "kiln", version, about = "Incremental compile-and-link driver")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to a custom `kiln.toml` configuration file.
    #[arg(long)]
    pub config: Option<String>,

    /// Stop at the first failing compile or link and exit with an error.
    #[arg(long)]
    pub strict: bool,

    /// Number of compiler processes to run at once.
    #[arg(short, long)]
    pub jobs: Option<NonZeroUsize>,
}

fn main() {
    let cli = Cli::parse();
    logging::initialize(cli.quiet, cli.verbose);

    if let Err(e) = build::run(&cli) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
