//! The build command: load configuration, run the engine, pick an exit code.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use kiln_build::{Build, ConsoleReporter};
use kiln_config::{ConfigError, FailurePolicy, KilnConfig, ResolvedPaths};

use crate::Cli;

/// Runs one incremental build.
///
/// Succeeds whenever the run completes, even if some compile or link step
/// failed under the `continue` policy. Errors (config problems, unreadable
/// sources, cache write failures, or any tool failure under `--strict`) are
/// returned to `main`, which exits with 1.
pub fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let (config, paths) = resolve_config(cli.config.as_deref())?;
    let config = apply_overrides(config, cli.strict, cli.jobs);

    let mut reporter = ConsoleReporter::new(cli.quiet);
    let report = Build::new(&config, paths).run(&mut reporter)?;

    if !report.succeeded() {
        tracing::warn!(
            failed = report.failed.len(),
            link = ?report.link,
            "build finished with tolerated failures"
        );
    }
    Ok(())
}

/// Loads the configuration and resolves its paths.
///
/// With `--config`, paths are relative to the directory holding that file.
/// Without it, `./kiln.toml` is used if present and paths are relative to
/// the working directory.
pub fn resolve_config(
    config_path: Option<&str>,
) -> Result<(KilnConfig, ResolvedPaths), ConfigError> {
    match config_path {
        Some(path) => {
            let path = PathBuf::from(path);
            let config = kiln_config::load_config(&path)?;
            let base = path.parent().unwrap_or_else(|| Path::new(""));
            let paths = ResolvedPaths::under(&config, base);
            Ok((config, paths))
        }
        None => {
            let config = kiln_config::load_config_or_default(Path::new("."))?;
            let paths = ResolvedPaths::from_config(&config);
            Ok((config, paths))
        }
    }
}

/// Applies command-line overrides on top of the loaded configuration.
pub fn apply_overrides(
    mut config: KilnConfig,
    strict: bool,
    jobs: Option<NonZeroUsize>,
) -> KilnConfig {
    if strict {
        config.build.on_failure = FailurePolicy::Abort;
    }
    if let Some(jobs) = jobs {
        config.build.jobs = jobs.get();
    }
    config
}
