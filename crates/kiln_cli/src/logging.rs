//! Diagnostic logging setup.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Picks the default log level from the global verbosity flags.
pub fn default_level(quiet: bool, verbose: bool) -> LevelFilter {
    if quiet {
        LevelFilter::ERROR
    } else if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    }
}

/// Installs a stderr subscriber.
///
/// `RUST_LOG` takes precedence; otherwise the level follows `--quiet` and
/// `--verbose`. Progress lines are printed separately by the reporter, so
/// logs only carry diagnostics (cache state, tool command lines, failures).
pub fn initialize(quiet: bool, verbose: bool) {
    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level(quiet, verbose).into())
        .from_env_lossy();

    // Ignore the error if a subscriber is already installed.
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init();
}
