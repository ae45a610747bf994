//! Parsing and validation of `kiln.toml` build configuration files.
//!
//! Every setting has a default, so a project without a `kiln.toml` builds
//! `src/**/*.cpp` into `build/` and links `kette.bin`. This crate produces a
//! strongly-typed [`KilnConfig`] and resolves its relative paths against the
//! directory the build runs in.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, load_config_or_default, CONFIG_FILE};
pub use resolve::ResolvedPaths;
pub use types::*;
