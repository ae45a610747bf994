//! Configuration types deserialized from `kiln.toml`.

use serde::Deserialize;
use std::path::PathBuf;

/// The top-level build configuration parsed from `kiln.toml`.
///
/// All sections are optional; a missing section takes its defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KilnConfig {
    /// Where sources live and where build products go.
    #[serde(default)]
    pub paths: PathsConfig,
    /// Compiler program, flags and file extensions.
    #[serde(default)]
    pub toolchain: ToolchainConfig,
    /// Failure policy and scheduling knobs.
    #[serde(default)]
    pub build: BuildConfig,
}

/// Source, build and output locations.
///
/// Relative paths are resolved against the directory the build runs in.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Root of the tree scanned for compilation units.
    pub source_root: PathBuf,
    /// Directory holding object files and the hash cache.
    pub build_dir: PathBuf,
    /// Final linked executable.
    pub output: PathBuf,
    /// Hash cache file name, relative to `build_dir`.
    pub cache_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source_root: PathBuf::from("src"),
            build_dir: PathBuf::from("build"),
            output: PathBuf::from("kette.bin"),
            cache_file: PathBuf::from("hashes.json"),
        }
    }
}

/// External compiler settings shared by the compile and link steps.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolchainConfig {
    /// Compiler driver, also used as the linker.
    pub compiler: String,
    /// Include directories, each passed as `-I<dir>`.
    pub include_dirs: Vec<String>,
    /// Extension (without the dot) of compilable source files.
    pub source_extension: String,
    /// Extension (without the dot) of produced object files.
    pub object_extension: String,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            compiler: "clang++".to_string(),
            include_dirs: vec!["include".to_string()],
            source_extension: "cpp".to_string(),
            object_extension: "o".to_string(),
        }
    }
}

impl ToolchainConfig {
    /// Returns the include flags passed to every compiler invocation.
    pub fn include_flags(&self) -> Vec<String> {
        self.include_dirs.iter().map(|d| format!("-I{d}")).collect()
    }
}

/// How a run reacts to failing compile and link steps.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// What to do when the compiler or linker reports a failure.
    pub on_failure: FailurePolicy,
    /// Restore the hash entry of a unit whose compile failed, so the next run
    /// recompiles it instead of treating it as clean.
    pub retry_failed: bool,
    /// Delete object files in the build directory that no current source maps
    /// to before linking.
    pub prune_stale_objects: bool,
    /// Sort link inputs by path instead of using directory-listing order.
    pub sorted_link_inputs: bool,
    /// Maximum number of concurrent compiler processes.
    pub jobs: usize,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            on_failure: FailurePolicy::Continue,
            retry_failed: false,
            prune_stale_objects: false,
            sorted_link_inputs: false,
            jobs: 1,
        }
    }
}

/// Policy for failed compiler or linker invocations.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Log the failure and keep going; the run still exits successfully.
    #[default]
    Continue,
    /// Stop at the first failure and fail the run.
    Abort,
}
