//! Error types for a build run.

use std::fmt;
use std::path::PathBuf;

use kiln_cache::CacheError;
use kiln_toolchain::{ToolOutput, ToolchainError};

/// Errors that end a build run.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// Hashing a source or writing the hash cache failed.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// An I/O error occurred in the build directory.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A compile failed and the failure policy is `abort`.
    #[error("compiling {unit} failed: {failure}")]
    CompileFailed {
        /// The source that failed to compile.
        unit: PathBuf,
        /// What went wrong.
        failure: ToolFailure,
    },

    /// The link failed and the failure policy is `abort`.
    #[error("linking {output} failed: {failure}")]
    LinkFailed {
        /// The executable that was being produced.
        output: PathBuf,
        /// What went wrong.
        failure: ToolFailure,
    },

    /// The compile worker pool could not be created.
    #[error("failed to start compile workers: {0}")]
    ThreadPool(String),
}

/// A compiler or linker invocation that did not succeed.
#[derive(Debug)]
pub enum ToolFailure {
    /// The process ran and exited unsuccessfully.
    Exited(ToolOutput),
    /// The process could not be started.
    NotStarted(ToolchainError),
}

impl ToolFailure {
    /// Splits the result of an invocation into a successful run or a failure.
    pub fn check(result: Result<ToolOutput, ToolchainError>) -> Result<ToolOutput, Self> {
        match result {
            Ok(output) if output.success() => Ok(output),
            Ok(output) => Err(ToolFailure::Exited(output)),
            Err(e) => Err(ToolFailure::NotStarted(e)),
        }
    }

    /// Diagnostic text the tool wrote to stderr, if it ran.
    pub fn diagnostics(&self) -> Option<String> {
        match self {
            ToolFailure::Exited(output) => {
                let text = output.stderr_lossy();
                (!text.trim().is_empty()).then_some(text)
            }
            ToolFailure::NotStarted(_) => None,
        }
    }
}

impl fmt::Display for ToolFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolFailure::Exited(output) => {
                write!(f, "`{}` exited with {}", output.command, output.status)
            }
            ToolFailure::NotStarted(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ToolFailure {}
