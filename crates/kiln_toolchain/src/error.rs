//! Error types for running external tools.

/// Errors that prevent an external tool from producing any result.
///
/// A tool that runs and exits unsuccessfully is not an error at this level;
/// it is a [`ToolOutput`](crate::ToolOutput) whose status is not success.
#[derive(Debug, thiserror::Error)]
pub enum ToolchainError {
    /// The process could not be started (missing program, permissions, ...).
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        /// The rendered command line.
        command: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}
