//! Error types for cache operations.

use std::path::PathBuf;

/// Errors that can occur during cache operations.
///
/// Loading the cache is fail-safe: [`HashStore::load_or_default`] turns every
/// variant into an empty store. Hashing and persisting propagate these errors
/// to the caller.
///
/// [`HashStore::load_or_default`]: crate::HashStore::load_or_default
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The cache document does not exist yet (first run or cleaned build dir).
    #[error("no hash cache at {path}")]
    Missing {
        /// The path that was looked up.
        path: PathBuf,
    },

    /// An I/O error occurred while reading or writing a file.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The cache document could not be parsed as a path-to-digest JSON object.
    #[error("failed to parse hash cache {path}: {reason}")]
    ManifestParse {
        /// The cache document path.
        path: PathBuf,
        /// Description of the parse failure.
        reason: String,
    },

    /// The in-memory mapping could not be serialized.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Description of the serialization failure.
        reason: String,
    },
}

impl CacheError {
    /// Returns `true` when the cache document simply does not exist.
    ///
    /// Used to tell a first run apart from a damaged cache when logging.
    pub fn is_missing(&self) -> bool {
        matches!(self, CacheError::Missing { .. })
    }
}
