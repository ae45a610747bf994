//! Source file hashing.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use kiln_common::ContentHash;

use crate::error::CacheError;

/// Utility for computing content hashes of source files.
pub struct SourceHasher;

impl SourceHasher {
    /// Computes the content hash of a single file.
    ///
    /// The file is streamed in fixed-size chunks and closed before returning.
    /// An unreadable file is reported as [`CacheError::Io`]; there is no
    /// fallback, the caller decides whether that ends the run.
    pub fn hash_file(path: &Path) -> Result<ContentHash, CacheError> {
        let io_err = |source| CacheError::Io {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(io_err)?;
        ContentHash::from_reader(BufReader::new(file)).map_err(io_err)
    }
}
