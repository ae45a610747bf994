//! Persisted content-hash cache for incremental builds.
//!
//! This crate owns the mapping from source path to the content digest it had
//! when it was last compiled, plus the helpers that hash source files and
//! write the mapping back to disk at the end of a run.

#![warn(missing_docs)]

pub mod error;
pub mod hasher;
pub mod store;

pub use error::CacheError;
pub use hasher::SourceHasher;
pub use store::HashStore;
