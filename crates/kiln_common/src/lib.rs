//! Shared foundational types used across the kiln build orchestrator.
//!
//! Currently this is the content digest used to decide whether a source file
//! changed between two runs.

#![warn(missing_docs)]

pub mod hash;

pub use hash::{ContentHash, ParseHashError};
