//! Invocation of the external compiler driver.
//!
//! The same program is run in two modes: compile one source into one object,
//! and link many objects into one executable. Every run is blocking and its
//! exit status and output are captured into a [`ToolOutput`] so the caller
//! can decide whether a failure matters.

#![warn(missing_docs)]

pub mod error;
pub mod invocation;
pub mod toolchain;

pub use error::ToolchainError;
pub use invocation::{Invocation, ToolOutput};
pub use toolchain::Toolchain;
