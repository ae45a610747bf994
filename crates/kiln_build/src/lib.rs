//! Incremental compile-and-link engine.
//!
//! A run loads the hash cache, walks the source tree, recompiles every unit
//! whose content digest changed, links every object file in the build
//! directory into one executable and writes the cache back:
//!
//! 1. [`HashStore::load_or_default`](kiln_cache::HashStore::load_or_default)
//! 2. [`Scanner::walk`]
//! 3. [`RebuildPlanner::plan`] per unit, compiling dirty units
//! 4. [`link::collect_objects`] and the link invocation
//! 5. [`HashStore::persist`](kiln_cache::HashStore::persist)
//!
//! [`Build::run`] drives the whole sequence.

#![warn(missing_docs)]

pub mod engine;
pub mod error;
pub mod link;
pub mod planner;
pub mod report;
pub mod scanner;
pub mod unit;

pub use engine::Build;
pub use error::{BuildError, ToolFailure};
pub use planner::{Decision, RebuildPlanner};
pub use report::{BuildReport, ConsoleReporter, LinkStatus, Reporter};
pub use scanner::{Scanner, Units};
pub use unit::{object_file_name, CompilationUnit};

pub use kiln_toolchain::ToolOutput;
