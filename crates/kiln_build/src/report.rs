//! Progress reporting and the summary of a run.

use std::path::{Path, PathBuf};

use kiln_toolchain::ToolOutput;

use crate::error::ToolFailure;
use crate::unit::CompilationUnit;

/// Receives build progress as it happens.
///
/// Skip and recompile decisions are reported in scan order, before the
/// corresponding compile starts.
pub trait Reporter {
    /// The unit's digest matched the cache.
    fn skipped(&mut self, unit: &CompilationUnit);

    /// The unit is new or changed and will be compiled.
    fn recompiling(&mut self, unit: &CompilationUnit);

    /// Compiling the unit failed.
    fn compile_failed(&mut self, unit: &CompilationUnit, failure: &ToolFailure);

    /// A compile or link for `target` succeeded; `output` holds whatever the
    /// tool printed, such as warnings.
    fn tool_output(&mut self, _target: &Path, _output: &ToolOutput) {}

    /// A stale object file was deleted before linking.
    fn pruned(&mut self, _object: &Path) {}

    /// The link step is starting.
    fn linking(&mut self, objects: usize, output: &Path);

    /// The link step failed.
    fn link_failed(&mut self, output: &Path, failure: &ToolFailure);

    /// The run completed (possibly with tolerated failures).
    fn finished(&mut self, _report: &BuildReport) {}
}

/// What happened to the link step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    /// The executable was produced.
    Linked,
    /// The linker ran and failed.
    Failed,
    /// There were no object files to link.
    NothingToLink,
}

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    /// Sources whose digest matched the cache.
    pub skipped: Vec<PathBuf>,
    /// Sources that were compiled successfully.
    pub recompiled: Vec<PathBuf>,
    /// Sources whose compile failed.
    pub failed: Vec<PathBuf>,
    /// Object files deleted before linking.
    pub pruned: Vec<PathBuf>,
    /// Objects passed to the linker, in link order.
    pub linked: Vec<PathBuf>,
    /// Outcome of the link step.
    pub link: LinkStatus,
}

impl BuildReport {
    pub(crate) fn new() -> Self {
        Self {
            skipped: Vec::new(),
            recompiled: Vec::new(),
            failed: Vec::new(),
            pruned: Vec::new(),
            linked: Vec::new(),
            link: LinkStatus::NothingToLink,
        }
    }

    /// Returns `true` if no compile or link step failed.
    pub fn succeeded(&self) -> bool {
        self.failed.is_empty() && self.link != LinkStatus::Failed
    }

    /// Number of units that were recompiled or attempted.
    pub fn dirty_count(&self) -> usize {
        self.recompiled.len() + self.failed.len()
    }
}

/// Writes progress lines to stderr.
///
/// Decisions, tool warnings and the summary are hidden with `quiet`;
/// failures are always shown together with the tool's own diagnostics.
pub struct ConsoleReporter {
    quiet: bool,
}

impl ConsoleReporter {
    /// Creates a reporter; `quiet` suppresses everything except failures.
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    fn print_failure(&self, what: &str, path: &Path, failure: &ToolFailure) {
        eprintln!("error: {what} {}: {failure}", path.display());
        if let Some(diagnostics) = failure.diagnostics() {
            echo(&diagnostics);
        }
    }
}

fn echo(text: &str) {
    eprint!("{text}");
    if !text.ends_with('\n') {
        eprintln!();
    }
}

impl Reporter for ConsoleReporter {
    fn skipped(&mut self, unit: &CompilationUnit) {
        if !self.quiet {
            eprintln!("      skip: {}", unit.source.display());
        }
    }

    fn recompiling(&mut self, unit: &CompilationUnit) {
        if !self.quiet {
            eprintln!(" recompile: {}", unit.source.display());
        }
    }

    fn compile_failed(&mut self, unit: &CompilationUnit, failure: &ToolFailure) {
        self.print_failure("failed to compile", &unit.source, failure);
    }

    fn tool_output(&mut self, _target: &Path, output: &ToolOutput) {
        if self.quiet {
            return;
        }
        for text in [output.stdout_lossy(), output.stderr_lossy()] {
            if !text.trim().is_empty() {
                echo(&text);
            }
        }
    }

    fn pruned(&mut self, object: &Path) {
        if !self.quiet {
            eprintln!("    pruned: {}", object.display());
        }
    }

    fn linking(&mut self, objects: usize, output: &Path) {
        if !self.quiet {
            eprintln!("   linking: {} ({objects} objects)", output.display());
        }
    }

    fn link_failed(&mut self, output: &Path, failure: &ToolFailure) {
        self.print_failure("failed to link", output, failure);
    }

    fn finished(&mut self, report: &BuildReport) {
        if !self.quiet {
            eprintln!(
                "  finished: {} recompiled, {} skipped, {} failed",
                report.recompiled.len(),
                report.skipped.len(),
                report.failed.len()
            );
        }
    }
}
