//! The build run: load, scan and plan, compile, link, persist.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use kiln_cache::HashStore;
use kiln_common::ContentHash;
use kiln_config::{BuildConfig, FailurePolicy, KilnConfig, ResolvedPaths};
use kiln_toolchain::{ToolOutput, Toolchain, ToolchainError};
use rayon::prelude::*;

use crate::error::{BuildError, ToolFailure};
use crate::link::{collect_objects, prune_stale_objects};
use crate::planner::{Decision, RebuildPlanner};
use crate::report::{BuildReport, LinkStatus, Reporter};
use crate::scanner::Scanner;
use crate::unit::CompilationUnit;

type CompileResult = Result<ToolOutput, ToolchainError>;

/// A configured build, ready to run.
///
/// Holds no state between runs; everything incremental lives in the hash
/// cache file inside the build directory.
#[derive(Debug, Clone)]
pub struct Build {
    paths: ResolvedPaths,
    toolchain: Toolchain,
    scanner: Scanner,
    settings: BuildConfig,
    object_ext: String,
}

impl Build {
    /// Prepares a build from a configuration and its resolved paths.
    pub fn new(config: &KilnConfig, paths: ResolvedPaths) -> Self {
        Self {
            toolchain: Toolchain::from_config(&config.toolchain),
            scanner: Scanner::from_config(&paths, &config.toolchain),
            settings: config.build.clone(),
            object_ext: config.toolchain.object_extension.clone(),
            paths,
        }
    }

    /// Runs one incremental build.
    ///
    /// With the `continue` failure policy, compile and link failures are
    /// reported and recorded in the returned [`BuildReport`] but do not make
    /// the run fail. The only errors in that mode are I/O failures: an
    /// unreadable source (the cache is then left as it was), or problems
    /// with the build directory or cache file.
    ///
    /// With `abort`, the first failing compile or link ends the run with an
    /// error after the cache has been written, with the failing units' entries
    /// restored so they are retried next time.
    pub fn run(&self, reporter: &mut dyn Reporter) -> Result<BuildReport, BuildError> {
        create_dir(&self.paths.build_dir)?;
        let mut store = HashStore::load_or_default(&self.paths.cache_file);
        let mut report = BuildReport::new();

        let live = match self.compile_phase(&mut store, &mut report, reporter) {
            Ok(live) => live,
            Err(e @ BuildError::CompileFailed { .. }) => {
                store.persist(&self.paths.cache_file)?;
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        if self.settings.prune_stale_objects {
            let removed = prune_stale_objects(&self.paths.build_dir, &self.object_ext, &live)?;
            for object in &removed {
                reporter.pruned(object);
            }
            report.pruned = removed;
        }

        let link_result = self.link_phase(&mut report, reporter);
        store.persist(&self.paths.cache_file)?;
        link_result?;

        reporter.finished(&report);
        Ok(report)
    }

    /// Plans every scanned unit and compiles the dirty ones.
    ///
    /// Returns the object paths of all scanned units, clean or dirty.
    fn compile_phase(
        &self,
        store: &mut HashStore,
        report: &mut BuildReport,
        reporter: &mut dyn Reporter,
    ) -> Result<HashSet<PathBuf>, BuildError> {
        let mut planner = RebuildPlanner::new(store);
        let mut live = HashSet::new();
        let mut pending = Vec::new();

        for mut unit in self.scanner.walk() {
            live.insert(unit.object.clone());
            match planner.plan(&mut unit)? {
                Decision::Skip => {
                    reporter.skipped(&unit);
                    report.skipped.push(unit.source);
                }
                Decision::Recompile { previous } => {
                    reporter.recompiling(&unit);
                    if self.settings.jobs > 1 {
                        pending.push((unit, previous));
                    } else {
                        let result = self.compile(&unit);
                        self.settle(&mut planner, unit, previous, result, report, reporter)?;
                    }
                }
            }
        }

        if !pending.is_empty() {
            let results = self.compile_parallel(&pending)?;
            let mut first_error = None;
            for ((unit, previous), result) in pending.into_iter().zip(results) {
                let settled = self.settle(&mut planner, unit, previous, result, report, reporter);
                if let Err(e) = settled {
                    first_error.get_or_insert(e);
                }
            }
            if let Some(e) = first_error {
                return Err(e);
            }
        }

        Ok(live)
    }

    fn compile(&self, unit: &CompilationUnit) -> CompileResult {
        self.toolchain
            .compile_command(&unit.source, &unit.object)
            .run()
    }

    /// Compiles all pending units on a pool of `jobs` threads.
    ///
    /// Returns once every compile has finished, results in input order.
    fn compile_parallel(
        &self,
        pending: &[(CompilationUnit, Option<ContentHash>)],
    ) -> Result<Vec<CompileResult>, BuildError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.settings.jobs)
            .build()
            .map_err(|e| BuildError::ThreadPool(e.to_string()))?;
        Ok(pool.install(|| {
            pending
                .par_iter()
                .map(|(unit, _)| self.compile(unit))
                .collect()
        }))
    }

    /// Records the outcome of one compile and applies the failure policy.
    fn settle(
        &self,
        planner: &mut RebuildPlanner<'_>,
        unit: CompilationUnit,
        previous: Option<ContentHash>,
        result: CompileResult,
        report: &mut BuildReport,
        reporter: &mut dyn Reporter,
    ) -> Result<(), BuildError> {
        let failure = match ToolFailure::check(result) {
            Ok(output) => {
                reporter.tool_output(&unit.source, &output);
                report.recompiled.push(unit.source);
                return Ok(());
            }
            Err(failure) => failure,
        };

        reporter.compile_failed(&unit, &failure);
        let abort = self.settings.on_failure == FailurePolicy::Abort;
        if abort || self.settings.retry_failed {
            planner.revert(&unit, previous);
        }
        report.failed.push(unit.source.clone());
        if abort {
            return Err(BuildError::CompileFailed {
                unit: unit.source,
                failure,
            });
        }
        tracing::warn!(source = %unit.source.display(), "compile failed, continuing");
        Ok(())
    }

    /// Links every object in the build directory into the output executable.
    fn link_phase(
        &self,
        report: &mut BuildReport,
        reporter: &mut dyn Reporter,
    ) -> Result<(), BuildError> {
        let objects = collect_objects(
            &self.paths.build_dir,
            &self.object_ext,
            self.settings.sorted_link_inputs,
        )?;
        if objects.is_empty() {
            tracing::warn!(build_dir = %self.paths.build_dir.display(), "no object files to link");
            report.link = LinkStatus::NothingToLink;
            return Ok(());
        }

        let output = &self.paths.output;
        if let Some(parent) = output.parent() {
            create_dir(parent)?;
        }
        reporter.linking(objects.len(), output);
        let result = self.toolchain.link_command(&objects, output).run();
        report.linked = objects;

        match ToolFailure::check(result) {
            Ok(tool_output) => {
                reporter.tool_output(output, &tool_output);
                report.link = LinkStatus::Linked;
                Ok(())
            }
            Err(failure) => {
                reporter.link_failed(output, &failure);
                report.link = LinkStatus::Failed;
                if self.settings.on_failure == FailurePolicy::Abort {
                    return Err(BuildError::LinkFailed {
                        output: output.clone(),
                        failure,
                    });
                }
                tracing::warn!(output = %output.display(), "link failed, continuing");
                Ok(())
            }
        }
    }
}

fn create_dir(path: &Path) -> Result<(), BuildError> {
    if path.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(path).map_err(|source| BuildError::Io {
        path: path.to_path_buf(),
        source,
    })
}
