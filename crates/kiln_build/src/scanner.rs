//! Source tree discovery.

use std::ffi::OsStr;
use std::fs::ReadDir;
use std::path::{Path, PathBuf};

use kiln_config::{ResolvedPaths, ToolchainConfig};

use crate::unit::CompilationUnit;

/// Walks a source tree looking for compilable files.
#[derive(Debug, Clone)]
pub struct Scanner {
    source_root: PathBuf,
    build_dir: PathBuf,
    source_ext: String,
    object_ext: String,
}

impl Scanner {
    /// Creates a scanner for files ending in `.source_ext` under `source_root`
    /// whose objects go into `build_dir` with extension `object_ext`.
    pub fn new(
        source_root: impl Into<PathBuf>,
        build_dir: impl Into<PathBuf>,
        source_ext: impl Into<String>,
        object_ext: impl Into<String>,
    ) -> Self {
        Self {
            source_root: source_root.into(),
            build_dir: build_dir.into(),
            source_ext: source_ext.into(),
            object_ext: object_ext.into(),
        }
    }

    /// Creates a scanner from resolved paths and the `[toolchain]` section.
    pub fn from_config(paths: &ResolvedPaths, toolchain: &ToolchainConfig) -> Self {
        Self::new(
            paths.source_root.clone(),
            paths.build_dir.clone(),
            toolchain.source_extension.clone(),
            toolchain.object_extension.clone(),
        )
    }

    /// Starts a lazy, depth-first walk of the whole source tree.
    ///
    /// Units are produced in directory-listing order, which depends on the
    /// file system. Directories that cannot be read are skipped with a
    /// warning; a missing source root yields nothing.
    pub fn walk(&self) -> Units<'_> {
        let mut stack = Vec::new();
        match std::fs::read_dir(&self.source_root) {
            Ok(entries) => stack.push(entries),
            Err(e) => {
                tracing::warn!(
                    path = %self.source_root.display(),
                    error = %e,
                    "cannot read source root"
                );
            }
        }
        Units {
            scanner: self,
            stack,
        }
    }

    fn is_source(&self, path: &Path) -> bool {
        path.extension() == Some(OsStr::new(&self.source_ext))
    }

    fn unit_for(&self, source: PathBuf) -> CompilationUnit {
        CompilationUnit::new(source, &self.source_root, &self.build_dir, &self.object_ext)
    }
}

/// Iterator over the compilation units of one walk.
///
/// Finite and not restartable; call [`Scanner::walk`] again for a new pass.
pub struct Units<'a> {
    scanner: &'a Scanner,
    stack: Vec<ReadDir>,
}

impl Iterator for Units<'_> {
    type Item = CompilationUnit;

    fn next(&mut self) -> Option<CompilationUnit> {
        loop {
            let entry = match self.stack.last_mut()?.next() {
                None => {
                    self.stack.pop();
                    continue;
                }
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "skipping unreadable directory entry");
                    continue;
                }
                Some(Ok(entry)) => entry,
            };

            let path = entry.path();
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            if is_dir {
                match std::fs::read_dir(&path) {
                    Ok(entries) => self.stack.push(entries),
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "skipping unreadable directory"
                        );
                    }
                }
            } else if self.scanner.is_source(&path) {
                return Some(self.scanner.unit_for(path));
            }
        }
    }
}
