//! Compilation units and the flattened object namespace.

use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

/// Separator placed between flattened directory components.
const FLATTEN_SEPARATOR: &str = "_";

/// One source file that compiles into one object file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationUnit {
    /// Source path as produced by the scanner; also the hash cache key.
    pub source: PathBuf,
    /// Object file path inside the build directory.
    pub object: PathBuf,
    /// Set by the planner when the unit must be recompiled.
    pub dirty: bool,
}

impl CompilationUnit {
    /// Creates a unit for `source`, found under `source_root`, whose object
    /// lands directly in `build_dir`.
    pub fn new(source: PathBuf, source_root: &Path, build_dir: &Path, object_ext: &str) -> Self {
        let relative = source.strip_prefix(source_root).unwrap_or(&source);
        let object = build_dir.join(object_file_name(relative, object_ext));
        Self {
            source,
            object,
            dirty: false,
        }
    }
}

/// Derives the single-level object file name for a source path relative to
/// the source root.
///
/// Directory components are joined with `_` in front of the file stem, and the
/// extension is replaced by `object_ext`: `a/b/c.cpp` becomes `a_b_c.o`.
/// Sources in different directories with the same file name therefore get
/// different objects. Names that already contain `_` can still collide
/// (`a_b/c.cpp` and `a/b_c.cpp`); the planner warns about those.
pub fn object_file_name(relative: &Path, object_ext: &str) -> OsString {
    let mut name = OsString::new();
    if let Some(parent) = relative.parent() {
        for component in parent.components() {
            if let Component::Normal(dir) = component {
                name.push(dir);
                name.push(FLATTEN_SEPARATOR);
            }
        }
    }
    if let Some(stem) = relative.file_stem() {
        name.push(stem);
    }
    name.push(".");
    name.push(object_ext);
    name
}
