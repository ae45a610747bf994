//! Object file discovery for the link step.

use std::collections::HashSet;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::error::BuildError;

/// Lists the object files directly inside `build_dir`.
///
/// Not recursive. Every file with extension `object_ext` is returned, including
/// objects left behind by sources that have since been deleted. With
/// `sorted = false` the order is whatever the directory listing yields.
pub fn collect_objects(
    build_dir: &Path,
    object_ext: &str,
    sorted: bool,
) -> Result<Vec<PathBuf>, BuildError> {
    let io_err = |source| BuildError::Io {
        path: build_dir.to_path_buf(),
        source,
    };
    let mut objects = Vec::new();
    for entry in std::fs::read_dir(build_dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        let path = entry.path();
        if !is_dir && path.extension() == Some(OsStr::new(object_ext)) {
            objects.push(path);
        }
    }
    if sorted {
        objects.sort();
    }
    Ok(objects)
}

/// Deletes object files in `build_dir` that no current unit produces.
///
/// Returns the removed paths.
pub fn prune_stale_objects(
    build_dir: &Path,
    object_ext: &str,
    live: &HashSet<PathBuf>,
) -> Result<Vec<PathBuf>, BuildError> {
    let mut removed = Vec::new();
    for object in collect_objects(build_dir, object_ext, true)? {
        if live.contains(&object) {
            continue;
        }
        std::fs::remove_file(&object).map_err(|source| BuildError::Io {
            path: object.clone(),
            source,
        })?;
        removed.push(object);
    }
    Ok(removed)
}
