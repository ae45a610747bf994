//! Resolution of configured paths into the concrete locations a run uses.

use std::path::{Component, Path, PathBuf};

use crate::types::KilnConfig;

/// Concrete file system locations for one build run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    /// Root of the scanned source tree.
    pub source_root: PathBuf,
    /// Directory receiving object files.
    pub build_dir: PathBuf,
    /// Full path of the hash cache document.
    pub cache_file: PathBuf,
    /// Full path of the linked executable.
    pub output: PathBuf,
}

impl ResolvedPaths {
    /// Uses the configured paths as written, relative to the working directory.
    ///
    /// Keeps hash cache keys short (`src/main.cpp`) for the common case of
    /// running in the project directory.
    pub fn from_config(config: &KilnConfig) -> Self {
        Self::under(config, Path::new(""))
    }

    /// Resolves relative configured paths against `base`.
    ///
    /// Absolute configured paths are kept unchanged. The cache file is always
    /// placed inside the build directory. `.` components are dropped, so a base
    /// of `.` resolves to the same paths (and cache keys) as an empty base.
    pub fn under(config: &KilnConfig, base: &Path) -> Self {
        let paths = &config.paths;
        let build_dir = join_clean(base, &paths.build_dir);
        Self {
            source_root: join_clean(base, &paths.source_root),
            cache_file: join_clean(&build_dir, &paths.cache_file),
            output: join_clean(base, &paths.output),
            build_dir,
        }
    }
}

fn join_clean(base: &Path, path: &Path) -> PathBuf {
    let joined: PathBuf = base
        .join(path)
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    if joined.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        joined
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_config_from_str;

    #[test]
    fn default_paths_stay_relative() {
        let resolved = ResolvedPaths::from_config(&KilnConfig::default());
        assert_eq!(resolved.source_root, PathBuf::from("src"));
        assert_eq!(resolved.build_dir, PathBuf::from("build"));
        assert_eq!(resolved.cache_file, PathBuf::from("build/hashes.json"));
        assert_eq!(resolved.output, PathBuf::from("kette.bin"));
    }

    #[test]
    fn relative_paths_join_base() {
        let resolved = ResolvedPaths::under(&KilnConfig::default(), Path::new("/work/vm"));
        assert_eq!(resolved.source_root, PathBuf::from("/work/vm/src"));
        assert_eq!(resolved.cache_file, PathBuf::from("/work/vm/build/hashes.json"));
        assert_eq!(resolved.output, PathBuf::from("/work/vm/kette.bin"));
    }

    #[test]
    fn absolute_paths_ignore_base() {
        let config = load_config_from_str(
            r#"
[paths]
build_dir = "/tmp/kiln-out"
"#,
        )
        .unwrap();
        let resolved = ResolvedPaths::under(&config, Path::new("/work/vm"));
        assert_eq!(resolved.build_dir, PathBuf::from("/tmp/kiln-out"));
        assert_eq!(resolved.cache_file, PathBuf::from("/tmp/kiln-out/hashes.json"));
        assert_eq!(resolved.source_root, PathBuf::from("/work/vm/src"));
    }

    #[test]
    fn dot_base_matches_empty_base() {
        let config = KilnConfig::default();
        assert_eq!(
            ResolvedPaths::under(&config, Path::new(".")),
            ResolvedPaths::from_config(&config)
        );
    }

    #[test]
    fn dot_components_are_dropped() {
        let config = load_config_from_str(
            r#"
[paths]
source_root = "./src"
build_dir = "./out/./objs"
"#,
        )
        .unwrap();
        let resolved = ResolvedPaths::under(&config, Path::new("./vm"));
        assert_eq!(resolved.source_root, PathBuf::from("vm/src"));
        assert_eq!(resolved.build_dir, PathBuf::from("vm/out/objs"));
        assert_eq!(resolved.cache_file, PathBuf::from("vm/out/objs/hashes.json"));
    }

    #[test]
    fn current_directory_source_root_stays_usable() {
        let config = load_config_from_str("[paths]\nsource_root = \".\"\n").unwrap();
        let resolved = ResolvedPaths::under(&config, Path::new("."));
        assert_eq!(resolved.source_root, PathBuf::from("."));
    }
}
