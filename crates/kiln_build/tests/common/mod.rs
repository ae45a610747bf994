// Shared fixtures for the engine integration tests.
#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use kiln_build::{
    Build, BuildError, BuildReport, CompilationUnit, ConsoleReporter, Reporter, ToolFailure,
    ToolOutput,
};
use kiln_config::{KilnConfig, ResolvedPaths};
use tempfile::TempDir;

/// A stand-in compiler driver.
///
/// Compile mode writes `object(<source>)` into the object file, fails for
/// sources containing `BROKEN` and prints a warning (but succeeds) for
/// sources containing `WARN`. Link mode concatenates the `.o` arguments
/// into the output, and fails while a `LINKFAIL` marker exists in the
/// project root. Every invocation is appended to the log.
const FAKE_COMPILER: &str = r#"#!/bin/sh
echo "$*" >> '@LOG@'
out=""
src=""
compile=0
prev=""
for arg in "$@"; do
  case "$prev" in
    -o) out="$arg" ;;
    -c) src="$arg" ;;
  esac
  if [ "$arg" = "-c" ]; then compile=1; fi
  prev="$arg"
done
if [ "$compile" = 1 ]; then
  if grep -q BROKEN "$src"; then
    echo "$src:1:1: error: broken source" >&2
    exit 1
  fi
  if grep -q WARN "$src"; then
    echo "$src:1:1: warning: suspicious source" >&2
  fi
  printf 'object(%s)\n' "$src" > "$out"
  exit 0
fi
if [ -e '@ROOT@/LINKFAIL' ]; then
  echo "ld: error: refusing to link" >&2
  exit 1
fi
: > "$out"
for arg in "$@"; do
  case "$arg" in
    *.o) cat "$arg" >> "$out" ;;
  esac
done
"#;

/// A scratch project with a `src/` tree and a fake compiler.
pub struct Project {
    dir: TempDir,
    compiler: PathBuf,
    log: PathBuf,
}

impl Project {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path().to_path_buf();
        fs::create_dir_all(root.join("src")).unwrap();

        let log = root.join("invocations.log");
        let compiler = root.join("fakecc");
        let script = FAKE_COMPILER
            .replace("@LOG@", &log.display().to_string())
            .replace("@ROOT@", &root.display().to_string());
        fs::write(&compiler, script).unwrap();
        fs::set_permissions(&compiler, fs::Permissions::from_mode(0o755)).unwrap();

        Self { dir, compiler, log }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn source(&self, rel: &str) -> PathBuf {
        self.root().join("src").join(rel)
    }

    pub fn object(&self, name: &str) -> PathBuf {
        self.root().join("build").join(name)
    }

    pub fn output(&self) -> PathBuf {
        self.root().join("kette.bin")
    }

    pub fn cache_file(&self) -> PathBuf {
        self.root().join("build").join("hashes.json")
    }

    pub fn write_source(&self, rel: &str, content: &str) {
        let path = self.source(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    pub fn remove_source(&self, rel: &str) {
        fs::remove_file(self.source(rel)).unwrap();
    }

    /// Default configuration with the fake compiler swapped in.
    pub fn config(&self) -> KilnConfig {
        let mut config = KilnConfig::default();
        config.toolchain.compiler = self.compiler.display().to_string();
        config
    }

    pub fn build(&self) -> Result<BuildReport, BuildError> {
        self.build_with(&self.config())
    }

    pub fn build_with(&self, config: &KilnConfig) -> Result<BuildReport, BuildError> {
        let paths = ResolvedPaths::under(config, self.root());
        Build::new(config, paths).run(&mut ConsoleReporter::new(true))
    }

    /// Runs a build and also returns the stderr of every successful tool run.
    pub fn build_capturing_output(
        &self,
        config: &KilnConfig,
    ) -> (Result<BuildReport, BuildError>, Vec<(PathBuf, String)>) {
        let paths = ResolvedPaths::under(config, self.root());
        let mut reporter = CapturingReporter::default();
        let result = Build::new(config, paths).run(&mut reporter);
        (result, reporter.outputs)
    }

    /// Paths relative to the project root, for comparing two projects.
    pub fn relative(&self, paths: &[PathBuf]) -> Vec<PathBuf> {
        paths
            .iter()
            .map(|p| p.strip_prefix(self.root()).unwrap().to_path_buf())
            .collect()
    }

    /// All logged invocations since the last [`clear_log`](Self::clear_log).
    pub fn invocations(&self) -> Vec<String> {
        fs::read(&self.log)
            .map(|bytes| {
                String::from_utf8_lossy(&bytes)
                    .lines()
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn compile_invocations(&self) -> usize {
        self.invocations().iter().filter(|l| l.contains(" -c ")).count()
    }

    pub fn link_invocations(&self) -> usize {
        self.invocations()
            .iter()
            .filter(|l| !l.contains(" -c "))
            .count()
    }

    pub fn clear_log(&self) {
        let _ = fs::remove_file(&self.log);
    }

    pub fn cache_text(&self) -> String {
        fs::read_to_string(self.cache_file()).unwrap()
    }

    pub fn cache_json(&self) -> serde_json::Value {
        serde_json::from_str(&self.cache_text()).unwrap()
    }

    pub fn set_link_failure(&self, fail: bool) {
        let marker = self.root().join("LINKFAIL");
        if fail {
            fs::write(marker, "").unwrap();
        } else {
            let _ = fs::remove_file(marker);
        }
    }
}

pub fn sorted(mut paths: Vec<PathBuf>) -> Vec<PathBuf> {
    paths.sort();
    paths
}

/// Keeps the stderr of successful tool runs that printed something.
#[derive(Default)]
pub struct CapturingReporter {
    pub outputs: Vec<(PathBuf, String)>,
}

impl Reporter for CapturingReporter {
    fn skipped(&mut self, _unit: &CompilationUnit) {}

    fn recompiling(&mut self, _unit: &CompilationUnit) {}

    fn compile_failed(&mut self, _unit: &CompilationUnit, _failure: &ToolFailure) {}

    fn tool_output(&mut self, target: &Path, output: &ToolOutput) {
        let stderr = output.stderr_lossy();
        if !stderr.is_empty() {
            self.outputs.push((target.to_path_buf(), stderr));
        }
    }

    fn linking(&mut self, _objects: usize, _output: &Path) {}

    fn link_failed(&mut self, _output: &Path, _failure: &ToolFailure) {}
}
