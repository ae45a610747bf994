//! Construction of compile and link command lines.

use std::path::Path;

use kiln_config::ToolchainConfig;

use crate::invocation::Invocation;

/// The compiler driver plus the flags passed to every invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    compiler: String,
    flags: Vec<String>,
}

impl Toolchain {
    /// Creates a toolchain for `compiler` with the given common flags.
    pub fn new(compiler: impl Into<String>, flags: Vec<String>) -> Self {
        Self {
            compiler: compiler.into(),
            flags,
        }
    }

    /// Builds the toolchain described by the `[toolchain]` config section.
    pub fn from_config(config: &ToolchainConfig) -> Self {
        Self::new(config.compiler.clone(), config.include_flags())
    }

    /// The compiler program.
    pub fn compiler(&self) -> &str {
        &self.compiler
    }

    /// `<compiler> <flags> -c <source> -o <object>`
    pub fn compile_command(&self, source: &Path, object: &Path) -> Invocation {
        Invocation::new(self.compiler.as_str())
            .args(&self.flags)
            .arg("-c")
            .arg(source)
            .arg("-o")
            .arg(object)
    }

    /// `<compiler> <flags> -o <output> <objects...>`
    pub fn link_command<P: AsRef<Path>>(&self, objects: &[P], output: &Path) -> Invocation {
        Invocation::new(self.compiler.as_str())
            .args(&self.flags)
            .arg("-o")
            .arg(output)
            .args(objects.iter().map(|o| o.as_ref().as_os_str()))
    }
}
