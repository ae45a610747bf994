//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::KilnConfig;
use std::path::Path;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = "kiln.toml";

/// Loads and validates the configuration file at `path`.
pub fn load_config(path: &Path) -> Result<KilnConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Loads `<dir>/kiln.toml`, or the defaults when the file does not exist.
///
/// A file that exists but cannot be read or parsed is still an error.
pub fn load_config_or_default(dir: &Path) -> Result<KilnConfig, ConfigError> {
    let path = dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(KilnConfig::default());
    }
    load_config(&path)
}

/// Parses and validates a `kiln.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<KilnConfig, ConfigError> {
    let config: KilnConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that configuration values are usable.
fn validate_config(config: &KilnConfig) -> Result<(), ConfigError> {
    if config.toolchain.compiler.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "toolchain.compiler must not be empty".to_string(),
        ));
    }
    for (field, ext) in [
        ("toolchain.source_extension", &config.toolchain.source_extension),
        ("toolchain.object_extension", &config.toolchain.object_extension),
    ] {
        if ext.is_empty() || ext.starts_with('.') {
            return Err(ConfigError::ValidationError(format!(
                "{field} must be a non-empty extension without a leading dot"
            )));
        }
    }
    if config.toolchain.source_extension == config.toolchain.object_extension {
        return Err(ConfigError::ValidationError(
            "toolchain.source_extension and toolchain.object_extension must differ".to_string(),
        ));
    }
    if config.build.jobs == 0 {
        return Err(ConfigError::ValidationError(
            "build.jobs must be at least 1".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FailurePolicy;
    use std::path::PathBuf;

    #[test]
    fn parse_empty_config_is_default() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config, KilnConfig::default());
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[paths]
source_root = "vm/src"
build_dir = "out"
output = "bin/vm"
cache_file = "digests.json"

[toolchain]
compiler = "g++"
include_dirs = ["vm/include"]
source_extension = "cc"
object_extension = "obj"

[build]
on_failure = "abort"
retry_failed = true
prune_stale_objects = true
sorted_link_inputs = true
jobs = 4
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.paths.source_root, PathBuf::from("vm/src"));
        assert_eq!(config.paths.build_dir, PathBuf::from("out"));
        assert_eq!(config.paths.output, PathBuf::from("bin/vm"));
        assert_eq!(config.paths.cache_file, PathBuf::from("digests.json"));
        assert_eq!(config.toolchain.compiler, "g++");
        assert_eq!(config.toolchain.source_extension, "cc");
        assert_eq!(config.toolchain.object_extension, "obj");
        assert_eq!(config.build.on_failure, FailurePolicy::Abort);
        assert!(config.build.retry_failed);
        assert!(config.build.prune_stale_objects);
        assert!(config.build.sorted_link_inputs);
        assert_eq!(config.build.jobs, 4);
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let err = load_config_from_str("[paths\nsource_root = ").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn unknown_field_is_parse_error() {
        let err = load_config_from_str("[build]\nparallel = true\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn zero_jobs_rejected() {
        let err = load_config_from_str("[build]\njobs = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn dotted_extension_rejected() {
        let err = load_config_from_str("[toolchain]\nsource_extension = \".cpp\"\n").unwrap_err();
        assert!(err.to_string().contains("toolchain.source_extension"));
    }

    #[test]
    fn same_extensions_rejected() {
        let toml = "[toolchain]\nsource_extension = \"o\"\nobject_extension = \"o\"\n";
        assert!(matches!(
            load_config_from_str(toml),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn empty_compiler_rejected() {
        let err = load_config_from_str("[toolchain]\ncompiler = \"  \"\n").unwrap_err();
        assert!(err.to_string().contains("toolchain.compiler"));
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_or_default(dir.path()).unwrap();
        assert_eq!(config, KilnConfig::default());
    }

    #[test]
    fn present_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[build]\njobs = 2\n").unwrap();
        let config = load_config_or_default(dir.path()).unwrap();
        assert_eq!(config.build.jobs, 2);
    }

    #[test]
    fn explicit_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(&dir.path().join("other.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
