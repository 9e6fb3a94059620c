//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::RatchetConfig;
use std::path::Path;

/// Name of the configuration file at the project root.
pub const CONFIG_FILE: &str = "ratchet.toml";

/// Loads and validates a `ratchet.toml` configuration from a project directory.
pub fn load_config(project_dir: &Path) -> Result<RatchetConfig, ConfigError> {
    let config_path = project_dir.join(CONFIG_FILE);
    let content = std::fs::read_to_string(&config_path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `ratchet.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<RatchetConfig, ConfigError> {
    let config: RatchetConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that required fields are present and values are consistent.
fn validate_config(config: &RatchetConfig) -> Result<(), ConfigError> {
    if config.output.directory.is_empty() {
        return Err(ConfigError::MissingField("output.directory".to_string()));
    }
    if config.resolver.load_paths.iter().any(|p| p.is_empty()) {
        return Err(ConfigError::ValidationError(
            "resolver.load_paths contains an empty path".to_string(),
        ));
    }
    if config.clean.keep == 0 {
        return Err(ConfigError::ValidationError(
            "clean.keep must be at least 1 (the current version is always kept)".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let toml = r#"
[output]
directory = "public/assets"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.output.directory, "public/assets");
        assert!(config.output.manifest.is_none());
        assert!(config.resolver.load_paths.is_empty());
        assert!(config.compile.gzip);
        assert!(config.compile.concurrent);
        assert_eq!(config.clean.keep, 2);
        assert_eq!(config.clean.max_age, 3600);
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[output]
directory = "public/assets"
manifest = "public/assets/.sprockets-manifest-0123456789abcdef0123456789abcdef.json"

[resolver]
load_paths = ["app/assets", "lib/assets"]

[compile]
gzip = false
concurrent = false
workers = 4

[clean]
keep = 3
max_age = 60
"#;
        let config = load_config_from_str(toml).unwrap();
        assert!(config.output.manifest.is_some());
        assert_eq!(config.resolver.load_paths.len(), 2);
        assert!(!config.compile.gzip);
        assert!(!config.compile.concurrent);
        assert_eq!(config.compile.workers, 4);
        assert_eq!(config.clean.keep, 3);
        assert_eq!(config.clean.max_age, 60);
    }

    #[test]
    fn missing_directory_errors() {
        let toml = r#"
[output]
directory = ""
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(_)));
    }

    #[test]
    fn missing_output_table_is_a_parse_error() {
        let err = load_config_from_str("[compile]\ngzip = true\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn empty_load_path_errors() {
        let toml = r#"
[output]
directory = "out"

[resolver]
load_paths = ["app", ""]
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn zero_keep_errors() {
        let toml = r#"
[output]
directory = "out"

[clean]
keep = 0
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn invalid_toml_errors() {
        let err = load_config_from_str("this is not valid toml {{{}}}").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn load_from_project_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "[output]\ndirectory = \"public\"\n",
        )
        .unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.output.directory, "public");
    }

    #[test]
    fn io_error_from_nonexistent_dir() {
        let err = load_config(Path::new("/nonexistent/dir")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
