//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ServerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ServerConfig, ConfigError> {
    let config: ServerConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Build the startup configuration: the file at `path` (or defaults), then
/// the `bind_override` if any. Validation runs on the final result.
pub fn resolve_config(
    path: Option<&Path>,
    bind_override: Option<String>,
) -> Result<ServerConfig, ConfigError> {
    let mut config: ServerConfig = match path {
        Some(path) => toml::from_str(&fs::read_to_string(path)?)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = bind_override {
        config.listener.bind_address = bind;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [listener]
            bind_address = "127.0.0.1:3000"

            [observability]
            metrics_enabled = false
            "#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:3000");
        assert!(!config.observability.metrics_enabled);
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_parse_error() {
        let err = parse_config("[listener\nbind_address = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_resolve_config_bind_override() {
        let config = resolve_config(None, Some("127.0.0.1:4000".into())).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:4000");

        let err = resolve_config(None, Some("localhost".into())).unwrap_err();
        match err {
            ConfigError::Validation(errors) => assert_eq!(
                errors,
                vec![ValidationError::InvalidBindAddress("localhost".into())]
            ),
            other => panic!("expected validation error, got {other}"),
        }
    }

    #[test]
    fn test_resolve_config_override_replaces_file_address() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[listener]\nbind_address = \"not-an-address\"").unwrap();

        assert!(load_config(file.path()).is_err());
        let config =
            resolve_config(Some(file.path()), Some("127.0.0.1:5000".into())).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:5000");
    }

    #[test]
    fn test_validation_error_message() {
        let err = parse_config(
            r#"
            [observability]
            observation_name = ""
            [timeouts]
            request_ms = 0
            "#,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: observability.observation_name must not be blank, \
             timeouts.request_ms must be greater than zero"
        );
    }
}
