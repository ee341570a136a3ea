//! Configuration layering: defaults, optional JSON file, then overrides.

use std::fs;
use std::path::Path;

use api_relay_types::{ConfigError, DeploymentMode, RelayConfig};
use validator::Validate;

/// Environment variable naming the JSON config file.
pub const CONFIG_ENV_VAR: &str = "API_RELAY_CONFIG";

/// Values supplied on the command line or through the environment.
/// `None` leaves the file/default value untouched.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub environment: Option<DeploymentMode>,
    pub port: Option<u16>,
    pub bind_address: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub accept_invalid_certs: Option<bool>,
}

/// Load the config file at `path`, or defaults when no path is given.
///
/// An explicitly named file that does not exist is an error.
pub fn load_config(path: Option<&Path>) -> Result<RelayConfig, ConfigError> {
    let Some(path) = path else {
        return Ok(RelayConfig::default());
    };

    let display = path.display().to_string();
    let content = fs::read_to_string(path).map_err(|e| ConfigError::from_io_error(&display, &e))?;

    serde_json::from_str(&content).map_err(|e| ConfigError::from_json_error(&e))
}

/// Apply CLI/env overrides on top of a loaded config.
pub fn apply_overrides(config: &mut RelayConfig, overrides: &ConfigOverrides) {
    if let Some(environment) = overrides.environment {
        config.environment = environment;
    }
    if let Some(port) = overrides.port {
        config.port = port;
    }
    if let Some(ref bind_address) = overrides.bind_address {
        config.bind_address.clone_from(bind_address);
    }
    if let Some(timeout) = overrides.request_timeout_secs {
        config.request_timeout_secs = timeout;
    }
    if let Some(accept) = overrides.accept_invalid_certs {
        config.accept_invalid_certs = accept;
    }
}

pub fn validate_config(config: &RelayConfig) -> Result<(), ConfigError> {
    config.validate().map_err(|e| ConfigError::from_validation_errors(&e))
}

/// Full layering: file (if any), overrides, validation.
pub fn resolve_config(
    path: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<RelayConfig, ConfigError> {
    let mut config = load_config(path)?;
    apply_overrides(&mut config, overrides);
    validate_config(&config)?;

    tracing::debug!(
        environment = %config.environment,
        port = config.port,
        timeout_secs = config.request_timeout_secs,
        "Relay configuration resolved"
    );
    Ok(config)
}

/// Write a default config file. Refuses to clobber an existing file unless `force`.
pub fn write_default_config(path: &Path, force: bool) -> Result<RelayConfig, ConfigError> {
    let display = path.display().to_string();
    if path.exists() && !force {
        return Err(ConfigError::ValidationError {
            field: "path".to_string(),
            message: format!("{} already exists (use --force to overwrite)", display),
        });
    }

    let config = RelayConfig::default();
    let content =
        serde_json::to_string_pretty(&config).map_err(|e| ConfigError::from_json_error(&e))?;

    // Atomic write
    let temp_path = path.with_extension("json.tmp");
    fs::write(&temp_path, content).map_err(|e| ConfigError::from_io_error(&display, &e))?;
    fs::rename(&temp_path, path).map_err(|e| ConfigError::from_io_error(&display, &e))?;

    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_no_path_yields_defaults() {
        assert_eq!(load_config(None).unwrap(), RelayConfig::default());
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.json");
        assert!(matches!(load_config(Some(&path)), Err(ConfigError::NotFound { .. })));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("relay.json");
        fs::write(&path, r#"{"environment":"development","port":4000}"#).unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.environment, DeploymentMode::Development);
        assert_eq!(config.port, 4000);
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("relay.json");
        fs::write(&path, "{ port: ").unwrap();
        assert!(matches!(load_config(Some(&path)), Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_overrides_win_over_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("relay.json");
        fs::write(&path, r#"{"port":4000,"environment":"development"}"#).unwrap();

        let overrides = ConfigOverrides {
            port: Some(5000),
            environment: Some(DeploymentMode::Production),
            ..ConfigOverrides::default()
        };
        let config = resolve_config(Some(&path), &overrides).unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.environment, DeploymentMode::Production);
    }

    #[test]
    fn test_invalid_override_fails_validation() {
        let overrides =
            ConfigOverrides { request_timeout_secs: Some(0), ..ConfigOverrides::default() };
        let err = resolve_config(None, &overrides).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ValidationError { ref field, .. } if field == "request_timeout_secs"
        ));
    }

    #[test]
    fn test_write_default_config_refuses_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("relay.json");

        write_default_config(&path, false).unwrap();
        assert_eq!(load_config(Some(&path)).unwrap(), RelayConfig::default());
        assert!(write_default_config(&path, false).is_err());
        assert!(write_default_config(&path, true).is_ok());
    }
}
