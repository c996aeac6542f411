//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::schema::ProviderConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variables that override credential fields.
pub const ENV_DOMAIN: &str = "AUTH0_DOMAIN";
pub const ENV_CLIENT_ID: &str = "AUTH0_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "AUTH0_CLIENT_SECRET";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load a TOML file, apply environment overrides and validate.
pub fn load_config(path: &Path) -> Result<ProviderConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let mut config: ProviderConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Build a configuration from defaults and the environment alone.
pub fn config_from_env() -> Result<ProviderConfig, ConfigError> {
    let mut config = ProviderConfig::default();
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Overwrite credential fields with non-empty values from `lookup`.
pub fn apply_env_overrides<F>(config: &mut ProviderConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let read = |key: &str| lookup(key).filter(|v| !v.is_empty());

    if let Some(domain) = read(ENV_DOMAIN) {
        config.domain = domain;
    }
    if let Some(client_id) = read(ENV_CLIENT_ID) {
        config.client_id = client_id;
    }
    if let Some(client_secret) = read(ENV_CLIENT_SECRET) {
        config.client_secret = client_secret;
    }
}
