//! Configuration loading from disk and the environment.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Service port override.
pub const PORT_ENV: &str = "PORT";
/// Tier name override.
pub const TIER_NAME_ENV: &str = "TIER_NAME";
/// Downstream base URL override. An empty value clears the downstream.
pub const DOWNSTREAM_URL_ENV: &str = "DOWNSTREAM_URL";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {name}: {value:?}")]
    Env { name: &'static str, value: String },

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration: defaults or the given TOML file, then process
/// environment overrides, then validation.
pub fn load(path: Option<&Path>) -> Result<ServiceConfig, ConfigError> {
    load_with_env(path, |name| std::env::var(name).ok())
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    load(Some(path))
}

/// Same as [`load`], reading overrides through `lookup`.
pub fn load_with_env<F>(path: Option<&Path>, lookup: F) -> Result<ServiceConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            toml::from_str(&content)?
        }
        None => ServiceConfig::default(),
    };

    apply_env_overrides(&mut config, lookup)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply `PORT`, `TIER_NAME` and `DOWNSTREAM_URL` on top of `config`.
pub fn apply_env_overrides<F>(config: &mut ServiceConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(PORT_ENV) {
        config.listener.port = value.trim().parse().map_err(|_| ConfigError::Env {
            name: PORT_ENV,
            value,
        })?;
    }

    if let Some(name) = lookup(TIER_NAME_ENV) {
        config.tier.name = name;
    }

    if let Some(url) = lookup(DOWNSTREAM_URL_ENV) {
        config.tier.downstream = if url.trim().is_empty() { None } else { Some(url) };
    }

    Ok(())
}
