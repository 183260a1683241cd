mod types;

pub use types::*;

use crate::{Error, Result};
use std::{env, path::Path};
use tracing::debug;

pub const API_KEY_ENV: &str = "REPLICATE_API_KEY";
pub const API_BASE_ENV: &str = "REPLICATE_API_BASE";

/// Loads the config file named by `CONFIG_PATH` and applies environment overrides.
pub async fn load() -> Result<Config> {
    let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());

    let config = load_from_path(&config_path).await?;

    let config = apply_env_overrides(config, |key| env::var(key).ok());
    validate(&config)?;

    Ok(config)
}

/// Reads a YAML config file. A missing file yields the defaults.
pub async fn load_from_path(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();

    if !tokio::fs::try_exists(path).await? {
        debug!("No configuration file at {}, using defaults", path.display());
        return Ok(Config::default());
    }

    debug!("Loading configuration from: {}", path.display());

    let config_str = tokio::fs::read_to_string(path).await?;
    let config: Config = serde_yaml::from_str(&config_str)?;

    Ok(config)
}

pub fn apply_env_overrides<F>(mut config: Config, lookup: F) -> Config
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(key) = lookup(API_KEY_ENV).filter(|key| !key.is_empty()) {
        config.replicate.api_key = Some(key);
    }

    if let Some(base) = lookup(API_BASE_ENV)
        .map(|base| base.trim().trim_end_matches('/').to_string())
        .filter(|base| !base.is_empty())
    {
        config.replicate.base_url = base;
    }

    config
}

pub fn validate(config: &Config) -> Result<()> {
    if config.replicate.base_url.is_empty() {
        return Err(Error::config("replicate.base_url must not be empty"));
    }

    if config.replicate.model.is_empty() {
        return Err(Error::config("replicate.model must not be empty"));
    }

    if config.replicate.poll.max_attempts == 0 {
        return Err(Error::config("replicate.poll.max_attempts must be at least 1"));
    }

    Ok(())
}
