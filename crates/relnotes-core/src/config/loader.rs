//! Configuration loading

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::ConfigError;

use super::defaults::{config_file_names, ENV_GITLAB_HOST, ENV_GITLAB_TOKEN, ENV_PROJECT};
use super::types::{normalize_host, Config};
use super::validation::validate_config;

type Result<T> = std::result::Result<T, ConfigError>;

/// Serialization format of a config file, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
    Json,
}

impl ConfigFormat {
    /// Detect the format from a path's extension (YAML when unknown)
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::Toml,
            Some("json") => Self::Json,
            _ => Self::Yaml,
        }
    }
}

/// Deserialize any serde type from a YAML, TOML or JSON file
pub fn read_structured<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let format = ConfigFormat::from_path(path);
    debug!(path = %path.display(), ?format, "reading structured file");

    let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

    let value = match format {
        ConfigFormat::Toml => toml::from_str(&content).map_err(ConfigError::TomlError)?,
        ConfigFormat::Json => serde_json::from_str(&content).map_err(ConfigError::JsonError)?,
        ConfigFormat::Yaml => serde_yaml::from_str(&content).map_err(ConfigError::YamlError)?,
    };
    Ok(value)
}

/// Load configuration from a file
pub fn load_config(path: &Path) -> Result<Config> {
    info!(path = %path.display(), "loading config");

    let mut config: Config = read_structured(path)?;
    config.gitlab.host = normalize_host(&config.gitlab.host);

    validate_config(&config)?;
    debug!(path = %path.display(), "config loaded and validated");
    Ok(config)
}

/// Find configuration file in directory or parent directories.
///
/// Every directory from `start_dir` up to the filesystem root is checked
/// for each name in [`config_file_names`]; the first match wins. When
/// nothing is found the user config directory (`~/.config/relnotes/`)
/// is checked for `config.yaml` and `config.toml`.
pub fn find_config(start_dir: &Path) -> Option<PathBuf> {
    debug!(start_dir = %start_dir.display(), "searching for config file");
    let mut current = start_dir.to_path_buf();

    loop {
        for name in config_file_names() {
            let config_path = current.join(name);
            if config_path.is_file() {
                info!(path = %config_path.display(), "found config file");
                return Some(config_path);
            }
        }

        if !current.pop() {
            break;
        }
    }

    let user_dir = dirs::config_dir()?.join("relnotes");
    for name in ["config.yaml", "config.toml"] {
        let path = user_dir.join(name);
        if path.is_file() {
            info!(path = %path.display(), "found user config file");
            return Some(path);
        }
    }

    debug!("no config file found");
    None
}

/// Load configuration from directory (searching parent directories)
pub fn load_config_from_dir(dir: &Path) -> Result<(Config, PathBuf)> {
    let config_path = find_config(dir).ok_or_else(|| ConfigError::NotFound(dir.to_path_buf()))?;

    let config = load_config(&config_path)?;
    Ok((config, config_path))
}

/// Load configuration or use defaults, then apply environment overrides
pub fn load_config_or_default(dir: &Path) -> (Config, Option<PathBuf>) {
    let (config, path) = match load_config_from_dir(dir) {
        Ok((config, path)) => (config, Some(path)),
        Err(ConfigError::NotFound(_)) => {
            debug!(dir = %dir.display(), "no config found, using defaults");
            (Config::default(), None)
        }
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "config unreadable, using defaults");
            (Config::default(), None)
        }
    };
    (apply_env_overrides(config), path)
}

/// Load an explicit configuration file and apply environment overrides
pub fn load_config_with_env(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }
    Ok(apply_env_overrides(load_config(path)?))
}

/// Apply `RELNOTES_*` environment variables on top of a loaded config
pub fn apply_env_overrides(config: Config) -> Config {
    apply_overrides(config, |key| std::env::var(key).ok())
}

/// Apply overrides from an arbitrary variable lookup; empty values are ignored
pub fn apply_overrides<F>(mut config: Config, lookup: F) -> Config
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(host) = get(ENV_GITLAB_HOST) {
        debug!("gitlab host overridden from environment");
        config.gitlab.host = normalize_host(&host);
    }
    if let Some(token) = get(ENV_GITLAB_TOKEN) {
        debug!("gitlab token overridden from environment");
        config.gitlab.token = Some(token);
    }
    if let Some(project) = get(ENV_PROJECT) {
        config.project = Some(project);
    }
    config
}
