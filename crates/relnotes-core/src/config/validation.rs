//! Configuration validation

use tracing::debug;
use url::Url;

use crate::error::ConfigError;

use super::types::Config;

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    debug!("validating configuration");
    validate_gitlab(config)?;
    validate_release(config)?;
    validate_changelog(config)?;

    if config.workers == 0 {
        return Err(ConfigError::InvalidValue {
            field: "workers".to_string(),
            message: "must be at least 1".to_string(),
        });
    }

    debug!("configuration validation passed");
    Ok(())
}

fn validate_gitlab(config: &Config) -> Result<(), ConfigError> {
    let url = Url::parse(&config.gitlab.host).map_err(|e| ConfigError::InvalidValue {
        field: "gitlab.host".to_string(),
        message: e.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidValue {
            field: "gitlab.host".to_string(),
            message: "must use http or https".to_string(),
        });
    }

    if config.gitlab.timeout_secs == 0 {
        return Err(ConfigError::InvalidValue {
            field: "gitlab.timeout_secs".to_string(),
            message: "must be greater than zero".to_string(),
        });
    }

    Ok(())
}

fn validate_release(config: &Config) -> Result<(), ConfigError> {
    if config.release.tag_message.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "release.tag_message".to_string(),
            message: "tag message cannot be empty".to_string(),
        });
    }

    Ok(())
}

fn validate_changelog(config: &Config) -> Result<(), ConfigError> {
    if config.changelog.file.as_os_str().is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "changelog.file".to_string(),
            message: "changelog file cannot be empty".to_string(),
        });
    }

    Ok(())
}
