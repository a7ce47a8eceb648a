//! Configuration types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::defaults::{
    DEFAULT_BRANCH_PREFIX, DEFAULT_CHANGELOG_FILE, DEFAULT_GITLAB_HOST, DEFAULT_TAG_MESSAGE,
    DEFAULT_TIMEOUT_SECS, DEFAULT_WORKERS,
};

/// Main configuration for relnotes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// GitLab connection settings
    pub gitlab: GitLabConfig,

    /// Default project path (e.g. `group/project`) or numeric ID
    pub project: Option<String>,

    /// Default starting tag or commit for the note range
    pub since: Option<String>,

    /// Release defaults
    pub release: ReleaseDefaults,

    /// Changelog file settings
    pub changelog: ChangelogFileConfig,

    /// Maximum concurrent merge request lookups
    pub workers: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gitlab: GitLabConfig::default(),
            project: None,
            since: None,
            release: ReleaseDefaults::default(),
            changelog: ChangelogFileConfig::default(),
            workers: DEFAULT_WORKERS,
        }
    }
}

/// GitLab connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitLabConfig {
    /// Base URL of the GitLab instance
    pub host: String,

    /// Personal/project access token
    pub token: Option<String>,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for GitLabConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_GITLAB_HOST.to_string(),
            token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl GitLabConfig {
    /// Return a copy with the host and token replaced where overrides are given
    pub fn with_overrides(&self, host: Option<&str>, token: Option<&str>) -> Self {
        let mut config = self.clone();
        if let Some(host) = host {
            config.host = normalize_host(host);
        }
        if let Some(token) = token {
            config.token = Some(token.to_string());
        }
        config
    }
}

/// Release defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseDefaults {
    /// Default ref to release from
    pub ref_name: Option<String>,

    /// Annotation message for created tags (`{tag}` is replaced)
    pub tag_message: String,
}

impl Default for ReleaseDefaults {
    fn default() -> Self {
        Self {
            ref_name: None,
            tag_message: DEFAULT_TAG_MESSAGE.to_string(),
        }
    }
}

impl ReleaseDefaults {
    /// Render the tag annotation for a tag name
    pub fn tag_message_for(&self, tag: &str) -> String {
        self.tag_message.replace("{tag}", tag)
    }
}

/// Changelog file configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangelogFileConfig {
    /// Changelog file path inside the repository
    pub file: PathBuf,

    /// Prefix of the branch that carries the changelog update
    pub branch_prefix: String,
}

impl Default for ChangelogFileConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from(DEFAULT_CHANGELOG_FILE),
            branch_prefix: DEFAULT_BRANCH_PREFIX.to_string(),
        }
    }
}

/// Prepend `https://` to bare hosts and drop trailing slashes
pub fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}
