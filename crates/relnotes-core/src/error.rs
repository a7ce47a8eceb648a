//! Error types for relnotes

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using RelnotesError
pub type Result<T> = std::result::Result<T, RelnotesError>;

/// Main error type for relnotes operations
#[derive(Debug, Error)]
pub enum RelnotesError {
    /// Configuration-related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Forge API errors
    #[error(transparent)]
    Forge(#[from] ForgeError),

    /// Release note pipeline errors
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found at {0}")]
    NotFound(PathBuf),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {message}")]
    InvalidValue { field: String, message: String },

    /// Missing required field
    #[error("Missing required configuration field: {0}")]
    MissingField(String),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// IO error
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors returned by a forge (GitLab) client
#[derive(Debug, Error)]
pub enum ForgeError {
    /// No API token was configured
    #[error("GitLab token is required (set RELNOTES_GITLAB_TOKEN, pass --gitlab-token, or add it to the config file)")]
    MissingToken,

    /// The configured host could not be turned into an API URL
    #[error("Invalid GitLab URL: {0}")]
    InvalidUrl(String),

    /// Transport-level failure (connect, timeout, TLS)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Non-success response from the API
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Requested entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Response body could not be decoded
    #[error("Invalid response from forge: {0}")]
    InvalidResponse(String),
}

impl ForgeError {
    /// Whether this error means the entity is absent rather than the call failing
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::ApiError { status: 404, .. })
    }
}

/// Errors that abort a release note derivation
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The project has no tags at all
    #[error("No tags found in project {0}")]
    NoTags(String),

    /// Listing tags or commits failed
    #[error("Failed to query forge: {0}")]
    Forge(#[from] ForgeError),
}

impl RelnotesError {
    /// Create a new "other" error with a message
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Self::Other(msg.into())
    }
}
