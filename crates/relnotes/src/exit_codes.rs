//! Exit codes for the CLI

use relnotes_core::{ConfigError, ForgeError, PipelineError, RelnotesError};

/// Success
#[allow(dead_code)]
pub const SUCCESS: i32 = 0;

/// General error
pub const ERROR: i32 = 1;

/// Configuration error
pub const CONFIG_ERROR: i32 = 2;

/// Forge (GitLab API) error
pub const FORGE_ERROR: i32 = 3;

/// User cancelled
pub const CANCELLED: i32 = 130;

/// The user declined an interactive prompt
#[derive(Debug, thiserror::Error)]
#[error("Cancelled")]
pub struct Cancelled;

/// Pick the exit code for a failed command
pub fn for_error(error: &anyhow::Error) -> i32 {
    for cause in error.chain() {
        if cause.is::<Cancelled>() {
            return CANCELLED;
        }
        if cause.is::<ConfigError>() {
            return CONFIG_ERROR;
        }
        if cause.is::<ForgeError>() {
            return FORGE_ERROR;
        }
        if let Some(e) = cause.downcast_ref::<PipelineError>() {
            return match e {
                PipelineError::Forge(_) => FORGE_ERROR,
                PipelineError::NoTags(_) => ERROR,
            };
        }
        if let Some(e) = cause.downcast_ref::<RelnotesError>() {
            return match e {
                RelnotesError::Config(_) => CONFIG_ERROR,
                RelnotesError::Forge(_) | RelnotesError::Pipeline(PipelineError::Forge(_)) => {
                    FORGE_ERROR
                }
                _ => ERROR,
            };
        }
    }
    ERROR
}
