//! relnotes core - shared foundations for release note automation
//!
//! This crate provides the error taxonomy, configuration loading and batch
//! file types used by the forge client, the note pipeline and the CLI.

pub mod batch;
pub mod config;
pub mod error;

pub use batch::{load_batch_config, BatchConfig, BatchProject};
pub use config::Config;
pub use error::{ConfigError, ForgeError, PipelineError, RelnotesError, Result};
