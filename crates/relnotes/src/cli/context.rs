//! Settings shared by commands that talk to GitLab
//!
//! Precedence, highest first: per-project batch entry, command line flag,
//! `RELNOTES_*` environment variable, configuration file, built-in default.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use tracing::debug;

use relnotes_changelog::{
    PipelineEvent, PipelineOptions, PipelineReporter, PipelineReporterRegistry,
    ReleaseNotesPipeline,
};
use relnotes_core::config::{
    load_config_or_default, load_config_with_env, validate_config, Config, GitLabConfig,
};
use relnotes_core::ConfigError;
use relnotes_gitlab::GitLabClient;

use crate::cli::{output, Cli};

/// Loaded configuration with command line overrides applied
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// Effective configuration
    pub config: Config,
    /// File the configuration came from
    pub config_path: Option<PathBuf>,
}

impl CommandContext {
    /// Load configuration for a command
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let (mut config, config_path) = match &cli.config_file {
            Some(path) => {
                let config = load_config_with_env(path)
                    .with_context(|| format!("Failed to load {}", path.display()))?;
                (config, Some(path.clone()))
            }
            None => {
                let cwd = std::env::current_dir()?;
                load_config_or_default(&cwd)
            }
        };

        config.gitlab = config
            .gitlab
            .with_overrides(cli.gitlab_host.as_deref(), cli.gitlab_token.as_deref());
        validate_config(&config)?;

        match &config_path {
            Some(path) => debug!(path = %path.display(), "configuration loaded"),
            None => debug!("no configuration file, using defaults"),
        }

        Ok(Self {
            config,
            config_path,
        })
    }

    /// Project from the command line or the configuration
    pub fn project(&self, arg: Option<&str>) -> Result<String, ConfigError> {
        arg.map(str::to_string)
            .or_else(|| self.config.project.clone())
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingField("project (use --project)".to_string()))
    }

    /// Ref from the command line or the configuration
    pub fn ref_name(&self, arg: Option<&str>) -> Result<String, ConfigError> {
        arg.map(str::to_string)
            .or_else(|| self.config.release.ref_name.clone())
            .filter(|r| !r.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingField("ref (use --ref)".to_string()))
    }

    /// Explicit range start from the command line or the configuration
    pub fn since(&self, arg: Option<&str>) -> Option<String> {
        arg.map(str::to_string).or_else(|| self.config.since.clone())
    }

    /// Pipeline options derived from the configuration
    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            workers: self.config.workers,
            ..PipelineOptions::default()
        }
    }

    /// Build a GitLab client for the configured host
    pub fn client(&self) -> anyhow::Result<Arc<GitLabClient>> {
        build_client(&self.config.gitlab)
    }

    /// Tell the user when no configuration file was found
    pub fn note_defaults(&self, cli: &Cli) {
        if self.config_path.is_none() && !cli.quiet {
            output::info("No configuration file found, using defaults and environment");
        }
    }
}

/// Build a GitLab client from connection settings
pub fn build_client(gitlab: &GitLabConfig) -> anyhow::Result<Arc<GitLabClient>> {
    let client = GitLabClient::new(gitlab)
        .with_context(|| format!("Failed to set up GitLab client for {}", gitlab.host))?;
    Ok(Arc::new(client))
}

/// Build the release note pipeline over a client
pub fn pipeline(
    client: &Arc<GitLabClient>,
    options: PipelineOptions,
    reporter: Arc<dyn PipelineReporter>,
) -> ReleaseNotesPipeline {
    ReleaseNotesPipeline::new(client.clone())
        .with_options(options)
        .with_reporter(reporter)
}

/// Tracing for every event, plus console warnings unless quiet
pub fn reporter(project: Option<&str>, quiet: bool) -> Arc<dyn PipelineReporter> {
    let mut registry = PipelineReporterRegistry::new();
    if !quiet {
        registry.register(Arc::new(ConsoleReporter::new(project)));
    }
    Arc::new(registry)
}

/// Shows degraded pipeline outcomes to the user
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    /// Prefix for messages when several projects run at once
    project: Option<String>,
}

impl ConsoleReporter {
    pub fn new(project: Option<&str>) -> Self {
        Self {
            project: project.map(str::to_string),
        }
    }

    /// Warning text for an event, if it is worth showing
    pub fn message(&self, event: &PipelineEvent) -> Option<String> {
        let message = match event {
            PipelineEvent::SinceFallback { reference, .. } => format!(
                "Could not resolve '{}', falling back to the previous tag",
                reference
            ),
            PipelineEvent::MergeRequestFailed { iid, error } => {
                format!("Skipped merge request !{}: {}", iid, error)
            }
            _ => return None,
        };
        Some(match &self.project {
            Some(project) => format!("{}: {}", project, message),
            None => message,
        })
    }
}

impl PipelineReporter for ConsoleReporter {
    fn report(&self, event: &PipelineEvent) {
        if let Some(message) = self.message(event) {
            output::stderr_warning(&message);
        }
    }
}
