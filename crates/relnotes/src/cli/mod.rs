//! CLI definition and command handling

pub mod commands;
pub mod context;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::{BatchCommand, ChangelogCommand, InitCommand, ReleaseCommand, VersionCommand};

/// relnotes - release notes and changelog automation for GitLab projects
#[derive(Debug, Parser)]
#[command(name = "relnotes")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file (default: search from the working directory)
    #[arg(long, global = true)]
    pub config_file: Option<PathBuf>,

    /// GitLab host URL
    #[arg(long, global = true, env = "RELNOTES_GITLAB_HOST")]
    pub gitlab_host: Option<String>,

    /// GitLab API token
    #[arg(long, global = true, env = "RELNOTES_GITLAB_TOKEN", hide_env_values = true)]
    pub gitlab_token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a tag and release with generated release notes
    Release(ReleaseCommand),

    /// Open a merge request adding release notes to the changelog
    Changelog(ChangelogCommand),

    /// Process several projects from a batch file
    Batch(BatchCommand),

    /// Create a sample configuration file
    Init(InitCommand),

    /// Show version information
    Version(VersionCommand),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(&self) -> anyhow::Result<()> {
        match &self.command {
            Commands::Release(cmd) => cmd.execute(self),
            Commands::Changelog(cmd) => cmd.execute(self),
            Commands::Batch(cmd) => cmd.execute(self),
            Commands::Init(cmd) => cmd.execute(self),
            Commands::Version(cmd) => cmd.execute(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_release() {
        let cli = Cli::try_parse_from([
            "relnotes",
            "--gitlab-host",
            "git.example.com",
            "release",
            "-p",
            "group/app",
            "-r",
            "main",
            "-t",
            "v1.1",
            "--since",
            "v1.0",
            "--dry-run",
        ])
        .unwrap();

        assert_eq!(cli.gitlab_host.as_deref(), Some("git.example.com"));
        match cli.command {
            Commands::Release(cmd) => {
                assert_eq!(cmd.project.as_deref(), Some("group/app"));
                assert_eq!(cmd.ref_name.as_deref(), Some("main"));
                assert_eq!(cmd.tag, "v1.1");
                assert_eq!(cmd.since.as_deref(), Some("v1.0"));
                assert!(cmd.dry_run);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_markdown_only_conflicts_with_tag_only() {
        let result = Cli::try_parse_from([
            "relnotes",
            "release",
            "-t",
            "v1",
            "--markdown-only",
            "--tag-only",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_batch() {
        let cli = Cli::try_parse_from([
            "relnotes",
            "batch",
            "-c",
            "projects.yaml",
            "--merge-markdown",
            "--workers",
            "8",
        ])
        .unwrap();

        match cli.command {
            Commands::Batch(cmd) => {
                assert_eq!(cmd.config, PathBuf::from("projects.yaml"));
                assert!(cmd.merge_markdown);
                assert_eq!(cmd.workers, Some(8));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
