//! Init command

use std::path::{Path, PathBuf};

use clap::Args;
use console::style;
use dialoguer::{Confirm, Select};
use tracing::info;

use relnotes_core::config::defaults::{DEFAULT_CONFIG_TEMPLATE, DEFAULT_CONFIG_YAML};
use relnotes_core::config::Config;

use crate::cli::{output, Cli};
use crate::exit_codes::Cancelled;

/// Create a sample configuration file
#[derive(Debug, Args)]
pub struct InitCommand {
    /// Force overwrite existing configuration
    #[arg(short, long)]
    pub force: bool,

    /// Use defaults without prompting
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Output file path
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl InitCommand {
    /// Execute the init command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(force = self.force, yes = self.yes, "executing init command");
        let cwd = std::env::current_dir()?;
        let config_path = self
            .output
            .clone()
            .unwrap_or_else(|| cwd.join(DEFAULT_CONFIG_YAML));

        if config_path.exists() && !self.force {
            if self.yes {
                anyhow::bail!(
                    "Configuration file already exists at {}. Use --force to overwrite.",
                    config_path.display()
                );
            }

            let overwrite = Confirm::new()
                .with_prompt(format!(
                    "Configuration file already exists at {}. Overwrite?",
                    config_path.display()
                ))
                .default(false)
                .interact()?;

            if !overwrite {
                println!("{}", style("Aborted.").yellow());
                return Err(Cancelled.into());
            }
        }

        let toml_requested = config_path.extension().is_some_and(|e| e == "toml");
        let format = if self.yes || toml_requested {
            if toml_requested {
                "toml"
            } else {
                "yaml"
            }
        } else {
            let formats = vec!["yaml", "toml"];
            let selection = Select::new()
                .with_prompt("Configuration format")
                .items(&formats)
                .default(0)
                .interact()?;
            formats[selection]
        };

        let config_path = if format == "toml" {
            config_path.with_extension("toml")
        } else {
            config_path
        };

        write_sample_config(&config_path, format)?;

        if !cli.quiet {
            output::success(&format!(
                "Created configuration at {}",
                output::path_style().apply_to(config_path.display())
            ));
            println!();
            println!("Next steps:");
            println!("  1. Edit {} and set your project and ref", config_path.display());
            println!(
                "  2. Export {} instead of storing the token in the file",
                style("RELNOTES_GITLAB_TOKEN").cyan()
            );
            println!(
                "  3. Run {} to preview release notes",
                style("relnotes release --tag <tag> --markdown-only").cyan()
            );
        }

        Ok(())
    }
}

/// Write the sample configuration as YAML (with comments) or TOML
fn write_sample_config(path: &Path, format: &str) -> anyhow::Result<()> {
    let content = if format == "toml" {
        let config: Config = serde_yaml::from_str(DEFAULT_CONFIG_TEMPLATE)?;
        toml::to_string_pretty(&config)?
    } else {
        DEFAULT_CONFIG_TEMPLATE.to_string()
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use relnotes_core::config::load_config;
    use tempfile::TempDir;

    #[test]
    fn test_sample_yaml_loads() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("relnotes.yaml");
        write_sample_config(&path, "yaml").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.project.as_deref(), Some("group/project-name"));
        assert_eq!(config.release.ref_name.as_deref(), Some("main"));
    }

    #[test]
    fn test_sample_toml_loads() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("relnotes.toml");
        write_sample_config(&path, "toml").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.gitlab.host, "https://gitlab.com");
        assert_eq!(config.workers, 4);
    }
}
