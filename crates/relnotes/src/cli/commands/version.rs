//! Version command

use clap::Args;
use tracing::info;

use crate::cli::{output, Cli};

/// Show version information
#[derive(Debug, Args)]
pub struct VersionCommand {
    /// Print only the version number
    #[arg(short, long)]
    pub short: bool,
}

impl VersionCommand {
    /// Execute the version command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(short = self.short, "executing version command");
        if self.short || cli.quiet {
            println!("{}", env!("CARGO_PKG_VERSION"));
        } else {
            println!(
                "{} {}",
                output::header("relnotes"),
                env!("CARGO_PKG_VERSION")
            );
        }
        Ok(())
    }
}
