//! relnotes - release notes and changelog automation for GitLab projects

mod cli;
mod exit_codes;

use std::path::PathBuf;

use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use cli::Cli;

/// Targets written to the log file
const FILE_LOG_FILTER: &str =
    "relnotes=debug,relnotes_core=debug,relnotes_gitlab=debug,relnotes_changelog=debug,warn";

fn main() {
    let cli = Cli::parse();
    let guard = init_tracing(cli.verbose, cli.quiet);

    if let Err(e) = cli.execute() {
        let code = exit_codes::for_error(&e);
        if code != exit_codes::CANCELLED {
            cli::output::error(&format!("{:#}", e));
        }
        // Flush the file writer before exiting
        drop(guard);
        std::process::exit(code);
    }
}

/// Console output goes to stderr and honours RUST_LOG. The JSON file log
/// under ~/.relnotes/logs/ records workspace crates at debug level.
fn init_tracing(verbose: bool, quiet: bool) -> Option<WorkerGuard> {
    let level = match (verbose, quiet) {
        (true, _) => "debug",
        (false, true) => "error",
        (false, false) => "warn",
    };
    let console_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(console_layer(console_filter));

    let Some(log_dir) = log_directory() else {
        registry.init();
        return None;
    };

    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(&log_dir, "relnotes.log"));
    registry
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(writer)
                .with_filter(EnvFilter::new(FILE_LOG_FILTER)),
        )
        .init();
    Some(guard)
}

fn console_layer<S>(filter: EnvFilter) -> impl Layer<S>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(filter)
}

/// `~/.relnotes/logs`, created on demand
fn log_directory() -> Option<PathBuf> {
    let dir = dirs::home_dir()?.join(".relnotes").join("logs");
    std::fs::create_dir_all(&dir).ok()?;
    Some(dir)
}
