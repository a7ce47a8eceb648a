//! Batch command

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use relnotes_changelog::{
    merge_categorized_notes, parse_release_notes, CategorizedNotes, PipelineOptions,
};
use relnotes_core::config::{GitLabConfig, ReleaseDefaults};
use relnotes_core::{load_batch_config, BatchProject};
use relnotes_gitlab::ForgePublisher;

use crate::cli::commands::release::release_document;
use crate::cli::context::{build_client, pipeline, reporter, CommandContext};
use crate::cli::{output, Cli};

/// Process several projects from a batch file
#[derive(Debug, Args)]
pub struct BatchCommand {
    /// Batch file listing projects and tags (YAML, TOML or JSON)
    #[arg(short, long)]
    pub config: PathBuf,

    /// Show what would be done without making changes
    #[arg(long)]
    pub dry_run: bool,

    /// Only generate markdown, do not create tags or releases
    #[arg(long, conflicts_with = "tag_only")]
    pub markdown_only: bool,

    /// Only create tags, do not upload release notes
    #[arg(long)]
    pub tag_only: bool,

    /// Directory for markdown files
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Merge all projects into one product-level document
    #[arg(long)]
    pub merge_markdown: bool,

    /// Product name for merged markdown (default: from the batch file)
    #[arg(long)]
    pub product_name: Option<String>,

    /// Number of projects processed concurrently
    #[arg(long)]
    pub workers: Option<usize>,
}

/// Result of processing one project
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectStatus {
    Success,
    Empty,
    DryRun,
    Error,
}

/// Per-project outcome
#[derive(Debug, Clone)]
pub struct ProjectOutcome {
    pub project: String,
    pub file_stem: String,
    pub tag: String,
    pub status: ProjectStatus,
    pub message: String,
    pub markdown: Option<String>,
    pub notes: Option<CategorizedNotes>,
}

impl ProjectOutcome {
    fn new(project: &BatchProject, status: ProjectStatus, message: impl Into<String>) -> Self {
        Self {
            project: project.project.clone(),
            file_stem: project.file_stem(),
            tag: project.tag.clone(),
            status,
            message: message.into(),
            markdown: None,
            notes: None,
        }
    }

    fn error(project: &BatchProject, error: &anyhow::Error) -> Self {
        Self::new(project, ProjectStatus::Error, format!("{:#}", error))
    }

    fn with_notes(mut self, markdown: Option<String>, notes: CategorizedNotes) -> Self {
        self.markdown = markdown;
        self.notes = Some(notes);
        self
    }

    /// Counted as succeeded in the summary
    pub fn succeeded(&self) -> bool {
        matches!(self.status, ProjectStatus::Success | ProjectStatus::DryRun)
    }
}

/// Settings shared by every project task
struct BatchSettings {
    gitlab: GitLabConfig,
    release: ReleaseDefaults,
    options: PipelineOptions,
    dry_run: bool,
    markdown_only: bool,
    tag_only: bool,
    merge_markdown: bool,
    quiet: bool,
}

/// Outcome counts
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub empty: usize,
}

impl BatchSummary {
    pub fn from_outcomes(outcomes: &[ProjectOutcome]) -> Self {
        let mut summary = Self::default();
        for outcome in outcomes {
            match outcome.status {
                ProjectStatus::Success | ProjectStatus::DryRun => summary.succeeded += 1,
                ProjectStatus::Error => summary.failed += 1,
                ProjectStatus::Empty => summary.empty += 1,
            }
        }
        summary
    }
}

impl BatchCommand {
    /// Execute the batch command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(self.run(cli))
    }

    async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let ctx = CommandContext::load(cli)?;
        let batch = load_batch_config(&self.config)
            .with_context(|| format!("Error loading batch config {}", self.config.display()))?;

        let product_name = self
            .product_name
            .clone()
            .unwrap_or_else(|| batch.product_name_or_default());
        let workers = self.workers.unwrap_or(ctx.config.workers).max(1);
        info!(
            projects = batch.projects.len(),
            workers,
            dry_run = self.dry_run,
            markdown_only = self.markdown_only,
            tag_only = self.tag_only,
            merge_markdown = self.merge_markdown,
            "executing batch command"
        );

        if !cli.quiet {
            output::info(&format!(
                "Processing {} projects with {} workers",
                batch.projects.len(),
                workers
            ));
        }

        let settings = Arc::new(BatchSettings {
            gitlab: ctx.config.gitlab.clone(),
            release: ctx.config.release.clone(),
            options: ctx.pipeline_options(),
            dry_run: self.dry_run,
            markdown_only: self.markdown_only,
            tag_only: self.tag_only,
            merge_markdown: self.merge_markdown,
            quiet: cli.quiet,
        });

        let semaphore = Arc::new(Semaphore::new(workers));
        let mut handles = Vec::with_capacity(batch.projects.len());
        for project in batch.projects {
            let semaphore = semaphore.clone();
            let settings = settings.clone();
            let fallback = project.clone();
            let handle = tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                process_project(&settings, &project).await
            });
            handles.push((fallback, handle));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        for (project, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => ProjectOutcome::new(
                    &project,
                    ProjectStatus::Error,
                    format!("Task panicked: {}", e),
                ),
            };
            if !cli.quiet || outcome.status == ProjectStatus::Error {
                print_progress(&outcome);
            }
            outcomes.push(outcome);
        }

        self.emit_markdown(&outcomes, &product_name, cli.quiet)?;

        let summary = BatchSummary::from_outcomes(&outcomes);
        if !cli.quiet {
            println!();
            println!(
                "{} {} succeeded, {} failed, {} empty",
                output::header("Summary:"),
                summary.succeeded,
                summary.failed,
                summary.empty
            );
        }

        if summary.failed > 0 {
            anyhow::bail!("{} of {} projects failed", summary.failed, outcomes.len());
        }
        Ok(())
    }

    fn emit_markdown(
        &self,
        outcomes: &[ProjectOutcome],
        product_name: &str,
        quiet: bool,
    ) -> anyhow::Result<()> {
        let successful: Vec<&ProjectOutcome> = outcomes
            .iter()
            .filter(|o| o.succeeded() && o.notes.is_some())
            .collect();

        if self.merge_markdown {
            if successful.is_empty() {
                return Ok(());
            }
            let merged = merge_categorized_notes(
                successful.iter().filter_map(|o| o.notes.clone()),
                Some(product_name),
            );
            match &self.output_dir {
                Some(dir) => {
                    let path = write_merged(dir, product_name, &merged)?;
                    if !quiet {
                        output::success(&format!(
                            "Merged release notes saved to: {}",
                            output::path_style().apply_to(path.display())
                        ));
                    }
                }
                None => println!("\n{}", merged),
            }
            return Ok(());
        }

        if !(self.markdown_only || self.dry_run) {
            return Ok(());
        }

        match &self.output_dir {
            Some(dir) => {
                write_individual(dir, &successful)?;
                if !quiet {
                    output::success(&format!(
                        "Individual release notes saved to: {}",
                        output::path_style().apply_to(dir.display())
                    ));
                }
            }
            None => {
                for outcome in &successful {
                    if let Some(markdown) = &outcome.markdown {
                        println!("\n--- {} {} ---", outcome.project, outcome.tag);
                        println!("{}", markdown);
                        println!("--- End ---");
                    }
                }
            }
        }
        Ok(())
    }
}

/// Derive notes for one project and publish them unless only markdown is wanted
async fn process_project(settings: &BatchSettings, project: &BatchProject) -> ProjectOutcome {
    let gitlab = settings
        .gitlab
        .with_overrides(project.gitlab_host.as_deref(), project.gitlab_token.as_deref());
    let client = match build_client(&gitlab) {
        Ok(client) => client,
        Err(e) => return ProjectOutcome::error(project, &e),
    };

    info!(project = %project.project, tag = %project.tag, "processing project");
    let events = reporter(Some(project.display_name()), settings.quiet);
    let notes = match pipeline(&client, settings.options, events)
        .derive_release_notes(
            &project.project,
            &project.tag,
            &project.ref_name,
            project.since.as_deref(),
        )
        .await
    {
        Ok(notes) => notes,
        Err(e) => {
            warn!(project = %project.project, error = %e, "release notes failed");
            return ProjectOutcome::new(project, ProjectStatus::Error, e.to_string());
        }
    };

    if notes.is_empty() {
        return ProjectOutcome::new(project, ProjectStatus::Empty, "No release notes generated");
    }

    let categorized = parse_release_notes(&notes.markdown, Some(project.display_name()));

    if settings.markdown_only || settings.merge_markdown {
        return ProjectOutcome::new(project, ProjectStatus::Success, "Release notes generated")
            .with_notes(Some(notes.markdown), categorized);
    }

    if settings.dry_run {
        let target = if settings.tag_only { "tag" } else { "release" };
        return ProjectOutcome::new(
            project,
            ProjectStatus::DryRun,
            format!("Would create/update {} for tag {}", target, project.tag),
        )
        .with_notes(Some(notes.markdown), categorized);
    }

    let forge: &dyn ForgePublisher = client.as_ref();
    if !notes.tag_exists {
        let message = settings.release.tag_message_for(&project.tag);
        if let Err(e) = forge
            .create_tag(&project.project, &project.tag, &project.ref_name, &message)
            .await
        {
            return ProjectOutcome::new(
                project,
                ProjectStatus::Error,
                format!("Failed to create tag {}: {}", project.tag, e),
            );
        }
    }

    if settings.tag_only {
        return ProjectOutcome::new(
            project,
            ProjectStatus::Success,
            format!("Created tag {}", project.tag),
        )
        .with_notes(None, categorized);
    }

    if let Err(e) = forge
        .upsert_release(&project.project, &project.tag, &notes.markdown)
        .await
    {
        return ProjectOutcome::new(
            project,
            ProjectStatus::Error,
            format!("Failed to create release for tag {}: {}", project.tag, e),
        );
    }

    ProjectOutcome::new(
        project,
        ProjectStatus::Success,
        format!("Created release for tag {}", project.tag),
    )
    .with_notes(None, categorized)
}

fn print_progress(outcome: &ProjectOutcome) {
    let line = format!("{}: {}", outcome.project, outcome.message);
    match outcome.status {
        ProjectStatus::Success => output::success(&line),
        ProjectStatus::Error => output::error(&line),
        ProjectStatus::Empty => output::skipped(&line),
        ProjectStatus::DryRun => output::pending(&line),
    }
}

/// File name of merged notes for a product
pub fn merged_file_name(product_name: &str) -> String {
    format!("{}_Release_Notes.md", product_name.replace(' ', "_"))
}

fn write_merged(dir: &Path, product_name: &str, merged: &str) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    let path = dir.join(merged_file_name(product_name));
    std::fs::write(&path, merged)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

fn write_individual(dir: &Path, outcomes: &[&ProjectOutcome]) -> anyhow::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    let mut written = Vec::new();
    for outcome in outcomes {
        let Some(markdown) = &outcome.markdown else {
            continue;
        };
        let path = dir.join(format!("{}_{}.md", outcome.file_stem, outcome.tag));
        std::fs::write(&path, release_document(&outcome.tag, markdown))
            .with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn project(path: &str, tag: &str) -> BatchProject {
        BatchProject {
            project: path.to_string(),
            ref_name: "main".to_string(),
            tag: tag.to_string(),
            since: None,
            gitlab_host: None,
            gitlab_token: None,
        }
    }

    fn generated(path: &str, tag: &str, markdown: &str) -> ProjectOutcome {
        let p = project(path, tag);
        let notes = parse_release_notes(markdown, Some(p.display_name()));
        ProjectOutcome::new(&p, ProjectStatus::Success, "Release notes generated")
            .with_notes(Some(markdown.to_string()), notes)
    }

    #[test]
    fn test_summary_counts() {
        let outcomes = vec![
            generated("g/api", "v1", "Other:\n- x\n"),
            ProjectOutcome::new(&project("g/web", "v2"), ProjectStatus::DryRun, "would"),
            ProjectOutcome::new(&project("g/cli", "v3"), ProjectStatus::Empty, "none"),
            ProjectOutcome::new(&project("g/db", "v4"), ProjectStatus::Error, "boom"),
        ];

        assert_eq!(
            BatchSummary::from_outcomes(&outcomes),
            BatchSummary {
                succeeded: 2,
                failed: 1,
                empty: 1,
            }
        );
    }

    #[test]
    fn test_merged_file_name() {
        assert_eq!(merged_file_name("My Product"), "My_Product_Release_Notes.md");
        assert_eq!(merged_file_name("Release-v1.0"), "Release-v1.0_Release_Notes.md");
    }

    #[test]
    fn test_write_individual_files() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("notes");
        let api = generated("group/api", "v1.2", "**Bug Fix:**\n- crash\n");
        let published = ProjectOutcome::new(&project("group/web", "v2"), ProjectStatus::Success, "done");

        let written = write_individual(&dir, &[&api, &published]).unwrap();

        assert_eq!(written, vec![dir.join("group_api_v1.2.md")]);
        let content = std::fs::read_to_string(&written[0]).unwrap();
        assert_eq!(content, "# Release v1.2\n\n**Bug Fix:**\n- crash\n");
    }

    #[test]
    fn test_write_merged_file() {
        let temp = TempDir::new().unwrap();
        let api = generated("group/api", "v1", "**Bug Fix:**\n- crash\n");
        let web = generated("group/web", "v1", "_New Features:_\n- dark mode\n");
        let merged = merge_categorized_notes(
            [api, web].into_iter().filter_map(|o| o.notes),
            Some("Suite"),
        );

        let path = write_merged(temp.path(), "Suite", &merged).unwrap();
        assert_eq!(path, temp.path().join("Suite_Release_Notes.md"));

        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.starts_with("# Suite Release Notes\n\n**Bug Fixes:**\n- **api**: crash\n"));
        assert!(content.contains("_New Features:_\n- **web**: dark mode\n"));
    }
}
