//! Release command

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tracing::info;

use relnotes_gitlab::ForgePublisher;

use crate::cli::context::{pipeline, reporter, CommandContext};
use crate::cli::{output, Cli};

/// Create a tag and release with generated release notes
#[derive(Debug, Args)]
pub struct ReleaseCommand {
    /// GitLab project path or ID
    #[arg(short, long)]
    pub project: Option<String>,

    /// Branch or commit the release is cut from
    #[arg(short, long = "ref")]
    pub ref_name: Option<String>,

    /// Release tag name
    #[arg(short, long)]
    pub tag: String,

    /// Start of the range as a tag, branch or commit (overrides auto-detection)
    #[arg(short, long)]
    pub since: Option<String>,

    /// Show what would be done without making changes
    #[arg(long)]
    pub dry_run: bool,

    /// Only generate markdown, do not create tags or releases
    #[arg(long, conflicts_with = "tag_only")]
    pub markdown_only: bool,

    /// Only create the tag, do not upload release notes
    #[arg(long)]
    pub tag_only: bool,

    /// Write markdown to a file instead of stdout (with --markdown-only)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl ReleaseCommand {
    /// Execute the release command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(self.run(cli))
    }

    async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let ctx = CommandContext::load(cli)?;
        ctx.note_defaults(cli);

        let project = ctx.project(self.project.as_deref())?;
        let ref_name = ctx.ref_name(self.ref_name.as_deref())?;
        let since = ctx.since(self.since.as_deref());
        info!(
            project = %project,
            tag = %self.tag,
            ref_name = %ref_name,
            since = ?since,
            dry_run = self.dry_run,
            markdown_only = self.markdown_only,
            tag_only = self.tag_only,
            "executing release command"
        );

        let client = ctx.client()?;
        let notes = pipeline(&client, ctx.pipeline_options(), reporter(None, cli.quiet))
            .derive_release_notes(&project, &self.tag, &ref_name, since.as_deref())
            .await
            .context("Error generating release notes")?;

        if notes.is_empty() {
            if !cli.quiet {
                output::info("No release notes generated (no merge requests found or all excluded)");
            }
            if !self.tag_only {
                return Ok(());
            }
        }

        if self.markdown_only {
            let document = release_document(&self.tag, &notes.markdown);
            match &self.output {
                Some(path) => {
                    std::fs::write(path, &document)
                        .with_context(|| format!("Error writing to file {}", path.display()))?;
                    if !cli.quiet {
                        output::success(&format!(
                            "Release notes saved to: {}",
                            output::path_style().apply_to(path.display())
                        ));
                    }
                }
                None => println!("{}", document),
            }
            return Ok(());
        }

        if !cli.quiet {
            output::framed(
                &format!("Generated release notes for {}:", self.tag),
                &notes.markdown,
            );
        }

        if self.dry_run {
            if !cli.quiet {
                output::warning("Dry run - no changes made");
            }
            return Ok(());
        }

        publish(
            client.as_ref(),
            &project,
            &self.tag,
            &ref_name,
            &ctx.config.release.tag_message_for(&self.tag),
            !notes.tag_exists,
            (!self.tag_only).then_some(notes.markdown.as_str()),
            cli.quiet,
        )
        .await
    }
}

/// Markdown document written for `--markdown-only`
pub fn release_document(tag: &str, notes: &str) -> String {
    format!("# Release {}\n\n{}", tag, notes)
}

/// Create the tag when missing, then upsert the release body when there is one
#[allow(clippy::too_many_arguments)]
async fn publish(
    forge: &dyn ForgePublisher,
    project: &str,
    tag: &str,
    ref_name: &str,
    tag_message: &str,
    create_tag: bool,
    release_notes: Option<&str>,
    quiet: bool,
) -> anyhow::Result<()> {
    if create_tag {
        info!(project, tag, "creating tag");
        forge
            .create_tag(project, tag, ref_name, tag_message)
            .await
            .with_context(|| format!("Error creating tag: {}", tag))?;
        if !quiet {
            output::success(&format!(
                "Created tag {}",
                output::tag_style().apply_to(tag)
            ));
        }
    }

    let Some(notes) = release_notes else {
        if !quiet {
            output::info(&format!(
                "Tag-only mode: release notes for {} were not uploaded",
                tag
            ));
        }
        return Ok(());
    };

    if notes.trim().is_empty() {
        if !quiet {
            output::info(&format!("No release notes to upload for tag: {}", tag));
        }
        return Ok(());
    }

    info!(project, tag, "upserting release");
    forge
        .upsert_release(project, tag, notes)
        .await
        .with_context(|| format!("Error creating release for tag: {}", tag))?;
    if !quiet {
        output::success(&format!(
            "Created release for tag {}",
            output::tag_style().apply_to(tag)
        ));
    }
    Ok(())
}
