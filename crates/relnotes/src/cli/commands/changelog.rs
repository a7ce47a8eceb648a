//! Changelog command

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tracing::info;

use relnotes_gitlab::ForgePublisher;

use crate::cli::context::{pipeline, reporter, CommandContext};
use crate::cli::{output, Cli};

/// Open a merge request adding release notes to the changelog
#[derive(Debug, Args)]
pub struct ChangelogCommand {
    /// GitLab project path or ID
    #[arg(short, long)]
    pub project: Option<String>,

    /// Branch the changelog update targets
    #[arg(short, long = "ref")]
    pub ref_name: Option<String>,

    /// Release tag name
    #[arg(short, long)]
    pub tag: String,

    /// Start of the range as a tag, branch or commit (overrides auto-detection)
    #[arg(short, long)]
    pub since: Option<String>,

    /// Changelog file path in the repository
    #[arg(short, long)]
    pub file: Option<String>,

    /// Show what would be done without making changes
    #[arg(long)]
    pub dry_run: bool,

    /// Only generate markdown, do not update the changelog or open a merge request
    #[arg(long)]
    pub markdown_only: bool,

    /// Write markdown to a file instead of stdout (with --markdown-only)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Where and how the changelog update is published
struct ChangelogUpdate<'a> {
    project: &'a str,
    ref_name: &'a str,
    tag: &'a str,
    file: &'a str,
    branch: String,
    entry: String,
}

impl ChangelogCommand {
    /// Execute the changelog command
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
        let file = self
            .file
            .clone()
            .unwrap_or_else(|| ctx.config.changelog.file.to_string_lossy().into_owned());
        info!(
            project = %project,
            tag = %self.tag,
            ref_name = %ref_name,
            file = %file,
            dry_run = self.dry_run,
            markdown_only = self.markdown_only,
            "executing changelog command"
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
            return Ok(());
        }

        let entry = changelog_entry(&self.tag, &notes.markdown);

        if self.markdown_only {
            match &self.output {
                Some(path) => {
                    std::fs::write(path, &entry)
                        .with_context(|| format!("Error writing to file {}", path.display()))?;
                    if !cli.quiet {
                        output::success(&format!(
                            "Changelog entry saved to: {}",
                            output::path_style().apply_to(path.display())
                        ));
                    }
                }
                None => println!("{}", entry),
            }
            return Ok(());
        }

        let update = ChangelogUpdate {
            project: &project,
            ref_name: &ref_name,
            tag: &self.tag,
            file: &file,
            branch: format!("{}{}", ctx.config.changelog.branch_prefix, self.tag),
            entry,
        };
        update_changelog(client.as_ref(), &update, self.dry_run, cli.quiet).await
    }
}

/// Changelog section for a release
pub fn changelog_entry(tag: &str, notes: &str) -> String {
    format!("## {}\n\n{}\n\n", tag, notes)
}

/// Insert an entry below a leading `#` title line, or at the top
pub fn insert_entry(current: &str, entry: &str) -> String {
    let (first, rest) = current.split_once('\n').unwrap_or((current, ""));
    if first.starts_with('#') {
        format!("{}\n\n{}{}", first, entry, rest)
    } else {
        format!("{}{}", entry, current)
    }
}

async fn update_changelog(
    forge: &dyn ForgePublisher,
    update: &ChangelogUpdate<'_>,
    dry_run: bool,
    quiet: bool,
) -> anyhow::Result<()> {
    let current = forge
        .get_file(update.project, update.file, update.ref_name)
        .await
        .with_context(|| format!("Error reading {}", update.file))?
        .unwrap_or_default();
    let content = insert_entry(&current, &update.entry);

    if !quiet {
        output::framed(&format!("Changelog entry for {}:", update.tag), &update.entry);
    }

    if dry_run {
        if !quiet {
            output::warning("Dry run - no changes made");
        }
        return Ok(());
    }

    info!(branch = %update.branch, "creating branch");
    forge
        .create_branch(update.project, &update.branch, update.ref_name)
        .await
        .with_context(|| format!("Error creating branch: {}", update.branch))?;

    let title = format!("Update {} for {}", update.file, update.tag);
    info!(file = update.file, "updating changelog file");
    forge
        .update_file(update.project, update.file, &content, &title, &update.branch)
        .await
        .with_context(|| format!("Error updating {}", update.file))?;

    info!("creating merge request for changelog update");
    let mr = forge
        .create_merge_request(
            update.project,
            &update.branch,
            update.ref_name,
            &title,
            &format!("Automated changelog update for release {}", update.tag),
        )
        .await
        .with_context(|| {
            format!(
                "Error creating merge request, but changelog was updated in branch: {}",
                update.branch
            )
        })?;

    if !quiet {
        output::success(&format!("Created merge request: {}", mr.web_url));
        output::success(&format!(
            "Updated changelog for tag {}",
            output::tag_style().apply_to(update.tag)
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_changelog_entry() {
        assert_eq!(
            changelog_entry("v2.0", "Other:\n- x\n"),
            "## v2.0\n\nOther:\n- x\n\n\n"
        );
    }

    #[test]
    fn test_insert_after_title() {
        let current = "# Changelog\n\n## v1.0\n\n- first\n";
        let updated = insert_entry(current, "## v1.1\n\n- second\n\n");
        assert_eq!(
            updated,
            "# Changelog\n\n## v1.1\n\n- second\n\n\n## v1.0\n\n- first\n"
        );
    }

    #[test]
    fn test_insert_at_top() {
        assert_eq!(insert_entry("", "## v1\n\n"), "## v1\n\n");
        assert_eq!(
            insert_entry("Old notes\n", "## v1\n\n"),
            "## v1\n\nOld notes\n"
        );
        assert_eq!(insert_entry("# Changelog", "## v1\n\n"), "# Changelog\n\n## v1\n\n");
    }
}
