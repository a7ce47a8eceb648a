//! Release note pipeline

use std::sync::Arc;

use relnotes_core::PipelineError;
use relnotes_gitlab::{Commit, Forge, MergeRequest};
use tracing::{debug, info, instrument};

use crate::filter::is_excluded;
use crate::formatter::{note_line, MarkdownFormatter, NotesFormatter};
use crate::parser::{ConventionalParser, NoteParser};
use crate::range::resolve_range;
use crate::reporter::{PipelineEvent, PipelineReporter, TracingReporter};
use crate::resolver::{candidate_iids, fetch_merge_requests};
use crate::types::{ReleaseNoteItem, ReleaseNotes};

/// Default number of concurrent merge request fetches
pub const DEFAULT_WORKERS: usize = 4;

/// Pipeline tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Upper bound on concurrent merge request fetches
    pub workers: usize,
    /// Fetch each referenced merge request once
    pub dedup_merge_requests: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            dedup_merge_requests: true,
        }
    }
}

/// Derives release notes for a tag from forge history
pub struct ReleaseNotesPipeline {
    forge: Arc<dyn Forge>,
    parser: Box<dyn NoteParser>,
    formatter: Box<dyn NotesFormatter>,
    reporter: Arc<dyn PipelineReporter>,
    options: PipelineOptions,
}

impl ReleaseNotesPipeline {
    /// Create a pipeline with the conventional parser and markdown formatter
    pub fn new(forge: Arc<dyn Forge>) -> Self {
        Self {
            forge,
            parser: Box::new(ConventionalParser::new()),
            formatter: Box::new(MarkdownFormatter::new()),
            reporter: Arc::new(TracingReporter),
            options: PipelineOptions::default(),
        }
    }

    /// Send pipeline events to `reporter`
    pub fn with_reporter(mut self, reporter: Arc<dyn PipelineReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Set pipeline options
    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    /// Derive release notes for `tag` from commits on `ref_name`
    ///
    /// Only listing tags or commits can fail the run. Merge requests that
    /// cannot be fetched are reported and left out.
    #[instrument(skip(self))]
    pub async fn derive_release_notes(
        &self,
        project: &str,
        tag: &str,
        ref_name: &str,
        since: Option<&str>,
    ) -> Result<ReleaseNotes, PipelineError> {
        info!(project, tag, ref_name, "deriving release notes");

        let tags = self.forge.list_tags(project).await?;
        let resolved = resolve_range(
            self.forge.as_ref(),
            project,
            &tags,
            tag,
            since,
            self.reporter.as_ref(),
        )
        .await?;

        let mut commits = self
            .forge
            .list_commits(project, ref_name, resolved.range.since, resolved.range.until)
            .await?;
        self.reporter
            .report(&PipelineEvent::CommitsListed { count: commits.len() });

        if commits.is_empty() {
            return Ok(ReleaseNotes {
                tag_exists: resolved.tag_exists,
                markdown: String::new(),
            });
        }

        // Oldest commit in the window belongs to the previous release
        if resolved.range.since.is_some() {
            if let Some(index) = boundary_index(&commits) {
                let boundary = commits.remove(index);
                self.reporter.report(&PipelineEvent::BoundaryCommitDropped {
                    commit_id: boundary.id,
                });
            }
        }

        let iids = candidate_iids(
            &commits,
            self.options.dedup_merge_requests,
            self.reporter.as_ref(),
        );
        debug!(candidates = iids.len(), "merge requests referenced");

        let mrs = fetch_merge_requests(
            self.forge.clone(),
            project,
            &iids,
            self.options.workers,
            self.reporter.clone(),
        )
        .await;

        Ok(ReleaseNotes {
            tag_exists: resolved.tag_exists,
            markdown: self.render(&mrs),
        })
    }

    /// Render notes for merge requests that are not opted out
    pub fn render(&self, mrs: &[MergeRequest]) -> String {
        let items: Vec<ReleaseNoteItem> = mrs
            .iter()
            .filter(|mr| {
                let excluded = is_excluded(mr);
                if excluded {
                    self.reporter
                        .report(&PipelineEvent::MergeRequestExcluded { iid: mr.iid });
                }
                !excluded
            })
            .map(|mr| self.parser.parse(&note_line(mr)))
            .collect();

        self.reporter.report(&PipelineEvent::Rendered {
            item_count: items.len(),
        });
        self.formatter.format(&items)
    }
}

/// Position of the oldest commit; ties go to the one listed last, as the
/// forge lists newest first
fn boundary_index(commits: &[Commit]) -> Option<usize> {
    commits
        .iter()
        .enumerate()
        .rev()
        .min_by_key(|(_, commit)| commit.created_at)
        .map(|(index, _)| index)
}

/// Render release notes for merge requests with the default parser and formatter
pub fn generate_release_notes(mrs: &[MergeRequest]) -> String {
    let items: Vec<ReleaseNoteItem> = mrs
        .iter()
        .filter(|mr| !is_excluded(mr))
        .map(|mr| ConventionalParser::new().parse(&note_line(mr)))
        .collect();
    MarkdownFormatter::new().format(&items)
}
