//! Commit range resolution
//!
//! Tags are taken in the order the forge returns them (newest first) and are
//! never re-sorted: "previous tag" means the next one in that list.

use chrono::{DateTime, SecondsFormat, Utc};
use relnotes_core::PipelineError;
use relnotes_gitlab::{Forge, Tag};
use tracing::instrument;

use crate::reporter::{PipelineEvent, PipelineReporter};
use crate::types::CommitRange;

/// Result of range resolution
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolvedRange {
    /// Whether the target tag exists
    pub tag_exists: bool,
    /// Commit window to scan
    pub range: CommitRange,
}

/// Decide the commit window for `target`
///
/// An explicit `since` is tried as a tag name, then as a commit reference.
/// When it is absent or resolves to neither, the window starts at the tag
/// following `target` in `tags`; if `target` does not exist yet, it starts at
/// the first (latest) tag.
#[instrument(skip(forge, tags, reporter), fields(tag_count = tags.len()))]
pub async fn resolve_range(
    forge: &dyn Forge,
    project: &str,
    tags: &[Tag],
    target: &str,
    since: Option<&str>,
    reporter: &dyn PipelineReporter,
) -> Result<ResolvedRange, PipelineError> {
    if tags.is_empty() {
        return Err(PipelineError::NoTags(project.to_string()));
    }

    let mut resolved = ResolvedRange::default();

    if let Some(reference) = since.filter(|s| !s.is_empty()) {
        if let Some(tag) = tags.iter().find(|t| t.name == target) {
            resolved.tag_exists = true;
            resolved.range.until = Some(tag.commit_created_at);
        }
        resolved.range.since = resolve_since(forge, project, tags, reference, reporter).await;
    }

    if resolved.range.since.is_none() {
        let (tag_exists, range) = auto_detect(tags, target);
        resolved.tag_exists = tag_exists;
        resolved.range = range;
    }

    reporter.report(&PipelineEvent::RangeResolved {
        tag: target.to_string(),
        tag_exists: resolved.tag_exists,
        since: resolved.range.since.map(timestamp),
        until: resolved.range.until.map(timestamp),
    });

    Ok(resolved)
}

async fn resolve_since(
    forge: &dyn Forge,
    project: &str,
    tags: &[Tag],
    reference: &str,
    reporter: &dyn PipelineReporter,
) -> Option<DateTime<Utc>> {
    if let Some(tag) = tags.iter().find(|t| t.name == reference) {
        reporter.report(&PipelineEvent::SinceResolved {
            reference: reference.to_string(),
            via_tag: true,
        });
        return Some(tag.commit_created_at);
    }

    let error = match forge.get_commit(project, reference).await {
        Ok(Some(commit)) => {
            reporter.report(&PipelineEvent::SinceResolved {
                reference: reference.to_string(),
                via_tag: false,
            });
            return Some(commit.created_at);
        }
        Ok(None) => None,
        Err(e) => Some(e.to_string()),
    };

    reporter.report(&PipelineEvent::SinceFallback {
        reference: reference.to_string(),
        error,
    });
    None
}

/// Find the target and the tag that follows it
fn auto_detect(tags: &[Tag], target: &str) -> (bool, CommitRange) {
    match tags.iter().position(|t| t.name == target) {
        Some(index) => (
            true,
            CommitRange {
                since: tags.get(index + 1).map(|t| t.commit_created_at),
                until: Some(tags[index].commit_created_at),
            },
        ),
        None => (
            false,
            CommitRange {
                since: tags.first().map(|t| t.commit_created_at),
                until: None,
            },
        ),
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}
