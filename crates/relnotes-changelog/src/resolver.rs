//! Commit to merge request resolution

use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use relnotes_gitlab::{Commit, Forge, MergeRequest};
use tokio::sync::Semaphore;
use tracing::{debug, instrument};

use crate::reporter::{PipelineEvent, PipelineReporter};

/// Trailer the forge appends to merge commit messages
static TRAILER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\n\nSee merge request .+!(\d+)\n?\z").expect("Invalid regex")
});

/// Extract the merge request iid from a merge commit message
pub fn merge_request_iid(message: &str) -> Option<u64> {
    let caps = TRAILER_REGEX.captures(message)?;
    caps.get(1)?
        .as_str()
        .parse()
        .ok()
        .filter(|iid| *iid > 0)
}

/// Collect merge request iids referenced by commits, in commit order
pub fn candidate_iids(commits: &[Commit], dedup: bool, reporter: &dyn PipelineReporter) -> Vec<u64> {
    let mut seen = HashSet::new();
    let mut iids = Vec::new();

    for commit in commits {
        match merge_request_iid(&commit.message) {
            Some(iid) => {
                if !dedup || seen.insert(iid) {
                    iids.push(iid);
                }
            }
            None => reporter.report(&PipelineEvent::CommitWithoutMergeRequest {
                commit_id: commit.id.clone(),
            }),
        }
    }

    iids
}

/// Fetch merge requests concurrently with at most `workers` requests in flight
///
/// A failed or missing fetch is reported and left out; it never cancels the
/// other fetches. Results keep the order of `iids`.
#[instrument(skip(forge, iids, reporter), fields(count = iids.len()))]
pub async fn fetch_merge_requests(
    forge: Arc<dyn Forge>,
    project: &str,
    iids: &[u64],
    workers: usize,
    reporter: Arc<dyn PipelineReporter>,
) -> Vec<MergeRequest> {
    if iids.is_empty() {
        return Vec::new();
    }

    let pool = workers.max(1).min(iids.len());
    debug!(pool, "fetching merge requests");
    let semaphore = Arc::new(Semaphore::new(pool));
    let mut handles = Vec::with_capacity(iids.len());

    for &iid in iids {
        let semaphore = semaphore.clone();
        let forge = forge.clone();
        let project = project.to_string();

        let handle = tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await;
            forge.get_merge_request(&project, iid).await
        });
        handles.push((iid, handle));
    }

    let mut mrs = Vec::with_capacity(handles.len());
    for (iid, handle) in handles {
        match handle.await {
            Ok(Ok(Some(mr))) => mrs.push(mr),
            Ok(Ok(None)) => reporter.report(&PipelineEvent::MergeRequestMissing { iid }),
            Ok(Err(e)) => reporter.report(&PipelineEvent::MergeRequestFailed {
                iid,
                error: e.to_string(),
            }),
            Err(e) => reporter.report(&PipelineEvent::MergeRequestFailed {
                iid,
                error: format!("Task panicked: {}", e),
            }),
        }
    }

    mrs
}
