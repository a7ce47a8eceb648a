//! In-memory forge for pipeline tests

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use relnotes_core::ForgeError;
use relnotes_gitlab::{Commit, Forge, MergeRequest, Result, Tag};

/// Commit listing query as received by the forge
#[derive(Debug, Clone, PartialEq)]
pub struct CommitQuery {
    pub ref_name: String,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

/// Forge backed by in-memory records
///
/// `list_commits` returns stored commits in insertion order, keeping those
/// whose timestamp falls inside the requested bounds (both inclusive).
#[derive(Default)]
pub struct MemoryForge {
    tags: Vec<Tag>,
    commits: Vec<Commit>,
    merge_requests: HashMap<u64, MergeRequest>,
    failing_merge_requests: HashSet<u64>,
    fail_tags: bool,
    fail_commits: bool,
    queries: Mutex<Vec<CommitQuery>>,
}

impl MemoryForge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }

    pub fn with_commit(mut self, commit: Commit) -> Self {
        self.commits.push(commit);
        self
    }

    pub fn with_merge_request(mut self, mr: MergeRequest) -> Self {
        self.merge_requests.insert(mr.iid, mr);
        self
    }

    pub fn with_failing_merge_request(mut self, iid: u64) -> Self {
        self.failing_merge_requests.insert(iid);
        self
    }

    pub fn failing_tags(mut self) -> Self {
        self.fail_tags = true;
        self
    }

    pub fn failing_commits(mut self) -> Self {
        self.fail_commits = true;
        self
    }

    /// Commit listing queries received so far
    pub fn queries(&self) -> Vec<CommitQuery> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }
}

fn unavailable() -> ForgeError {
    ForgeError::ApiError {
        status: 503,
        message: "Service Unavailable".to_string(),
    }
}

#[async_trait::async_trait]
impl Forge for MemoryForge {
    async fn list_tags(&self, _project: &str) -> Result<Vec<Tag>> {
        if self.fail_tags {
            return Err(unavailable());
        }
        Ok(self.tags.clone())
    }

    async fn list_commits(
        &self,
        _project: &str,
        ref_name: &str,
        since: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
    ) -> Result<Vec<Commit>> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(CommitQuery {
                ref_name: ref_name.to_string(),
                since,
                until,
            });
        }
        if self.fail_commits {
            return Err(unavailable());
        }

        // Newest first, like the GitLab commits endpoint
        let mut commits: Vec<Commit> = self
            .commits
            .iter()
            .filter(|c| since.map_or(true, |s| c.created_at >= s))
            .filter(|c| until.map_or(true, |u| c.created_at <= u))
            .cloned()
            .collect();
        commits.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(commits)
    }

    async fn get_commit(&self, _project: &str, id: &str) -> Result<Option<Commit>> {
        Ok(self.commits.iter().find(|c| c.id == id).cloned())
    }

    async fn get_merge_request(&self, _project: &str, iid: u64) -> Result<Option<MergeRequest>> {
        if self.failing_merge_requests.contains(&iid) {
            return Err(unavailable());
        }
        Ok(self.merge_requests.get(&iid).cloned())
    }
}
