//! Forge collaborator traits

use chrono::{DateTime, Utc};

use crate::types::{Commit, MergeRequest, Tag};
use crate::Result;

/// Read access to a forge, as needed by the release note pipeline
///
/// Implementations must be shareable across tasks: merge requests are
/// fetched concurrently from the same client.
#[async_trait::async_trait]
pub trait Forge: Send + Sync {
    /// List all tags in the order the forge returns them (most recent first)
    async fn list_tags(&self, project: &str) -> Result<Vec<Tag>>;

    /// List commits reachable from `ref_name`, optionally bounded in time
    async fn list_commits(
        &self,
        project: &str,
        ref_name: &str,
        since: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
    ) -> Result<Vec<Commit>>;

    /// Look up a single commit by SHA, branch or tag; `None` when absent
    async fn get_commit(&self, project: &str, id: &str) -> Result<Option<Commit>>;

    /// Fetch a merge request by iid; `None` when absent
    async fn get_merge_request(&self, project: &str, iid: u64) -> Result<Option<MergeRequest>>;
}

/// Write access used to publish rendered notes
#[async_trait::async_trait]
pub trait ForgePublisher: Forge {
    /// Look up a single tag; `None` when absent
    async fn get_tag(&self, project: &str, name: &str) -> Result<Option<Tag>>;

    /// Create an annotated tag on `ref_name`
    async fn create_tag(&self, project: &str, name: &str, ref_name: &str, message: &str)
        -> Result<Tag>;

    /// Create the release for a tag, or replace its description if it exists
    async fn upsert_release(&self, project: &str, tag: &str, description: &str) -> Result<()>;

    /// Read a repository file; `None` when the file does not exist
    async fn get_file(&self, project: &str, path: &str, ref_name: &str) -> Result<Option<String>>;

    /// Update a repository file on a branch, creating it if missing
    async fn update_file(
        &self,
        project: &str,
        path: &str,
        content: &str,
        commit_message: &str,
        branch: &str,
    ) -> Result<()>;

    /// Create a branch from `ref_name`
    async fn create_branch(&self, project: &str, branch: &str, ref_name: &str) -> Result<()>;

    /// Open a merge request
    async fn create_merge_request(
        &self,
        project: &str,
        source_branch: &str,
        target_branch: &str,
        title: &str,
        description: &str,
    ) -> Result<MergeRequest>;
}
