//! Forge record types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A commit as returned by the forge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    /// Commit SHA (full)
    pub id: String,
    /// Short SHA
    pub short_id: String,
    /// First line of the message
    pub title: String,
    /// Full commit message
    pub message: String,
    /// Author name
    pub author_name: String,
    /// Author email
    pub author_email: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Commit {
    /// Create a new Commit; the title is the first message line
    pub fn new(
        id: impl Into<String>,
        message: impl Into<String>,
        author_name: impl Into<String>,
        author_email: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let id = id.into();
        let message = message.into();
        let short_id = id.chars().take(8).collect();
        let title = message.lines().next().unwrap_or_default().to_string();

        Self {
            id,
            short_id,
            title,
            message,
            author_name: author_name.into(),
            author_email: author_email.into(),
            created_at,
        }
    }
}

/// A tag and the commit it points to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    /// Tag name, unique within the project
    pub name: String,
    /// Annotation message
    pub message: Option<String>,
    /// SHA of the tagged commit
    pub commit_id: String,
    /// Creation time of the tagged commit
    pub commit_created_at: DateTime<Utc>,
    /// Description of the release attached to the tag
    pub release_description: Option<String>,
}

impl Tag {
    /// Create a new Tag
    pub fn new(
        name: impl Into<String>,
        commit_id: impl Into<String>,
        commit_created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            name: name.into(),
            message: None,
            commit_id: commit_id.into(),
            commit_created_at,
            release_description: None,
        }
    }

    /// Set the tag message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Set the release description
    pub fn with_release(mut self, description: impl Into<String>) -> Self {
        self.release_description = Some(description.into());
        self
    }

    /// Whether a release is attached to this tag
    pub fn has_release(&self) -> bool {
        self.release_description.is_some()
    }
}

/// Merge request author
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Author {
    /// Login name
    pub username: String,
    /// Display name
    pub name: String,
}

/// Merge request lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeRequestState {
    Opened,
    Closed,
    Merged,
    Locked,
    #[default]
    #[serde(other)]
    Unknown,
}

/// A merge request snapshot fetched by iid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeRequest {
    /// Internal id, unique per project
    pub iid: u64,
    /// Title
    pub title: String,
    /// Description (empty when unset)
    pub description: String,
    /// Browser URL
    pub web_url: String,
    /// Labels
    pub labels: Vec<String>,
    /// Author
    pub author: Author,
    /// Lifecycle state
    pub state: MergeRequestState,
    /// Merge time
    pub merged_at: Option<DateTime<Utc>>,
    /// Last update time
    pub updated_at: Option<DateTime<Utc>>,
}

impl MergeRequest {
    /// Create a merged request with the given title and author username
    pub fn new(iid: u64, title: impl Into<String>, username: impl Into<String>) -> Self {
        let username = username.into();
        Self {
            iid,
            title: title.into(),
            description: String::new(),
            web_url: String::new(),
            labels: Vec::new(),
            author: Author {
                name: username.clone(),
                username,
            },
            state: MergeRequestState::Merged,
            merged_at: None,
            updated_at: None,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the web URL
    pub fn with_web_url(mut self, url: impl Into<String>) -> Self {
        self.web_url = url.into();
        self
    }

    /// Add a label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    /// Check whether the request carries a label
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_title_is_first_line() {
        let commit = Commit::new(
            "0123456789abcdef",
            "Merge branch 'feat' into 'main'\n\nSee merge request group/app!7",
            "Author",
            "author@example.com",
            Utc::now(),
        );
        assert_eq!(commit.short_id, "01234567");
        assert_eq!(commit.title, "Merge branch 'feat' into 'main'");
    }

    #[test]
    fn test_merge_request_labels() {
        let mr = MergeRequest::new(3, "fix: crash", "dev")
            .with_label("bug")
            .with_label("release-note-none");
        assert!(mr.has_label("release-note-none"));
        assert!(!mr.has_label("release-note"));
    }

    #[test]
    fn test_state_deserializes_unknown() {
        let state: MergeRequestState = serde_json::from_str("\"merged\"").unwrap();
        assert_eq!(state, MergeRequestState::Merged);
        let state: MergeRequestState = serde_json::from_str("\"archived\"").unwrap();
        assert_eq!(state, MergeRequestState::Unknown);
    }
}
