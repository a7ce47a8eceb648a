//! GitLab REST v4 response shapes and their conversion to forge records

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::types::{Author, Commit, MergeRequest, MergeRequestState, Tag};

#[derive(Debug, Deserialize)]
pub(crate) struct ApiCommit {
    pub id: String,
    pub short_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub author_email: String,
    pub created_at: DateTime<Utc>,
}

impl From<ApiCommit> for Commit {
    fn from(c: ApiCommit) -> Self {
        Self {
            id: c.id,
            short_id: c.short_id,
            title: c.title,
            message: c.message,
            author_name: c.author_name,
            author_email: c.author_email,
            created_at: c.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiRelease {
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiTag {
    pub name: String,
    #[serde(default)]
    pub message: Option<String>,
    pub commit: ApiCommit,
    #[serde(default)]
    pub release: Option<ApiRelease>,
}

impl From<ApiTag> for Tag {
    fn from(t: ApiTag) -> Self {
        Self {
            name: t.name,
            message: t.message.filter(|m| !m.is_empty()),
            commit_id: t.commit.id,
            commit_created_at: t.commit.created_at,
            release_description: t.release.map(|r| r.description.unwrap_or_default()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiUser {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiMergeRequest {
    pub iid: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub web_url: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub author: Option<ApiUser>,
    #[serde(default)]
    pub state: MergeRequestState,
    #[serde(default)]
    pub merged_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<ApiMergeRequest> for MergeRequest {
    fn from(mr: ApiMergeRequest) -> Self {
        let author = mr.author.unwrap_or_default();
        Self {
            iid: mr.iid,
            title: mr.title,
            description: mr.description.unwrap_or_default(),
            web_url: mr.web_url,
            labels: mr.labels,
            author: Author {
                username: author.username,
                name: author.name,
            },
            state: mr.state,
            merged_at: mr.merged_at,
            updated_at: mr.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_tag_conversion() {
        let json = r#"{
            "name": "v1.1.0",
            "message": "",
            "target": "abc",
            "commit": {
                "id": "2695effb5807a22ff3d138d593fd856244e155e7",
                "short_id": "2695effb",
                "title": "Initial commit",
                "message": "Initial commit\n",
                "author_name": "John Smith",
                "author_email": "john@example.com",
                "created_at": "2024-02-01T10:00:00.000+02:00"
            },
            "release": {"tag_name": "v1.1.0", "description": "Notes"},
            "protected": false
        }"#;

        let tag: Tag = serde_json::from_str::<ApiTag>(json).unwrap().into();
        assert_eq!(tag.name, "v1.1.0");
        assert!(tag.message.is_none());
        assert_eq!(tag.commit_id, "2695effb5807a22ff3d138d593fd856244e155e7");
        assert_eq!(
            tag.commit_created_at,
            Utc.with_ymd_and_hms(2024, 2, 1, 8, 0, 0).unwrap()
        );
        assert_eq!(tag.release_description.as_deref(), Some("Notes"));
    }

    #[test]
    fn test_merge_request_conversion_with_nulls() {
        let json = r#"{
            "id": 1001,
            "iid": 11,
            "title": "fix: handle empty input",
            "description": null,
            "web_url": "https://gitlab.com/group/app/-/merge_requests/11",
            "labels": ["bug"],
            "author": {"id": 5, "username": "jdoe", "name": "Jane Doe"},
            "state": "merged",
            "merged_at": "2024-01-15T12:00:00Z",
            "updated_at": null
        }"#;

        let mr: MergeRequest = serde_json::from_str::<ApiMergeRequest>(json).unwrap().into();
        assert_eq!(mr.iid, 11);
        assert_eq!(mr.description, "");
        assert_eq!(mr.author.username, "jdoe");
        assert_eq!(mr.state, MergeRequestState::Merged);
        assert!(mr.merged_at.is_some());
        assert!(mr.updated_at.is_none());
    }
}
