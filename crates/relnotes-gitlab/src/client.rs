//! GitLab REST v4 client

use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use relnotes_core::config::GitLabConfig;
use relnotes_core::error::ForgeError;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::api::{ApiCommit, ApiMergeRequest, ApiTag};
use crate::traits::{Forge, ForgePublisher};
use crate::types::{Commit, MergeRequest, Tag};
use crate::Result;

const TOKEN_HEADER: &str = "PRIVATE-TOKEN";
const NEXT_PAGE_HEADER: &str = "x-next-page";
const PER_PAGE: &str = "100";

/// GitLab API client
///
/// Project identifiers may be numeric IDs or full paths (`group/project`);
/// both are percent-encoded into a single path segment.
#[derive(Debug, Clone)]
pub struct GitLabClient {
    http: Client,
    base: Url,
    token: String,
}

impl GitLabClient {
    /// Create a client from connection settings
    pub fn new(config: &GitLabConfig) -> Result<Self> {
        let token = config
            .token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .ok_or(ForgeError::MissingToken)?;

        let base = Url::parse(&config.host)
            .map_err(|e| ForgeError::InvalidUrl(format!("{}: {}", config.host, e)))?;
        if base.cannot_be_a_base() {
            return Err(ForgeError::InvalidUrl(config.host.clone()));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("relnotes/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(transport_error)?;

        debug!(host = %base, timeout_secs = config.timeout_secs, "created gitlab client");
        Ok(Self { http, base, token })
    }

    /// Host this client talks to
    pub fn host(&self) -> &Url {
        &self.base
    }

    /// Build `<host>/api/v4/projects/<project>/<segments...>`
    fn endpoint(&self, project: &str, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ForgeError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(["api", "v4", "projects", project])
            .extend(segments);
        Ok(url)
    }

    /// Send a request and turn non-success statuses into errors
    async fn execute(&self, request: RequestBuilder) -> Result<Response> {
        let response = request
            .header(TOKEN_HEADER, &self.token)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ForgeError::ApiError {
            status: status.as_u16(),
            message: api_message(status, &body),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self.execute(self.http.get(url)).await?;
        response.json().await.map_err(transport_error)
    }

    /// GET a single entity, mapping 404 to `None`
    async fn get_optional<T: DeserializeOwned>(&self, url: Url) -> Result<Option<T>> {
        match self.get_json(url).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// GET every page of a list endpoint
    async fn get_paginated<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut page: u32 = 1;

        loop {
            let mut page_url = url.clone();
            page_url
                .query_pairs_mut()
                .append_pair("per_page", PER_PAGE)
                .append_pair("page", &page.to_string());

            let response = self.execute(self.http.get(page_url)).await?;
            let next = next_page(&response);
            let batch: Vec<T> = response.json().await.map_err(transport_error)?;
            let fetched = batch.len();
            items.extend(batch);

            match next {
                Some(n) if fetched > 0 && n > page => page = n,
                _ => break,
            }
        }

        Ok(items)
    }
}

#[async_trait::async_trait]
impl Forge for GitLabClient {
    #[instrument(skip(self))]
    async fn list_tags(&self, project: &str) -> Result<Vec<Tag>> {
        let url = self.endpoint(project, &["repository", "tags"])?;
        let tags: Vec<ApiTag> = self.get_paginated(url).await?;
        debug!(count = tags.len(), "listed tags");
        Ok(tags.into_iter().map(Tag::from).collect())
    }

    #[instrument(skip(self))]
    async fn list_commits(
        &self,
        project: &str,
        ref_name: &str,
        since: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
    ) -> Result<Vec<Commit>> {
        let mut url = self.endpoint(project, &["repository", "commits"])?;
        {
            let mut query = url.query_pairs_mut();
            if !ref_name.is_empty() {
                query.append_pair("ref_name", ref_name);
            }
            if let Some(since) = since {
                query.append_pair("since", &since.to_rfc3339_opts(SecondsFormat::Secs, true));
            }
            if let Some(until) = until {
                query.append_pair("until", &until.to_rfc3339_opts(SecondsFormat::Secs, true));
            }
        }

        let commits: Vec<ApiCommit> = self.get_paginated(url).await?;
        debug!(count = commits.len(), "listed commits");
        Ok(commits.into_iter().map(Commit::from).collect())
    }

    #[instrument(skip(self))]
    async fn get_commit(&self, project: &str, id: &str) -> Result<Option<Commit>> {
        let url = self.endpoint(project, &["repository", "commits", id])?;
        let commit: Option<ApiCommit> = self.get_optional(url).await?;
        Ok(commit.map(Commit::from))
    }

    #[instrument(skip(self))]
    async fn get_merge_request(&self, project: &str, iid: u64) -> Result<Option<MergeRequest>> {
        let url = self.endpoint(project, &["merge_requests", &iid.to_string()])?;
        let mr: Option<ApiMergeRequest> = self.get_optional(url).await?;
        Ok(mr.map(MergeRequest::from))
    }
}

#[async_trait::async_trait]
impl ForgePublisher for GitLabClient {
    #[instrument(skip(self))]
    async fn get_tag(&self, project: &str, name: &str) -> Result<Option<Tag>> {
        let url = self.endpoint(project, &["repository", "tags", name])?;
        let tag: Option<ApiTag> = self.get_optional(url).await?;
        Ok(tag.map(Tag::from))
    }

    #[instrument(skip(self, message))]
    async fn create_tag(
        &self,
        project: &str,
        name: &str,
        ref_name: &str,
        message: &str,
    ) -> Result<Tag> {
        info!(project, tag = name, ref_name, "creating tag");
        let url = self.endpoint(project, &["repository", "tags"])?;
        let mut body = json!({ "tag_name": name, "ref": ref_name });
        if !message.is_empty() {
            body["message"] = json!(message);
        }

        let response = self.execute(self.http.post(url).json(&body)).await?;
        let tag: ApiTag = response.json().await.map_err(transport_error)?;
        Ok(tag.into())
    }

    #[instrument(skip(self, description), fields(description_len = description.len()))]
    async fn upsert_release(&self, project: &str, tag: &str, description: &str) -> Result<()> {
        let url = self.endpoint(project, &["releases"])?;
        let body = json!({ "tag_name": tag, "description": description });

        match self.execute(self.http.post(url).json(&body)).await {
            Ok(_) => {
                info!(project, tag, "created release");
                Ok(())
            }
            Err(ForgeError::ApiError { status: 409, .. }) => {
                debug!(project, tag, "release exists, updating description");
                let url = self.endpoint(project, &["releases", tag])?;
                let body = json!({ "description": description });
                self.execute(self.http.put(url).json(&body)).await?;
                info!(project, tag, "updated release");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self))]
    async fn get_file(&self, project: &str, path: &str, ref_name: &str) -> Result<Option<String>> {
        let mut url = self.endpoint(project, &["repository", "files", path, "raw"])?;
        url.query_pairs_mut().append_pair("ref", ref_name);

        match self.execute(self.http.get(url)).await {
            Ok(response) => Ok(Some(response.text().await.map_err(transport_error)?)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self, content, commit_message), fields(content_len = content.len()))]
    async fn update_file(
        &self,
        project: &str,
        path: &str,
        content: &str,
        commit_message: &str,
        branch: &str,
    ) -> Result<()> {
        let url = self.endpoint(project, &["repository", "files", path])?;
        let body = json!({
            "branch": branch,
            "content": content,
            "commit_message": commit_message,
        });

        match self.execute(self.http.put(url.clone()).json(&body)).await {
            Ok(_) => Ok(()),
            Err(ForgeError::ApiError { status: 400 | 404, .. }) => {
                debug!(path, branch, "file missing, creating it");
                self.execute(self.http.post(url).json(&body)).await?;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self))]
    async fn create_branch(&self, project: &str, branch: &str, ref_name: &str) -> Result<()> {
        info!(project, branch, ref_name, "creating branch");
        let url = self.endpoint(project, &["repository", "branches"])?;
        let body = json!({ "branch": branch, "ref": ref_name });
        self.execute(self.http.post(url).json(&body)).await?;
        Ok(())
    }

    #[instrument(skip(self, description))]
    async fn create_merge_request(
        &self,
        project: &str,
        source_branch: &str,
        target_branch: &str,
        title: &str,
        description: &str,
    ) -> Result<MergeRequest> {
        info!(project, source_branch, target_branch, "creating merge request");
        let url = self.endpoint(project, &["merge_requests"])?;
        let body = json!({
            "source_branch": source_branch,
            "target_branch": target_branch,
            "title": title,
            "description": description,
            "remove_source_branch": true,
        });

        let response = self.execute(self.http.post(url).json(&body)).await?;
        let mr: ApiMergeRequest = response.json().await.map_err(transport_error)?;
        Ok(mr.into())
    }
}

fn next_page(response: &Response) -> Option<u32> {
    response
        .headers()
        .get(NEXT_PAGE_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

fn transport_error(e: reqwest::Error) -> ForgeError {
    if e.is_decode() {
        ForgeError::InvalidResponse(e.to_string())
    } else {
        warn!(error = %e, "gitlab request failed");
        ForgeError::Http(e.to_string())
    }
}

/// Extract GitLab's `message`/`error` field from an error body
fn api_message(status: StatusCode, body: &str) -> String {
    let parsed = serde_json::from_str::<serde_json::Value>(body).ok();
    let message = parsed.as_ref().and_then(|v| {
        v.get("message")
            .or_else(|| v.get("error"))
            .map(|m| match m.as_str() {
                Some(s) => s.to_string(),
                None => m.to_string(),
            })
    });

    match message {
        Some(m) => m,
        None if body.trim().is_empty() => status.to_string(),
        None => body.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> GitLabClient {
        let config = GitLabConfig {
            host: server.uri(),
            token: Some("secret".to_string()),
            timeout_secs: 5,
        };
        GitLabClient::new(&config).unwrap()
    }

    fn tag_json(name: &str, created_at: &str) -> Value {
        json!({
            "name": name,
            "message": "",
            "commit": {
                "id": format!("{}-sha", name),
                "short_id": name,
                "title": "Release",
                "message": "Release",
                "author_name": "CI",
                "author_email": "ci@example.com",
                "created_at": created_at
            },
            "release": null
        })
    }

    #[test]
    fn test_missing_token() {
        let config = GitLabConfig::default();
        assert!(matches!(
            GitLabClient::new(&config),
            Err(ForgeError::MissingToken)
        ));
    }

    #[test]
    fn test_endpoint_encodes_project_path() {
        let config = GitLabConfig {
            host: "https://gitlab.example.com/".to_string(),
            token: Some("t".to_string()),
            timeout_secs: 5,
        };
        let client = GitLabClient::new(&config).unwrap();

        let url = client
            .endpoint("group/sub/app", &["repository", "files", "docs/CHANGELOG.md", "raw"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://gitlab.example.com/api/v4/projects/group%2Fsub%2Fapp/repository/files/docs%2FCHANGELOG.md/raw"
        );
    }

    #[test]
    fn test_api_message() {
        assert_eq!(
            api_message(StatusCode::NOT_FOUND, r#"{"message":"404 Tag Not Found"}"#),
            "404 Tag Not Found"
        );
        assert_eq!(
            api_message(StatusCode::BAD_REQUEST, r#"{"error":"ref is missing"}"#),
            "ref is missing"
        );
        assert_eq!(api_message(StatusCode::BAD_GATEWAY, ""), "502 Bad Gateway");
    }

    #[tokio::test]
    async fn test_list_tags_follows_pagination() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/projects/group%2Fapp/repository/tags"))
            .and(query_param("page", "1"))
            .and(header("PRIVATE-TOKEN", "secret"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([tag_json("v1.1", "2024-02-01T00:00:00Z")]))
                    .insert_header("x-next-page", "2"),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v4/projects/group%2Fapp/repository/tags"))
            .and(query_param("page", "2"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([tag_json("v1.0", "2024-01-01T00:00:00Z")]))
                    .insert_header("x-next-page", ""),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let tags = client.list_tags("group/app").await.unwrap();

        let names: Vec<_> = tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["v1.1", "v1.0"]);
    }

    #[tokio::test]
    async fn test_list_commits_sends_range() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/projects/42/repository/commits"))
            .and(query_param("ref_name", "main"))
            .and(query_param("since", "2024-01-01T00:00:00Z"))
            .and(query_param("until", "2024-02-01T00:00:00Z"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "id": "abc",
                "short_id": "abc",
                "title": "fix: crash",
                "message": "fix: crash\n\nSee merge request group/app!11",
                "author_name": "Dev",
                "author_email": "dev@example.com",
                "created_at": "2024-01-20T00:00:00Z"
            }])))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let since = "2024-01-01T00:00:00Z".parse().ok();
        let until = "2024-02-01T00:00:00Z".parse().ok();
        let commits = client.list_commits("42", "main", since, until).await.unwrap();

        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].title, "fix: crash");
    }

    #[tokio::test]
    async fn test_get_merge_request_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/projects/group%2Fapp/merge_requests/99"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"message": "404 Not found"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let mr = client.get_merge_request("group/app", 99).await.unwrap();
        assert!(mr.is_none());
    }

    #[tokio::test]
    async fn test_server_error_propagates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/projects/group%2Fapp/repository/tags"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.list_tags("group/app").await.unwrap_err();
        assert!(matches!(err, ForgeError::ApiError { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_upsert_release_updates_existing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v4/projects/group%2Fapp/releases"))
            .respond_with(
                ResponseTemplate::new(409)
                    .set_body_json(json!({"message": "Release already exists"})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/api/v4/projects/group%2Fapp/releases/v1.1"))
            .and(body_partial_json(json!({"description": "notes"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"tag_name": "v1.1"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        client.upsert_release("group/app", "v1.1", "notes").await.unwrap();
    }

    #[tokio::test]
    async fn test_get_file_missing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/projects/group%2Fapp/repository/files/CHANGELOG.md/raw"))
            .and(query_param("ref", "main"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let content = client.get_file("group/app", "CHANGELOG.md", "main").await.unwrap();
        assert!(content.is_none());
    }
}
