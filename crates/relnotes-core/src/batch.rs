//! Batch configuration: several projects released in one run

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{normalize_host, read_structured};
use crate::error::ConfigError;

/// A batch file describing several project releases
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Product name used as the title of merged notes
    #[serde(default)]
    pub product_name: Option<String>,

    /// Projects to process
    #[serde(default)]
    pub projects: Vec<BatchProject>,
}

/// One project entry of a batch file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchProject {
    /// Project path or numeric ID
    pub project: String,

    /// Ref to release from
    #[serde(rename = "ref")]
    pub ref_name: String,

    /// Tag to create or describe
    pub tag: String,

    /// Optional starting tag or commit
    #[serde(default)]
    pub since: Option<String>,

    /// Per-project host override
    #[serde(default)]
    pub gitlab_host: Option<String>,

    /// Per-project token override
    #[serde(default)]
    pub gitlab_token: Option<String>,
}

impl BatchProject {
    /// Project name without its group path (`group/sub/app` -> `app`)
    pub fn display_name(&self) -> &str {
        self.project.rsplit('/').next().unwrap_or(&self.project)
    }

    /// Project path with `/` replaced, safe for file names
    pub fn file_stem(&self) -> String {
        self.project.replace('/', "_")
    }
}

impl BatchConfig {
    /// Product name, falling back to `Release-<first tag>`
    pub fn product_name_or_default(&self) -> String {
        self.product_name.clone().unwrap_or_else(|| {
            let tag = self
                .projects
                .first()
                .map(|p| p.tag.as_str())
                .unwrap_or("Unknown");
            format!("Release-{}", tag)
        })
    }
}

/// Load and validate a batch file (YAML, TOML or JSON by extension)
pub fn load_batch_config(path: &Path) -> Result<BatchConfig, ConfigError> {
    info!(path = %path.display(), "loading batch config");
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let mut batch: BatchConfig = read_structured(path)?;

    if batch.projects.is_empty() {
        return Err(ConfigError::MissingField("projects".to_string()));
    }

    for (i, project) in batch.projects.iter_mut().enumerate() {
        for (field, value) in [
            ("project", &project.project),
            ("ref", &project.ref_name),
            ("tag", &project.tag),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: format!("projects[{}].{}", i, field),
                    message: "cannot be empty".to_string(),
                });
            }
        }
        if let Some(host) = project.gitlab_host.as_mut() {
            *host = normalize_host(host);
        }
    }

    debug!(projects = batch.projects.len(), "batch config loaded");
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_batch_json() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("batch.json");
        std::fs::write(
            &path,
            r#"{
                "product_name": "My Product",
                "projects": [
                    {"project": "group/api", "ref": "master", "tag": "v1.0.0"},
                    {"project": "group/web", "ref": "main", "tag": "v2.0.0",
                     "since": "v1.9.0", "gitlab_host": "custom.gitlab.com"}
                ]
            }"#,
        )
        .unwrap();

        let batch = load_batch_config(&path).unwrap();
        assert_eq!(batch.product_name_or_default(), "My Product");
        assert_eq!(batch.projects.len(), 2);
        assert_eq!(batch.projects[0].ref_name, "master");
        assert_eq!(batch.projects[1].since.as_deref(), Some("v1.9.0"));
        assert_eq!(
            batch.projects[1].gitlab_host.as_deref(),
            Some("https://custom.gitlab.com")
        );
    }

    #[test]
    fn test_load_batch_yaml_default_product_name() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("batch.yaml");
        std::fs::write(
            &path,
            "projects:\n  - project: group/sub/app\n    ref: main\n    tag: v3.1.0\n",
        )
        .unwrap();

        let batch = load_batch_config(&path).unwrap();
        assert_eq!(batch.product_name_or_default(), "Release-v3.1.0");
        assert_eq!(batch.projects[0].display_name(), "app");
        assert_eq!(batch.projects[0].file_stem(), "group_sub_app");
    }

    #[test]
    fn test_load_batch_requires_projects() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("batch.yaml");
        std::fs::write(&path, "product_name: Empty\n").unwrap();

        assert!(matches!(
            load_batch_config(&path),
            Err(ConfigError::MissingField(_))
        ));
    }

    #[test]
    fn test_load_batch_rejects_empty_tag() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("batch.yaml");
        std::fs::write(
            &path,
            "projects:\n  - project: group/app\n    ref: main\n    tag: \"\"\n",
        )
        .unwrap();

        assert!(matches!(
            load_batch_config(&path),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
