//! Default configuration values

/// Default configuration file name (YAML)
pub const DEFAULT_CONFIG_YAML: &str = "relnotes.yaml";

/// Default configuration file name (TOML)
pub const DEFAULT_CONFIG_TOML: &str = "relnotes.toml";

/// Alternative configuration file name
pub const ALT_CONFIG_FILE: &str = ".relnotes.yaml";

/// Default GitLab instance
pub const DEFAULT_GITLAB_HOST: &str = "https://gitlab.com";

/// Client-level request timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Default merge request fetch concurrency
pub const DEFAULT_WORKERS: usize = 4;

/// Default changelog file
pub const DEFAULT_CHANGELOG_FILE: &str = "CHANGELOG.md";

/// Default prefix for changelog update branches
pub const DEFAULT_BRANCH_PREFIX: &str = "changelog-";

/// Default tag annotation template
pub const DEFAULT_TAG_MESSAGE: &str = "Release {tag}";

/// Environment variable overriding the GitLab host
pub const ENV_GITLAB_HOST: &str = "RELNOTES_GITLAB_HOST";

/// Environment variable overriding the GitLab token
pub const ENV_GITLAB_TOKEN: &str = "RELNOTES_GITLAB_TOKEN";

/// Environment variable overriding the default project
pub const ENV_PROJECT: &str = "RELNOTES_PROJECT";

/// Get list of config file names to search for
pub fn config_file_names() -> Vec<&'static str> {
    vec![
        DEFAULT_CONFIG_YAML,
        DEFAULT_CONFIG_TOML,
        ALT_CONFIG_FILE,
        ".relnotes.toml",
        "relnotes.json",
    ]
}

/// Default configuration template
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# relnotes configuration
#
# Values here are overridden by RELNOTES_GITLAB_HOST, RELNOTES_GITLAB_TOKEN
# and RELNOTES_PROJECT, which are in turn overridden by command-line flags.

gitlab:
  host: https://gitlab.com
  # Prefer RELNOTES_GITLAB_TOKEN over storing the token here
  token: your-gitlab-token-here
  timeout_secs: 300

project: group/project-name

# Optional starting tag or commit for the release note range
# since: v1.0.0

release:
  ref_name: main
  tag_message: "Release {tag}"

changelog:
  file: CHANGELOG.md
  branch_prefix: changelog-

workers: 4
"#;
