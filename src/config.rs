use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::router::Facet;

/// Configuration file structure for the exporter.
///
/// Loaded once at startup; every error found here is fatal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// GitLab connection settings
    #[serde(default)]
    pub gitlab: GitLabConfig,

    /// Entity path filter. When the section is present its `filter` key is required.
    pub filter: Option<FilterConfig>,

    /// Metric naming and listener settings
    #[serde(default)]
    pub exporter: ExporterConfig,

    /// Scrape endpoints, one per collection set
    #[serde(default, rename = "endpoint")]
    pub endpoints: Vec<EndpointConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GitLabConfig {
    /// GitLab instance base URL
    #[serde(default = "default_gitlab_url")]
    pub url: String,

    /// Personal, group or project access token
    pub private_token: Option<String>,

    /// Page size used when draining paginated collections
    #[serde(default = "default_per_page")]
    pub per_page: u32,

    /// Upstream request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    pub filter: FilterPatterns,
}

/// Glob patterns, given either as a native array or as a string holding a JSON array.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterPatterns {
    List(Vec<String>),
    Json(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ExporterConfig {
    /// Prefix prepended to every metric name
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Address every endpoint binds to
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EndpointConfig {
    pub name: String,
    pub port: u16,
    pub collectors: Vec<Facet>,
}

impl Default for GitLabConfig {
    fn default() -> Self {
        Self {
            url: default_gitlab_url(),
            private_token: None,
            per_page: default_per_page(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            bind_address: default_bind_address(),
        }
    }
}

fn default_gitlab_url() -> String {
    "https://gitlab.com".to_string()
}

fn default_per_page() -> u32 {
    100
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_namespace() -> String {
    "gitlab".to_string()
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

pub const DEFAULT_PORT: u16 = 9118;

impl FilterPatterns {
    fn resolve(&self) -> Result<Vec<String>> {
        match self {
            Self::List(patterns) => Ok(patterns.clone()),
            Self::Json(raw) => serde_json::from_str(raw)
                .with_context(|| format!("Filter is not a JSON array of strings: {raw}")),
        }
    }
}

impl Config {
    /// Load configuration from a file.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path
    /// 2. ./gitlab-exporter.toml
    /// 3. ./gitlab-exporter.json
    /// 4. ./gitlab-exporter.yaml
    /// 5. ./gitlab-exporter.yml
    ///
    /// Returns default configuration if no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }

        let candidates = [
            "gitlab-exporter.toml",
            "gitlab-exporter.json",
            "gitlab-exporter.yaml",
            "gitlab-exporter.yml",
        ];

        for candidate in &candidates {
            let path = Path::new(candidate);
            if path.exists() {
                return Self::load_from_path(path);
            }
        }

        Ok(Self::default())
    }

    fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        let config: Self = match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))?,
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?,
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?,
            _ => toml::from_str(&contents)
                .or_else(|_| serde_json::from_str(&contents))
                .or_else(|_| serde_yaml::from_str(&contents))
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.gitlab.per_page == 0 {
            bail!("gitlab.per-page must be at least 1");
        }

        let mut names = HashSet::new();
        let mut ports = HashSet::new();
        for endpoint in &self.endpoints {
            if !names.insert(endpoint.name.as_str()) {
                bail!("Duplicate endpoint name: {}", endpoint.name);
            }
            if !ports.insert(endpoint.port) {
                bail!("Duplicate endpoint port: {}", endpoint.port);
            }
            if endpoint.collectors.is_empty() {
                bail!("Endpoint '{}' has no collectors", endpoint.name);
            }
        }

        self.filter_patterns().map(|_| ())
    }

    /// Glob patterns restricting which groups and projects are exported.
    pub fn filter_patterns(&self) -> Result<Vec<String>> {
        self.filter
            .as_ref()
            .map_or_else(|| Ok(Vec::new()), |filter| filter.filter.resolve())
    }

    /// Configured endpoints, or the single default endpoint when none are given.
    pub fn endpoints(&self) -> Vec<EndpointConfig> {
        if !self.endpoints.is_empty() {
            return self.endpoints.clone();
        }

        vec![EndpointConfig {
            name: "default".to_string(),
            port: DEFAULT_PORT,
            collectors: vec![
                Facet::Issues,
                Facet::MergeRequests,
                Facet::Pipelines,
                Facet::Membership,
                Facet::Paths,
            ],
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn load_str(suffix: &str, content: &str) -> Result<Config> {
        let mut temp_file = NamedTempFile::with_suffix(suffix).unwrap();
        write!(temp_file, "{}", content).unwrap();
        Config::load_from_path(temp_file.path())
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.gitlab.url, "https://gitlab.com");
        assert_eq!(config.gitlab.per_page, 100);
        assert_eq!(config.exporter.namespace, "gitlab");
        assert!(config.filter_patterns().unwrap().is_empty());

        let endpoints = config.endpoints();
        assert_eq!(endpoints.len(), 1);
        assert_eq!(endpoints[0].port, 9118);
        assert!(!endpoints[0].collectors.contains(&Facet::ProtectedBranches));
    }

    #[test]
    fn test_load_toml_config() {
        let config = load_str(
            ".toml",
            r#"
[gitlab]
url = "https://gitlab.example.com"
private-token = "glpat-test-token"
per-page = 50

[filter]
filter = ["teamA/*", "teamB/svc?"]

[exporter]
namespace = "gl"

[[endpoint]]
name = "fast"
port = 9118
collectors = ["pipelines", "issues", "merge_requests"]

[[endpoint]]
name = "slow"
port = 9119
collectors = ["membership", "paths", "protected_branches"]
"#,
        )
        .unwrap();

        assert_eq!(config.gitlab.url, "https://gitlab.example.com");
        assert_eq!(config.gitlab.private_token.as_deref(), Some("glpat-test-token"));
        assert_eq!(config.gitlab.per_page, 50);
        assert_eq!(config.exporter.namespace, "gl");
        assert_eq!(config.filter_patterns().unwrap(), vec!["teamA/*", "teamB/svc?"]);

        let endpoints = config.endpoints();
        assert_eq!(endpoints.len(), 2);
        assert_eq!(endpoints[1].name, "slow");
        assert_eq!(
            endpoints[1].collectors,
            vec![Facet::Membership, Facet::Paths, Facet::ProtectedBranches]
        );
    }

    #[test]
    fn test_filter_as_json_string() {
        let config = load_str(
            ".toml",
            r#"
[filter]
filter = '["group/*"]'
"#,
        )
        .unwrap();

        assert_eq!(config.filter_patterns().unwrap(), vec!["group/*"]);
    }

    #[test]
    fn test_filter_section_without_key_is_fatal() {
        let result = load_str(
            ".toml",
            r#"
[filter]
patterns = ["group/*"]
"#,
        );

        assert!(result.is_err());
    }

    #[test]
    fn test_malformed_filter_json_is_fatal() {
        let result = load_str(
            ".toml",
            r#"
[filter]
filter = "[not json"
"#,
        );

        assert!(result.is_err());
    }

    #[test]
    fn test_load_json_config() {
        let config = load_str(
            ".json",
            r#"{
  "gitlab": { "url": "https://gitlab.json.com" },
  "filter": { "filter": ["a/*"] }
}"#,
        )
        .unwrap();

        assert_eq!(config.gitlab.url, "https://gitlab.json.com");
        assert_eq!(config.filter_patterns().unwrap(), vec!["a/*"]);
    }

    #[test]
    fn test_load_yaml_config() {
        let config = load_str(
            ".yaml",
            r#"
gitlab:
  timeout-secs: 5
endpoint:
  - name: slow
    port: 9200
    collectors: [protected_branches]
"#,
        )
        .unwrap();

        assert_eq!(config.gitlab.timeout_secs, 5);
        assert_eq!(config.endpoints()[0].collectors, vec![Facet::ProtectedBranches]);
    }

    #[test]
    fn test_duplicate_ports_rejected() {
        let result = load_str(
            ".toml",
            r#"
[[endpoint]]
name = "a"
port = 9118
collectors = ["paths"]

[[endpoint]]
name = "b"
port = 9118
collectors = ["membership"]
"#,
        );

        assert!(result.unwrap_err().to_string().contains("Duplicate endpoint port"));
    }

    #[test]
    fn test_unknown_collector_rejected() {
        let result = load_str(
            ".toml",
            r#"
[[endpoint]]
name = "a"
port = 9118
collectors = ["deployments"]
"#,
        );

        assert!(result.is_err());
    }

    #[test]
    fn test_empty_collector_list_rejected() {
        let result = load_str(
            ".toml",
            r#"
[[endpoint]]
name = "a"
port = 9118
collectors = []
"#,
        );

        assert!(result.unwrap_err().to_string().contains("no collectors"));
    }

    #[test]
    fn test_load_nonexistent_config_fails() {
        assert!(Config::load(Some(Path::new("nonexistent.toml"))).is_err());
    }
}
