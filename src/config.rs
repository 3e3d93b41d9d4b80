//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::render::Layout;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub page: PageConfig,

    #[serde(default)]
    pub messages: MessagesConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the published site lives
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Page location the base path is resolved from
    pub location: Option<String>,

    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    #[serde(default = "default_index_file")]
    pub index_file: String,
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_index_file() -> String {
    "index.json".to_string()
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            location: None,
            data_dir: default_data_dir(),
            index_file: default_index_file(),
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// No timeout unless set
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_user_agent() -> String {
    format!("trendview/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            request_timeout_secs: None,
        }
    }
}

/// Rendered page configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PageConfig {
    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default)]
    pub layout: Layout,

    /// Element id of the status region
    #[serde(default = "default_status_id")]
    pub status_id: String,

    /// Element id of the list/table region
    #[serde(default = "default_list_id")]
    pub list_id: String,

    /// Element id of the detail panel
    #[serde(default = "default_detail_id")]
    pub detail_id: String,

    /// Shown for a missing source or count
    #[serde(default = "default_placeholder")]
    pub placeholder: String,

    /// Load the newest snapshot into the detail panel
    #[serde(default = "default_eager_detail")]
    pub eager_detail: bool,
}

fn default_title() -> String {
    "Trend Archive".to_string()
}

fn default_status_id() -> String {
    "status".to_string()
}

fn default_list_id() -> String {
    "days".to_string()
}

fn default_detail_id() -> String {
    "detail".to_string()
}

fn default_placeholder() -> String {
    "—".to_string()
}

fn default_eager_detail() -> bool {
    true
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            layout: Layout::default(),
            status_id: default_status_id(),
            list_id: default_list_id(),
            detail_id: default_detail_id(),
            placeholder: default_placeholder(),
            eager_detail: default_eager_detail(),
        }
    }
}

/// User-facing status messages, one per outcome
#[derive(Debug, Clone, Deserialize)]
pub struct MessagesConfig {
    #[serde(default = "default_loading")]
    pub loading: String,

    #[serde(default = "default_empty")]
    pub empty: String,

    #[serde(default = "default_fetch_failed")]
    pub fetch_failed: String,

    #[serde(default = "default_parse_failed")]
    pub parse_failed: String,

    #[serde(default = "default_schema_failed")]
    pub schema_failed: String,

    #[serde(default = "default_detail_failed")]
    pub detail_failed: String,

    /// Appended to the count in list links
    #[serde(default = "default_count_label")]
    pub count_label: String,
}

fn default_loading() -> String {
    "Loading…".to_string()
}

fn default_empty() -> String {
    "No data to display yet.".to_string()
}

fn default_fetch_failed() -> String {
    "Could not load the snapshot list.".to_string()
}

fn default_parse_failed() -> String {
    "The snapshot list is damaged and could not be read.".to_string()
}

fn default_schema_failed() -> String {
    "The snapshot list has an unexpected format.".to_string()
}

fn default_detail_failed() -> String {
    "Could not load this snapshot.".to_string()
}

fn default_count_label() -> String {
    "trends".to_string()
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            loading: default_loading(),
            empty: default_empty(),
            fetch_failed: default_fetch_failed(),
            parse_failed: default_parse_failed(),
            schema_failed: default_schema_failed(),
            detail_failed: default_detail_failed(),
            count_label: default_count_label(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Result of searching the default config locations.
///
/// Nothing is logged while searching, since logging is configured from the
/// result; call [`ConfigDiscovery::log`] once the subscriber is installed.
#[derive(Debug)]
pub struct ConfigDiscovery {
    pub config: Config,
    /// File the config came from, `None` when defaults were used
    pub loaded_from: Option<PathBuf>,
    /// Files that existed but could not be loaded
    pub failures: Vec<ConfigError>,
}

impl ConfigDiscovery {
    pub fn log(&self) {
        for failure in &self.failures {
            tracing::warn!("Failed to load config: {}", failure);
        }
        match &self.loaded_from {
            Some(path) => tracing::info!("Loaded config from {:?}", path),
            None => tracing::info!("Using default config with environment overrides"),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Config file locations, in search order
    pub fn default_paths() -> Vec<PathBuf> {
        [
            dirs::config_dir().map(|p| p.join("trendview").join("config.toml")),
            Some(PathBuf::from("/etc/trendview/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Load the first existing file of `paths` that parses, else defaults
    pub fn discover(paths: &[PathBuf]) -> ConfigDiscovery {
        let mut failures = Vec::new();

        for path in paths.iter().filter(|p| p.exists()) {
            match Self::load_with_env(path) {
                Ok(config) => {
                    return ConfigDiscovery {
                        config,
                        loaded_from: Some(path.clone()),
                        failures,
                    }
                }
                Err(e) => failures.push(e),
            }
        }

        ConfigDiscovery {
            config: Self::from_env(),
            loaded_from: None,
            failures,
        }
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let discovery = Self::discover(&Self::default_paths());
        discovery.log();
        discovery.config
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(location) = var("TRENDVIEW_LOCATION") {
            self.site.location = Some(location);
        }
        if let Some(data_dir) = var("TRENDVIEW_DATA_DIR") {
            self.site.data_dir = data_dir;
        }
        if let Some(level) = var("TRENDVIEW_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("TRENDVIEW_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# trendview Configuration
#
# Environment variables override these settings:
# - TRENDVIEW_LOCATION
# - TRENDVIEW_DATA_DIR
# - TRENDVIEW_LOG_LEVEL
# - TRENDVIEW_LOG_FORMAT

[site]
# Page location the data directory is resolved against
# location = "https://user.github.io/trend-archive/"

# Directory holding index.json and the daily snapshots
data_dir = "data"

# Index file name inside data_dir
index_file = "index.json"

[http]
# User-Agent header
# user_agent = "trendview/0.1.0"

# Request timeout in seconds (no timeout when unset)
# request_timeout_secs = 30

[page]
title = "Trend Archive"

# Row layout: list or table
layout = "list"

# Element ids supplied to the page shell
status_id = "status"
list_id = "days"
detail_id = "detail"

# Shown when a snapshot has no source or count
placeholder = "—"

# Load the newest snapshot into the detail panel
eager_detail = true

[messages]
loading = "Loading…"
empty = "No data to display yet."
fetch_failed = "Could not load the snapshot list."
parse_failed = "The snapshot list is damaged and could not be read."
schema_failed = "The snapshot list has an unexpected format."
detail_failed = "Could not load this snapshot."
count_label = "trends"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.site.data_dir, "data");
        assert_eq!(config.site.index_file, "index.json");
        assert_eq!(config.page.list_id, "days");
        assert_eq!(config.page.layout, Layout::List);
        assert_eq!(config.http.request_timeout_secs, None);
        assert!(config.http.user_agent.starts_with("trendview/"));
    }

    #[test]
    fn test_generated_config_parses() {
        let config = Config::parse(&generate_default_config()).unwrap();
        assert_eq!(config.page.placeholder, "—");
        assert_eq!(config.messages.count_label, "trends");
        assert_eq!(config.logging.format, "pretty");
        assert!(config.site.location.is_none());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = Config::parse(
            r#"
            [site]
            location = "https://user.github.io/trend-archive/"

            [page]
            layout = "table"
            "#,
        )
        .unwrap();

        assert_eq!(
            config.site.location.as_deref(),
            Some("https://user.github.io/trend-archive/")
        );
        assert_eq!(config.site.data_dir, "data");
        assert_eq!(config.page.layout, Layout::Table);
        assert_eq!(config.page.status_id, "status");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[http]\nrequest_timeout_secs = 5").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.http.request_timeout_secs, Some(5));
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(matches!(Config::load(&missing), Err(ConfigError::Io { .. })));

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "[page]\nlayout = \"grid\"").unwrap();
        assert!(matches!(Config::load(&bad), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_discover_skips_broken_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        let bad = dir.path().join("bad.toml");
        let good = dir.path().join("good.toml");
        std::fs::write(&bad, "[page\n").unwrap();
        std::fs::write(&good, "[page]\ntitle = \"From file\"").unwrap();

        let discovery = Config::discover(&[missing, bad.clone(), good.clone()]);
        assert_eq!(discovery.loaded_from, Some(good));
        assert_eq!(discovery.config.page.title, "From file");
        assert_eq!(discovery.failures.len(), 1);
        assert!(matches!(
            &discovery.failures[0],
            ConfigError::Parse { path, .. } if *path == bad
        ));

        let discovery = Config::discover(&[dir.path().join("none.toml")]);
        assert!(discovery.loaded_from.is_none());
        assert!(discovery.failures.is_empty());
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("TRENDVIEW_LOCATION", "http://localhost:8000/"),
            ("TRENDVIEW_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.site.location.as_deref(), Some("http://localhost:8000/"));
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.site.data_dir, "data");
    }
}
