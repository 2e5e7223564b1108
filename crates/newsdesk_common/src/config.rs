//! Dashboard configuration
//!
//! Lookup order for the config file:
//! 1. explicit `--config` path
//! 2. `$NEWSDESK_CONFIG`
//! 3. `$XDG_CONFIG_HOME/newsdesk/config.toml`
//!
//! A missing file in (2) or (3) means defaults. A missing file in (1) is an error.

use crate::error::ConfigError;
use crate::targets::DisplayTargets;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_ENV: &str = "NEWSDESK_CONFIG";
const CONFIG_DIR: &str = "newsdesk";
const CONFIG_FILE: &str = "config.toml";

/// Backend location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path prefix every status endpoint lives under
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_prefix() -> String {
    "/api".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            prefix: default_prefix(),
        }
    }
}

impl ApiConfig {
    /// Base URL joined with the prefix, without a trailing slash
    pub fn api_root(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let prefix = self.prefix.trim_matches('/');
        if prefix.is_empty() {
            base.to_string()
        } else {
            format!("{}/{}", base, prefix)
        }
    }
}

/// HTTP client settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout in milliseconds (valid: 100-120000)
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl HttpConfig {
    pub fn effective_timeout_ms(&self) -> u64 {
        self.timeout_ms.clamp(100, 120_000)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.effective_timeout_ms())
    }
}

/// Refresh cadence for the two groups
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshConfig {
    /// Stats, AI keys, scheduler, recent articles (valid: 5-3600)
    #[serde(default = "default_frequent_secs")]
    pub frequent_secs: u64,

    /// WordPress connectivity check (valid: 30-86400)
    #[serde(default = "default_infrequent_secs")]
    pub infrequent_secs: u64,

    /// Drop responses that complete after a newer request to the same endpoint
    #[serde(default = "default_discard_stale")]
    pub discard_stale: bool,
}

fn default_frequent_secs() -> u64 {
    30
}

fn default_infrequent_secs() -> u64 {
    300 // 5 minutes, the check hits WordPress upstream
}

fn default_discard_stale() -> bool {
    true
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            frequent_secs: default_frequent_secs(),
            infrequent_secs: default_infrequent_secs(),
            discard_stale: default_discard_stale(),
        }
    }
}

impl RefreshConfig {
    pub fn frequent_interval(&self) -> Duration {
        Duration::from_secs(self.frequent_secs.clamp(5, 3600))
    }

    pub fn infrequent_interval(&self) -> Duration {
        Duration::from_secs(self.infrequent_secs.clamp(30, 86_400))
    }
}

/// How fetched data is turned into display text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Rows requested from `/recent-articles` (valid: 1-100)
    #[serde(default = "default_recent_articles_limit")]
    pub recent_articles_limit: usize,

    #[serde(default = "default_max_chars")]
    pub title_max_chars: usize,

    #[serde(default = "default_max_chars")]
    pub error_max_chars: usize,

    /// chrono strftime pattern for timestamps
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,
}

fn default_recent_articles_limit() -> usize {
    10
}

fn default_max_chars() -> usize {
    40
}

fn default_timestamp_format() -> String {
    "%Y-%m-%d %H:%M:%S".to_string()
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            recent_articles_limit: default_recent_articles_limit(),
            title_max_chars: default_max_chars(),
            error_max_chars: default_max_chars(),
            timestamp_format: default_timestamp_format(),
        }
    }
}

impl DisplayConfig {
    pub fn effective_recent_articles_limit(&self) -> usize {
        self.recent_articles_limit.clamp(1, 100)
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error); RUST_LOG wins when set
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Complete dashboard configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub refresh: RefreshConfig,

    #[serde(default)]
    pub display: DisplayConfig,

    #[serde(default)]
    pub targets: DisplayTargets,

    #[serde(default)]
    pub log: LogConfig,
}

impl DashboardConfig {
    /// Load configuration, honoring an explicit path first
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }
        match discover_config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        tracing::debug!("Loading config from {}", path.display());
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Config file location from the environment, if any can be derived
pub fn discover_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = DashboardConfig::default();
        assert_eq!(config.api.base_url, "http://127.0.0.1:5000");
        assert_eq!(config.api.prefix, "/api");
        assert_eq!(config.http.timeout_ms, 10_000);
        assert_eq!(config.refresh.frequent_secs, 30);
        assert_eq!(config.refresh.infrequent_secs, 300);
        assert!(config.refresh.discard_stale);
        assert_eq!(config.display.recent_articles_limit, 10);
        assert_eq!(config.display.title_max_chars, 40);
        assert_eq!(config.display.error_max_chars, 40);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_api_root_joining() {
        let mut api = ApiConfig {
            base_url: "http://news.local:5000/".to_string(),
            prefix: "/api/".to_string(),
        };
        assert_eq!(api.api_root(), "http://news.local:5000/api");

        api.prefix = String::new();
        assert_eq!(api.api_root(), "http://news.local:5000");
    }

    #[test]
    fn test_clamping() {
        let http = HttpConfig { timeout_ms: 1 };
        assert_eq!(http.effective_timeout_ms(), 100);

        let refresh = RefreshConfig {
            frequent_secs: 1,
            infrequent_secs: 1_000_000,
            discard_stale: false,
        };
        assert_eq!(refresh.frequent_interval(), Duration::from_secs(5));
        assert_eq!(refresh.infrequent_interval(), Duration::from_secs(86_400));

        let display = DisplayConfig {
            recent_articles_limit: 0,
            ..Default::default()
        };
        assert_eq!(display.effective_recent_articles_limit(), 1);
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[api]
base_url = "http://backend:8080"

[refresh]
frequent_secs = 15

[targets]
stat_total = "total-count"
"#
        )
        .unwrap();

        let config = DashboardConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.api.base_url, "http://backend:8080");
        assert_eq!(config.api.prefix, "/api");
        assert_eq!(config.refresh.frequent_secs, 15);
        assert_eq!(config.refresh.infrequent_secs, 300);
        assert_eq!(config.targets.stat_total, "total-count");
        assert_eq!(config.targets.stat_pending, "stat-pending");
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = DashboardConfig::load(Some(&missing)).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[http]\ntimeout_ms = \"soon\"").unwrap();
        let err = DashboardConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_toml_roundtrip_sections() {
        let config = DashboardConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[api]"));
        assert!(toml_str.contains("[refresh]"));
        assert!(toml_str.contains("[targets]"));
    }
}
