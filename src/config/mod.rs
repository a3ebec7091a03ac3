//! Configuration module for FlutterLens.
//!
//! Handles loading and parsing the .flutterlensrc configuration file.

use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::{self, API_URL_ENV, ApiClient, DEFAULT_TIMEOUT_SECS};
use crate::logging::LogConfig;
use crate::service::DEFAULT_PAGE_SIZE;
use crate::store::{CacheKind, CacheTtls};

/// Maximum page size accepted from the config file.
pub const MAX_PAGE_SIZE: u32 = 200;

/// Default .flutterlensrc file content with all settings documented.
const DEFAULT_RC: &str = r#"# FlutterLens Configuration File
# ==============================
# This file is read on application startup.
# Lines starting with '#' are comments.
#
# API
# ---
# Base URL of the FlutterLens API. The FLUTTERLENS_API_URL environment
# variable takes precedence. When unset, http://localhost:8000 is used with
# --local, otherwise https://flutterlens.vercel.app.
# api_url = http://localhost:8000
#
# Request timeout in seconds.
# timeout_secs = 30
#
# Items per page in the docs, packages and issues tables.
# page_size = 50

# Cache
# -----
# Seconds each resource kind is served from cache before refetching.
# ttl_docs = 300
# ttl_packages = 600
# ttl_issues = 900
# ttl_stats = 120

# Logging Configuration
# ---------------------
# Logs are stored in ~/.flutterlens/logs/ with automatic cleanup.
#
# log_enabled = true       # Enable/disable file logging (true/false)
# log_level = info         # Log level: trace, debug, info, warn, error, off
# log_retention = 24       # Hours to keep log files (default: 24)
"#;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// API base URL from the config file.
    pub api_url: Option<String>,
    /// Request timeout.
    pub timeout: Duration,
    /// Cache TTLs.
    pub ttls: CacheTtls,
    /// Page size for table fetches.
    pub page_size: u32,
    /// Path to config file.
    pub config_path: PathBuf,
    /// Logging configuration.
    pub log_config: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            ttls: CacheTtls::default(),
            page_size: DEFAULT_PAGE_SIZE,
            config_path: Self::default_config_path(),
            log_config: LogConfig::default(),
        }
    }
}

impl Config {
    /// Returns the default config file path (~/.flutterlensrc).
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".flutterlensrc")
    }

    /// Loads configuration from the default path, creating it if it doesn't exist.
    ///
    /// # Errors
    /// Returns error if config cannot be read.
    pub fn load() -> io::Result<Self> {
        let path = Self::default_config_path();
        Self::load_from(&path)
    }

    /// Loads configuration from a specific path.
    ///
    /// # Errors
    /// Returns error if config cannot be read.
    pub fn load_from(path: &Path) -> io::Result<Self> {
        if !path.exists() {
            Self::create_default_config(path)?;
        }

        let content = fs::read_to_string(path)?;
        let mut config = Self {
            config_path: path.to_path_buf(),
            ..Self::default()
        };
        config.parse(&content);
        Ok(config)
    }

    /// Creates the default config file.
    fn create_default_config(path: &Path) -> io::Result<()> {
        let mut file = fs::File::create(path)?;
        file.write_all(DEFAULT_RC.as_bytes())?;
        Ok(())
    }

    /// Parses the config file content.
    pub fn parse(&mut self, content: &str) {
        for line in content.lines() {
            let line = line.trim();

            // Skip comments and empty lines
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                // Remove inline comments. URLs never contain " #".
                let value = value.split(" #").next().unwrap_or(value).trim();

                self.apply_setting(key, value);
            }
        }
    }

    /// Applies a single setting. Invalid values keep the current setting.
    fn apply_setting(&mut self, key: &str, value: &str) {
        match key {
            "api_url" | "api-url" => {
                self.api_url = (!value.is_empty()).then(|| value.to_string());
            }
            "timeout_secs" | "timeout" => {
                if let Some(secs) = parse_secs(value).filter(|s| *s > 0) {
                    self.timeout = Duration::from_secs(secs);
                }
            }
            "page_size" => {
                if let Ok(size) = value.parse::<u32>() {
                    if size > 0 {
                        self.page_size = size.min(MAX_PAGE_SIZE);
                    }
                }
            }
            "ttl_docs" => self.apply_ttl(CacheKind::Docs, value),
            "ttl_packages" => self.apply_ttl(CacheKind::Packages, value),
            "ttl_issues" => self.apply_ttl(CacheKind::Issues, value),
            "ttl_stats" => self.apply_ttl(CacheKind::Stats, value),
            "log_level" => {
                if let Some(level) = LogConfig::parse_level(value) {
                    self.log_config.level = level;
                }
            }
            "log_retention" | "log_retention_hours" => {
                if let Some(retention) = LogConfig::parse_retention(value) {
                    self.log_config.retention = retention;
                }
            }
            "log_enabled" | "logging" => {
                self.log_config.enabled = parse_bool(value);
            }
            _ => {}
        }
    }

    fn apply_ttl(&mut self, kind: CacheKind, value: &str) {
        if let Some(secs) = parse_secs(value) {
            self.ttls.set(kind, Duration::from_secs(secs));
        }
    }

    /// Resolves the API base URL for this configuration.
    ///
    /// `origin_host` is the host the dashboard considers itself served
    /// from; `localhost` selects the local API.
    #[must_use]
    pub fn api_base_url(&self, origin_host: Option<&str>) -> String {
        let env_override = env::var(API_URL_ENV).ok();
        api::resolve_base_url(
            env_override.as_deref(),
            self.api_url.as_deref(),
            origin_host,
        )
    }

    /// Builds an API client from this configuration.
    #[must_use]
    pub fn api_client(&self, origin_host: Option<&str>) -> ApiClient {
        ApiClient::new(&self.api_base_url(origin_host), self.timeout)
    }

    /// Reloads the configuration from disk.
    ///
    /// # Errors
    /// Returns error if config cannot be read.
    pub fn reload(&mut self) -> io::Result<()> {
        let path = self.config_path.clone();
        *self = Self::load_from(&path)?;
        Ok(())
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "yes" | "1" | "on")
}

fn parse_secs(value: &str) -> Option<u64> {
    value.parse().ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.api_url.is_none());
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.ttls, CacheTtls::default());
    }

    #[test]
    fn test_parse_settings() {
        let mut config = Config::default();
        config.parse(
            "# comment\n\
             api_url = http://127.0.0.1:9000  # local api\n\
             timeout_secs = 10\n\
             page_size = 25\n\
             ttl_docs = 60\n\
             ttl_stats = 0\n\
             log_level = DEBUG\n\
             log_enabled = off\n",
        );

        assert_eq!(config.api_url.as_deref(), Some("http://127.0.0.1:9000"));
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.page_size, 25);
        assert_eq!(config.ttls.docs, Duration::from_secs(60));
        assert_eq!(config.ttls.stats, Duration::ZERO);
        assert_eq!(config.ttls.issues, CacheTtls::default().issues);
        assert_eq!(
            config.log_config.level,
            tracing::level_filters::LevelFilter::DEBUG
        );
        assert!(!config.log_config.enabled);
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let mut config = Config::default();
        config.parse("timeout_secs = 0\npage_size = lots\nttl_issues = -5\nunknown = 1\n");

        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.ttls.issues, CacheTtls::default().issues);
    }

    #[test]
    fn test_page_size_clamped() {
        let mut config = Config::default();
        config.parse("page_size = 5000");
        assert_eq!(config.page_size, MAX_PAGE_SIZE);
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".flutterlensrc");

        let config = Config::load_from(&path).unwrap();

        assert!(path.exists());
        assert_eq!(config.config_path, path);
        assert_eq!(config.ttls, CacheTtls::default());
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("ttl_packages"));
    }

    #[test]
    fn test_reload_picks_up_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".flutterlensrc");
        let mut config = Config::load_from(&path).unwrap();

        fs::write(&path, "page_size = 12\n").unwrap();
        config.reload().unwrap();

        assert_eq!(config.page_size, 12);
    }
}
