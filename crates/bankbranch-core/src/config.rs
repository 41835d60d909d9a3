//! Application configuration management.
//!
//! This module handles loading and saving the application configuration:
//! the listing service URL, the startup city and page size, and how long the
//! cached branch list counts as fresh.
//!
//! Configuration is stored at `~/.config/bankbranch/config.json`. The
//! `BANKBRANCH_API_URL` and `BANKBRANCH_CACHE_DIR` environment variables
//! override the file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::client::DEFAULT_API_BASE_URL;
use crate::models::City;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "bankbranch";

/// Config file name
const CONFIG_FILE: &str = "config.json";

const DEFAULT_ITEMS_PER_PAGE: usize = 10;

/// A day old branch list is still good enough to browse; branches rarely move.
const DEFAULT_CACHE_TTL_HOURS: i64 = 24;

pub const ENV_API_URL: &str = "BANKBRANCH_API_URL";
pub const ENV_CACHE_DIR: &str = "BANKBRANCH_CACHE_DIR";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub default_city: City,
    pub items_per_page: usize,
    pub cache_ttl_hours: i64,
    /// Overrides the platform cache directory when set
    pub cache_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            default_city: City::default(),
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
            cache_ttl_hours: DEFAULT_CACHE_TTL_HOURS,
            cache_dir: None,
        }
    }
}

impl Config {
    /// Load the config file (defaults when absent) and apply env overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let config = Self::load_from(&path)?;
        Ok(config.with_env_overrides(
            std::env::var(ENV_API_URL).ok(),
            std::env::var(ENV_CACHE_DIR).ok(),
        ))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            let config: Self = serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?;
            Ok(config.sanitized())
        } else {
            Ok(Self::default())
        }
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn with_env_overrides(mut self, api_url: Option<String>, cache_dir: Option<String>) -> Self {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            self.api_base_url = url;
        }
        if let Some(dir) = cache_dir.filter(|d| !d.trim().is_empty()) {
            self.cache_dir = Some(PathBuf::from(dir));
        }
        self
    }

    /// Page size must stay positive and the TTL non-negative.
    fn sanitized(mut self) -> Self {
        if self.items_per_page == 0 {
            self.items_per_page = DEFAULT_ITEMS_PER_PAGE;
        }
        if self.cache_ttl_hours < 0 {
            self.cache_ttl_hours = DEFAULT_CACHE_TTL_HOURS;
        }
        self
    }

    pub fn cache_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.cache_ttl_hours)
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.cache_dir {
            return Ok(dir.clone());
        }
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.default_city, City::Mumbai);
        assert_eq!(config.items_per_page, 10);
        assert_eq!(config.cache_ttl(), chrono::Duration::hours(24));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"default_city": "delhi", "items_per_page": 0}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.default_city, City::Delhi);
        assert_eq!(config.items_per_page, 10);
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::default().with_env_overrides(
            Some("http://localhost:8080".to_string()),
            Some("/tmp/bankbranch".to_string()),
        );
        assert_eq!(config.api_base_url, "http://localhost:8080");
        assert_eq!(config.cache_dir().unwrap(), PathBuf::from("/tmp/bankbranch"));

        let untouched = Config::default().with_env_overrides(Some("  ".to_string()), None);
        assert_eq!(untouched.api_base_url, DEFAULT_API_BASE_URL);
    }
}
