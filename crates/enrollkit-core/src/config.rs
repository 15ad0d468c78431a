//! Application configuration management.
//!
//! This module handles loading and saving the configuration, which holds
//! the API base URL, the last used email, and the session timing policy.
//!
//! Configuration is stored at `~/.config/enrollkit/config.json`.
//! `ENROLLKIT_BASE_URL` overrides the stored base URL.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::auth::session::{
    SessionPolicy, DEFAULT_REFRESH_SKEW_MINUTES, DEFAULT_REFRESH_TIMEOUT_SECS,
    DEFAULT_TOKEN_TTL_MINUTES,
};

/// Application name used for config directory paths
const APP_NAME: &str = "enrollkit";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding `base_url`
pub const BASE_URL_ENV: &str = "ENROLLKIT_BASE_URL";

const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// HTTP request timeout in seconds.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub last_email: Option<String>,
    pub access_token_ttl_minutes: i64,
    pub refresh_skew_minutes: i64,
    pub request_timeout_secs: u64,
    pub refresh_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            last_email: None,
            access_token_ttl_minutes: DEFAULT_TOKEN_TTL_MINUTES,
            refresh_skew_minutes: DEFAULT_REFRESH_SKEW_MINUTES,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            refresh_timeout_secs: DEFAULT_REFRESH_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Load from the config directory, falling back to defaults, then
    /// apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents).context("Failed to parse config file")?
        } else {
            Self::default()
        };
        config.apply_env(std::env::var(BASE_URL_ENV).ok());
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    fn apply_env(&mut self, base_url: Option<String>) {
        if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
            self.base_url = url.trim().to_string();
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Session timing policy. The skew must leave part of the TTL usable.
    pub fn policy(&self) -> Result<SessionPolicy> {
        if self.access_token_ttl_minutes <= 0 {
            bail!("access_token_ttl_minutes must be positive");
        }
        if self.refresh_skew_minutes < 0 || self.refresh_skew_minutes >= self.access_token_ttl_minutes {
            bail!(
                "refresh_skew_minutes ({}) must be between 0 and access_token_ttl_minutes ({})",
                self.refresh_skew_minutes,
                self.access_token_ttl_minutes
            );
        }
        if self.refresh_timeout_secs == 0 {
            bail!("refresh_timeout_secs must be positive");
        }
        Ok(SessionPolicy {
            token_ttl: chrono::Duration::minutes(self.access_token_ttl_minutes),
            refresh_skew: chrono::Duration::minutes(self.refresh_skew_minutes),
            refresh_timeout: Duration::from_secs(self.refresh_timeout_secs),
        })
    }
}
