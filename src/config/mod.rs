//! Configuration management for adminctl

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the admin REST API
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Base URL of the identity provider
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_url: Option<String>,

    /// User preferences
    #[serde(default)]
    pub preferences: Preferences,

    /// Retry and write-verification tuning
    #[serde(default)]
    pub retry: RetrySettings,

    /// Session timer settings
    #[serde(default)]
    pub session: SessionSettings,
}

/// User preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preferences {
    /// Default output format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Page size for list requests
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_page_size() -> usize {
    100
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            format: None,
            page_size: default_page_size(),
        }
    }
}

/// Bounds for the transient-error retry and write verification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Attempts per HTTP call when the error is transient
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fixed delay between attempts, in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Attempts of a whole create/update when the write could not be confirmed
    #[serde(default = "default_operation_attempts")]
    pub operation_attempts: u32,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_delay_ms() -> u64 {
    1000
}

fn default_operation_attempts() -> u32 {
    2
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_ms: default_delay_ms(),
            operation_attempts: default_operation_attempts(),
        }
    }
}

impl RetrySettings {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Session timer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Sign out after this many seconds without input
    #[serde(default = "default_inactivity_secs")]
    pub inactivity_timeout_secs: u64,

    /// Refresh the token this many seconds before it expires
    #[serde(default = "default_refresh_buffer_secs")]
    pub refresh_buffer_secs: u64,
}

fn default_inactivity_secs() -> u64 {
    60 * 60
}

fn default_refresh_buffer_secs() -> u64 {
    5 * 60
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            inactivity_timeout_secs: default_inactivity_secs(),
            refresh_buffer_secs: default_refresh_buffer_secs(),
        }
    }
}

impl SessionSettings {
    pub fn inactivity_timeout(&self) -> Duration {
        Duration::from_secs(self.inactivity_timeout_secs)
    }

    pub fn refresh_buffer(&self) -> Duration {
        Duration::from_secs(self.refresh_buffer_secs)
    }
}

impl Config {
    /// Directory holding the config and session files
    pub fn default_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".adminctl"))
    }

    /// Resolve the config path, preferring an explicit override
    pub fn resolve_path(path: Option<&str>) -> Result<PathBuf> {
        match path {
            Some(p) => Ok(PathBuf::from(p)),
            None => Ok(Self::default_dir()?.join("config.yaml")),
        }
    }

    /// Load configuration, falling back to defaults when the file is absent
    pub fn load_at(path: Option<&str>) -> Result<Self> {
        match Self::load_from(Self::resolve_path(path)?) {
            Err(crate::error::Error::Config(ConfigError::NotFound)) => Ok(Self::default()),
            other => other,
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound.into());
        }

        let contents = std::fs::read_to_string(&path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;

        Ok(config)
    }

    /// Save configuration to the resolved path
    pub fn save_at(&self, path: Option<&str>) -> Result<()> {
        self.save_to(Self::resolve_path(path)?)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: PathBuf) -> Result<()> {
        let contents =
            serde_yaml::to_string(self).map_err(|e| ConfigError::SaveError(e.to_string()))?;
        write_private(&path, &contents)
    }

    /// Apply CLI/env overrides on top of the file values
    pub fn with_overrides(mut self, api_url: Option<&str>, auth_url: Option<&str>) -> Self {
        if let Some(url) = api_url {
            self.api_url = Some(url.to_string());
        }
        if let Some(url) = auth_url {
            self.auth_url = Some(url.to_string());
        }
        self
    }

    pub fn require_api_url(&self) -> Result<&str> {
        self.api_url
            .as_deref()
            .ok_or_else(|| ConfigError::MissingApiUrl.into())
    }

    pub fn require_auth_url(&self) -> Result<&str> {
        self.auth_url
            .as_deref()
            .ok_or_else(|| ConfigError::MissingAuthUrl.into())
    }
}

/// Write a file readable only by the owner, creating parent directories.
pub fn write_private(path: &PathBuf, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    std::fs::write(path, contents)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = std::fs::metadata(path)?.permissions();
        perms.set_mode(0o600);
        std::fs::set_permissions(path, perms)?;
    }

    Ok(())
}
