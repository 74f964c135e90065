// Application settings
// Loaded from ~/.config/collecta/settings.toml, then overridden by COLLECTA_* env vars

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ConfigError;

pub const ENV_API_BASE: &str = "COLLECTA_API_BASE";
pub const ENV_TIMEOUT_SECS: &str = "COLLECTA_TIMEOUT_SECS";
pub const ENV_LIST_RETRIES: &str = "COLLECTA_LIST_RETRIES";

/// Backend connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Base URL of the collections API (no trailing slash needed)
    pub base_url: String,

    /// Per-request timeout
    pub timeout_secs: u64,

    /// Extra attempts for list fetches (mutations are never retried)
    pub list_retries: u32,

    /// First retry delay, doubled on each further retry
    pub retry_backoff_ms: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            timeout_secs: 30,
            list_retries: 2,
            retry_backoff_ms: 1000,
        }
    }
}

/// Netting workflow defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NettingSettings {
    /// Reason attached to disputes filed without an explicit one
    pub default_dispute_reason: String,
}

impl Default for NettingSettings {
    fn default() -> Self {
        Self {
            default_dispute_reason: "Saldo pendiente tras compensación".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api: ApiSettings,
    pub netting: NettingSettings,
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("collecta")
            .join("settings.toml")
    }

    /// Load from the default path and apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Self::load_from(&Self::config_path())?;
        settings.apply_env(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    /// Load a settings file. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("no settings file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let settings: Settings =
            toml::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Apply `COLLECTA_*` overrides through `lookup` (normally `std::env::var`).
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(base) = lookup(ENV_API_BASE).filter(|v| !v.is_empty()) {
            self.api.base_url = base;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            self.api.timeout_secs = raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                key: ENV_TIMEOUT_SECS.to_string(),
                value: raw.clone(),
            })?;
        }
        if let Some(raw) = lookup(ENV_LIST_RETRIES) {
            self.api.list_retries = raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                key: ENV_LIST_RETRIES.to_string(),
                value: raw.clone(),
            })?;
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = &self.api.base_url;
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ConfigError::Validation(format!(
                "api.base_url must start with http:// or https://, got '{base}'"
            )));
        }
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::Validation("api.timeout_secs must be at least 1".into()));
        }
        Ok(())
    }

    /// Save current settings to disk
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io(e.to_string()))?;
        }
        let text = toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        fs::write(path, text).map_err(|e| ConfigError::Io(e.to_string()))
    }
}
