//! Configuration Management
//!
//! Handles persistent configuration storage for crmctl.

use crate::api::{auth::mask_secret, DEFAULT_BASE_URL};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// API host, e.g. `https://crm.example.com`
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Keys accepted by `config set`
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ConfigKey {
    BaseUrl,
    ApiKey,
}

/// Settings after applying flags and environment over the config file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectiveConfig {
    pub base_url: String,
    /// Masked for display
    pub api_key: Option<String>,
    pub config_file: String,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("crmctl").join("config.json"))
    }

    /// Load from `path`; a missing or unreadable file gives defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|err| {
                tracing::warn!("ignoring unreadable config {}: {}", path.display(), err);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create parent directory
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;

        Ok(())
    }

    /// Get effective base URL (CLI/env > config > default)
    pub fn effective_base_url(&self, flag: Option<&str>) -> String {
        flag.filter(|s| !s.trim().is_empty())
            .map(str::to_string)
            .or_else(|| self.base_url.clone().filter(|s| !s.trim().is_empty()))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    /// Set one key and save
    pub fn set(&mut self, key: ConfigKey, value: &str, path: &Path) -> Result<()> {
        let value = Some(value.trim().to_string()).filter(|v| !v.is_empty());
        match key {
            ConfigKey::BaseUrl => {
                if let Some(url) = &value {
                    url::Url::parse(url).with_context(|| format!("invalid base URL '{}'", url))?;
                }
                self.base_url = value;
            }
            ConfigKey::ApiKey => self.api_key = value,
        }
        self.save_to(path)
    }

    /// Effective settings for `config show`
    pub fn effective(
        &self,
        base_url_flag: Option<&str>,
        api_key_flag: Option<&str>,
        path: &Path,
    ) -> EffectiveConfig {
        let credentials =
            crate::api::Credentials::resolve(api_key_flag, self.api_key.as_deref());
        EffectiveConfig {
            base_url: self.effective_base_url(base_url_flag),
            api_key: credentials.token().ok().map(mask_secret),
            config_file: path.display().to_string(),
        }
    }
}
