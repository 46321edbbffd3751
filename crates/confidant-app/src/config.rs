//! Configuration management for Confidant
//!
//! Settings live in ~/.config/confidant/config.toml. The endpoint base can be
//! overridden with `CONFIDANT_API_BASE` (also read from a `.env` file).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use confidant::CONTEXT_WINDOW;

use crate::adapters::ollama::DEFAULT_API_BASE;

const CONFIG_DIR: &str = "confidant";
const CONFIG_FILE: &str = "config.toml";

/// Environment variable overriding `api_base`
pub const API_BASE_ENV: &str = "CONFIDANT_API_BASE";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the inference endpoint
    pub api_base: String,
    /// Directory holding personas.json and conversations.json
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    pub chat_timeout_secs: u64,
    pub discovery_timeout_secs: u64,
    /// Trailing transcript messages sent with each request
    pub context_window: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            data_dir: None,
            chat_timeout_secs: 120,
            discovery_timeout_secs: 10,
            context_window: CONTEXT_WINDOW,
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join(CONFIG_DIR);
        Ok(config_dir)
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }

    /// Load config from the default location, then apply environment overrides
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_overrides(std::env::var(API_BASE_ENV).ok());
        Ok(config)
    }

    /// Load config from an explicit file, or defaults if it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;

        let config: Config =
            toml::from_str(&content).with_context(|| "Failed to parse config file")?;

        Ok(config)
    }

    /// Save config to an explicit file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory {:?}", dir))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, content).with_context(|| format!("Failed to write config to {:?}", path))?;

        Ok(())
    }

    /// Apply an endpoint override; blank values are ignored
    pub fn apply_overrides(&mut self, api_base: Option<String>) {
        if let Some(base) = api_base.filter(|b| !b.trim().is_empty()) {
            self.api_base = base.trim().to_string();
        }
    }

    /// Resolved data directory
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(dirs::data_dir()
                .context("Could not determine data directory")?
                .join(CONFIG_DIR)),
        }
    }

    pub fn chat_timeout(&self) -> Duration {
        Duration::from_secs(self.chat_timeout_secs)
    }

    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_secs(self.discovery_timeout_secs)
    }
}
