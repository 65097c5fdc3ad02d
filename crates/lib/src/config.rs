//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.medichat/config.json`) and
//! environment. Holds the chat backend endpoint and the frontend
//! preferences persisted across runs (theme).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Chat backend endpoint settings.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Frontend preferences (theme).
    #[serde(default)]
    pub ui: UiConfig,
}

/// Chat backend endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendConfig {
    /// Base URL of the chat backend (default "http://127.0.0.1:5000").
    /// Overridden by MEDICHAT_BACKEND_URL env when set.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds (default 30). Applied by the transport;
    /// the widget itself never times out a turn.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Frontend preferences persisted across runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiConfig {
    /// Theme preference: "dark" or "light". Absent = frontend default.
    pub theme: Option<String>,
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("MEDICHAT_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".medichat").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Resolve the backend base URL: env MEDICHAT_BACKEND_URL overrides config.
pub fn resolve_backend_url(config: &Config) -> String {
    std::env::var("MEDICHAT_BACKEND_URL")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| config.backend.base_url.trim().to_string())
}

/// Load config from the default path (or MEDICHAT_CONFIG_PATH). Missing file
/// => default config. Returns the config and the path that was used (for
/// saving preferences back).
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}

/// Persist config (e.g. after a theme change). Creates the parent directory
/// when needed.
pub fn save_config(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating config directory {}", parent.display()))?;
    }
    let s = serde_json::to_string_pretty(config).context("serializing config")?;
    std::fs::write(path, s).with_context(|| format!("writing config to {}", path.display()))?;
    Ok(())
}
