//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use crate::constants::*;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Audio configuration
    pub audio: AudioConfig,

    /// UI configuration
    pub ui: UiConfig,
}

/// Audio configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Sampler tick interval in milliseconds
    pub tick_interval_ms: u64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
        }
    }
}

/// UI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// HTTP server port
    pub http_port: u16,

    /// Bind address for web server
    pub bind_address: String,

    /// Enable CORS
    pub enable_cors: bool,

    /// Static files directory (embedded assets are used when unset)
    pub static_dir: Option<PathBuf>,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            http_port: DEFAULT_HTTP_PORT,
            bind_address: "127.0.0.1".to_string(),
            enable_cors: true,
            static_dir: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from file
    pub fn load(path: &PathBuf) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(e.to_string()))?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &PathBuf) -> crate::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::Error::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get default config file path
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "audio-tools", "mic-tester")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
