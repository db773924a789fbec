// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration file support for heline
//!
//! Loads configuration from .helinerc.toml in current directory or ~/.config/heline/config.toml

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::snippet::{ChunkOptions, DEFAULT_LINES_PER_CHUNK, DEFAULT_MAX_CHUNKS};

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;
/// Environment variable that overrides `api_url` from the config file
pub const API_URL_ENV: &str = "HELINE_API_URL";

/// Output format for results (mirrored from cli for library use)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigOutputFormat {
    #[default]
    Text,
    Json,
}

/// `[chunk]` table
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChunkConfig {
    pub lines_per_chunk: Option<usize>,
    pub max_chunks: Option<usize>,
}

/// Configuration loaded from .helinerc.toml or ~/.config/heline/config.toml
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the search API
    pub api_url: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
    /// Quiet period before a typed query is sent
    pub debounce_ms: Option<u64>,
    /// Default output format (text or json)
    pub default_format: Option<String>,
    pub chunk: ChunkConfig,
}

impl Config {
    /// Load configuration from files
    ///
    /// Precedence (highest to lowest):
    /// 1. .helinerc.toml in current directory
    /// 2. ~/.config/heline/config.toml
    pub fn load() -> Self {
        // Try current directory first
        if let Some(config) = Self::load_from_path(&PathBuf::from(".helinerc.toml")) {
            return config;
        }

        // Try home directory config
        if let Some(home) = dirs::home_dir() {
            let config_path = home.join(".config").join("heline").join("config.toml");
            if let Some(config) = Self::load_from_path(&config_path) {
                return config;
            }
        }

        Self::default()
    }

    pub fn load_from_path(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        match toml::from_str(&content) {
            Ok(config) => {
                tracing::debug!(path = %path.display(), "loaded config");
                Some(config)
            }
            Err(e) => {
                tracing::warn!("Failed to parse {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Get output format from config, parsing the string to ConfigOutputFormat
    pub fn output_format(&self) -> Option<ConfigOutputFormat> {
        self.default_format.as_ref().and_then(|s| match s.to_lowercase().as_str() {
            "json" => Some(ConfigOutputFormat::Json),
            "text" => Some(ConfigOutputFormat::Text),
            _ => None,
        })
    }

    /// Resolve the API base URL (CLI wins, then `HELINE_API_URL`, then the file)
    pub fn merge_api_url(&self, cli_value: Option<&str>) -> String {
        let env_value = std::env::var(API_URL_ENV).ok();
        Self::resolve_api_url(cli_value, env_value.as_deref(), self.api_url.as_deref())
    }

    fn resolve_api_url(cli: Option<&str>, env: Option<&str>, file: Option<&str>) -> String {
        [cli, env, file]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|url| !url.is_empty())
            .unwrap_or(DEFAULT_API_URL)
            .trim_end_matches('/')
            .to_string()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS).max(1))
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms.unwrap_or(DEFAULT_DEBOUNCE_MS))
    }

    pub fn chunk_options(&self) -> ChunkOptions {
        ChunkOptions {
            lines_per_chunk: self
                .chunk
                .lines_per_chunk
                .unwrap_or(DEFAULT_LINES_PER_CHUNK)
                .max(1),
            max_chunks: self.chunk.max_chunks.unwrap_or(DEFAULT_MAX_CHUNKS),
            ..ChunkOptions::default()
        }
    }
}
