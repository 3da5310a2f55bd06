//! Configuration management for selfreview.
//!
//! The API credential is only ever read from the environment
//! ([`TOKEN_ENV_VAR`]). Everything else is optional and comes from a TOML
//! file stored in a platform-specific location:
//!
//! - **macOS/Linux**: `~/.config/selfreview/config.toml`
//! - **Windows**: `%APPDATA%\selfreview\config.toml`
//!
//! # Example
//!
//! ```toml
//! [github]
//! base_url = "https://github.example.com/api/v3"
//! user_agent = "selfreview-bot"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{Error, Result};

/// Environment variable holding the GitHub API token.
pub const TOKEN_ENV_VAR: &str = "GITHUB_TOKEN_MCP_APP_REVIEW";

/// Config file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Config directory name.
const CONFIG_DIR_NAME: &str = "selfreview";

// =============================================================================
// Configuration structures
// =============================================================================

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// GitHub configuration
    #[serde(default)]
    pub github: GitHubConfig,
}

/// GitHub provider configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// GitHub API base URL (for GitHub Enterprise)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// User-Agent header sent with every request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

// =============================================================================
// Config implementation
// =============================================================================

impl Config {
    /// Get the configuration directory path.
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(CONFIG_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the configuration file path.
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from a specific path.
    ///
    /// Returns a default (empty) config if the file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = ?path, "Config file does not exist, using defaults");
            return Ok(Self::default());
        }

        debug!(path = ?path, "Loading config");

        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))?;

        info!(path = ?path, "Config loaded successfully");
        Ok(config)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create config directory: {}", e)))?;
        }

        debug!(path = ?path, "Saving config");

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, contents)
            .map_err(|e| Error::Config(format!("Failed to write config file: {}", e)))?;

        info!(path = ?path, "Config saved successfully");
        Ok(())
    }

    /// Read the API token from [`TOKEN_ENV_VAR`].
    pub fn token_from_env() -> Result<String> {
        Self::validate_token(std::env::var(TOKEN_ENV_VAR).ok())
    }

    /// Validate a token value; missing or blank tokens are a configuration error.
    pub fn validate_token(value: Option<String>) -> Result<String> {
        match value.map(|v| v.trim().to_string()) {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(Error::Config(format!(
                "{} environment variable is required",
                TOKEN_ENV_VAR
            ))),
        }
    }

    /// Set a configuration value by key path.
    ///
    /// Key format: `github.field` (e.g., `github.base_url`)
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let field = Self::github_field(key)?;
        let value = Some(value.to_string());

        match field {
            "base_url" => self.github.base_url = value,
            "user_agent" => self.github.user_agent = value,
            _ => {
                return Err(Error::Config(format!(
                    "Unknown GitHub config field: {}",
                    field
                )))
            }
        }

        Ok(())
    }

    /// Get a configuration value by key path.
    ///
    /// Key format: `github.field` (e.g., `github.base_url`)
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        match Self::github_field(key)? {
            "base_url" => Ok(self.github.base_url.clone()),
            "user_agent" => Ok(self.github.user_agent.clone()),
            field => Err(Error::Config(format!(
                "Unknown GitHub config field: {}",
                field
            ))),
        }
    }

    fn github_field(key: &str) -> Result<&str> {
        let parts: Vec<&str> = key.split('.').collect();
        if parts.len() != 2 {
            return Err(Error::Config(format!(
                "Invalid config key '{}'. Expected format: provider.field",
                key
            )));
        }

        match parts[0] {
            "github" => Ok(parts[1]),
            provider => Err(Error::Config(format!("Unknown provider: {}", provider))),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
