use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Server used when nothing else is configured
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000";
/// Environment variable overriding the server URL
pub const SERVER_URL_ENV: &str = "STREAK_API_BASE";

/// Server configuration stored locally
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub server_url: String,
    pub last_updated: chrono::DateTime<chrono::Utc>,
}

/// Owns the data directory (`~/.streak` unless overridden) and the files in it
/// that are not key/value blobs.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: PathBuf,
}

impl ConfigManager {
    /// Uses `dir` when given, `~/.streak` otherwise. The directory is created on demand.
    pub fn new(dir: Option<PathBuf>) -> Result<Self> {
        let config_dir = match dir {
            Some(dir) => dir,
            None => Self::default_config_dir()?,
        };

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create {}", config_dir.display()))?;
        }

        Ok(Self { config_dir })
    }

    fn default_config_dir() -> Result<PathBuf> {
        let home_dir = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home_dir.join(".streak"))
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    fn server_config_file(&self) -> PathBuf {
        self.config_dir.join("server_config.json")
    }

    pub fn save_server_config(&self, config: &ServerConfig) -> Result<()> {
        let json = serde_json::to_string_pretty(config).context("Failed to serialize server config")?;
        fs::write(self.server_config_file(), json).context("Failed to write server config file")?;
        Ok(())
    }

    pub fn load_server_config(&self) -> Result<Option<ServerConfig>> {
        let config_file = self.server_config_file();
        if !config_file.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&config_file).context("Failed to read server config file")?;
        let config = serde_json::from_str(&json).context("Failed to parse server config")?;
        Ok(Some(config))
    }

    /// Determine the server URL to use based on priority:
    /// 1. CLI argument
    /// 2. `STREAK_API_BASE` environment variable
    /// 3. Saved configuration file
    /// 4. [`DEFAULT_SERVER_URL`]
    ///
    /// clap already folds the environment into the CLI value, so `env_value`
    /// only matters for callers that bypass the argument parser.
    pub fn determine_server_url(&self, cli_override: Option<String>, env_value: Option<String>) -> Result<String> {
        if let Some(url) = cli_override.filter(|u| !u.trim().is_empty()) {
            return Ok(url);
        }
        if let Some(url) = env_value.filter(|u| !u.trim().is_empty()) {
            return Ok(url);
        }
        if let Some(config) = self.load_server_config()? {
            return Ok(config.server_url);
        }
        Ok(DEFAULT_SERVER_URL.to_string())
    }

    pub fn save_server_url(&self, server_url: String) -> Result<()> {
        let config = ServerConfig {
            server_url,
            last_updated: chrono::Utc::now(),
        };
        self.save_server_config(&config)
    }
}
