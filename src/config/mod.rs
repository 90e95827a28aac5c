// Configuration management for the dashboard
// Secrets come from the environment (.env is honored), tuning from an optional TOML file

use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8888/callback";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("CLIENT_ID is not set - add it to your environment or .env file")]
    MissingClientId,

    #[error("could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub spotify: SpotifyConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub client_secret: Option<String>,
    pub redirect_uri: String,
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub art_width: u32,
    pub tick_ms: u64,
    pub backoff_ms: u64,
    pub settle_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            art_width: crate::art::ART_WIDTH,
            tick_ms: 500,
            backoff_ms: 2000,
            settle_ms: 200,
        }
    }
}

impl UiConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    /// Read the TOML tuning file; a missing file means defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl SpotifyConfig {
    /// Build from any key lookup. Plain names win over the `SPOTIPY_` spellings.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .or_else(|| lookup(format!("SPOTIPY_{}", name).as_str()))
                .filter(|value| !value.trim().is_empty())
        };

        Ok(Self {
            client_id: get("CLIENT_ID").ok_or(ConfigError::MissingClientId)?,
            client_secret: get("CLIENT_SECRET"),
            redirect_uri: get("REDIRECT_URI").unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string()),
            refresh_token: get("REFRESH_TOKEN"),
        })
    }
}

impl Config {
    /// Load `.env`, read the environment and the tuning file.
    pub fn load(ui_path: Option<&Path>) -> Result<Self, ConfigError> {
        // A missing .env is fine, plain environment variables work too
        dotenv::dotenv().ok();

        let spotify = SpotifyConfig::from_lookup(|key| env::var(key).ok())?;
        let ui = match ui_path {
            Some(path) => UiConfig::load(path)?,
            None => match Self::config_path() {
                Some(path) => UiConfig::load(&path)?,
                None => UiConfig::default(),
            },
        };

        Ok(Self { spotify, ui })
    }

    pub fn config_path() -> Option<PathBuf> {
        config_dir().map(|dir| dir.join("nowplaying-ascii").join("config.toml"))
    }
}
