/// Client configuration loader - parses cityair.toml or the environment
///
/// Keeps the access token and endpoint settings out of code. Two sources:
///
/// - a TOML file with a `[cityair]` table (`load_config`)
/// - environment variables, with `.env` loaded first (`ClientConfig::from_env`):
///   `CITYAIR_TOKEN` (required), `CITYAIR_BASE_URL`, `CITYAIR_TIMEOUT`

use serde::Deserialize;
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::transport::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};

pub const ENV_TOKEN: &str = "CITYAIR_TOKEN";
pub const ENV_BASE_URL: &str = "CITYAIR_BASE_URL";
pub const ENV_TIMEOUT: &str = "CITYAIR_TIMEOUT";

/// Settings needed to build a `CityAirClient`.
#[derive(Clone, PartialEq, Deserialize)]
pub struct ClientConfig {
    pub token: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in whole seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

// The token never shows up in logs or panic messages.
impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("token", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("access token is missing (set {} or `token` in the config file)", ENV_TOKEN)]
    MissingToken,

    #[error("invalid timeout {0:?}: expected whole seconds")]
    InvalidTimeout(String),
}

/// Root of the TOML file.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    cityair: ClientConfig,
}

impl ClientConfig {
    /// Default endpoint and timeout with the given token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Reads the configuration from the process environment, after loading
    /// `.env` from the working directory if one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; `from_env` uses the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup(ENV_TOKEN)
            .filter(|t| !t.trim().is_empty())
            .ok_or(ConfigError::MissingToken)?;

        let mut config = Self::new(token);

        if let Some(base_url) = lookup(ENV_BASE_URL).filter(|u| !u.is_empty()) {
            config.base_url = base_url;
        }

        if let Some(raw) = lookup(ENV_TIMEOUT) {
            config.timeout_secs = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidTimeout(raw.clone()))?;
        }

        Ok(config)
    }
}

/// Loads the `[cityair]` table from a TOML file.
pub fn load_config(path: impl AsRef<Path>) -> Result<ClientConfig, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&contents)
}

/// Parses the contents of a config file.
pub fn parse_config(contents: &str) -> Result<ClientConfig, ConfigError> {
    let file: ConfigFile = toml::from_str(contents)?;
    if file.cityair.token.trim().is_empty() {
        return Err(ConfigError::MissingToken);
    }
    Ok(file.cityair)
}
