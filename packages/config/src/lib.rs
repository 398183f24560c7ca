// ABOUTME: Client configuration for the Ayon product browser
// ABOUTME: Loads server connection, HTTP and cache settings from the environment or a TOML file

pub mod constants;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use constants::*;

const DEFAULT_SERVER_URL: &str = "http://localhost:5000";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
    #[error("Missing required setting: {0}")]
    Missing(&'static str),
    #[error("Server URL must start with http:// or https://: {0}")]
    InvalidServerUrl(String),
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config format: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// How requests authenticate against the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum Credentials {
    /// Service api key, sent as `x-api-key`
    ApiKey(String),
    /// User session token, sent as a bearer token
    Token(String),
    None,
}

impl Default for Credentials {
    fn default() -> Self {
        Credentials::None
    }
}

/// Connection and cache settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub server_url: String,
    pub project_name: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Age after which cached query results are refetched. `None` keeps
    /// them until invalidated.
    #[serde(default)]
    pub cache_stale_secs: Option<u64>,
    #[serde(default)]
    pub credentials: Credentials,
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_connect_timeout() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            project_name: String::new(),
            credentials: Credentials::None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            cache_stale_secs: None,
        }
    }
}

impl ClientConfig {
    /// Default configuration file path
    pub fn default_path() -> PathBuf {
        if let Ok(path) = env::var(AYON_CONFIG_PATH) {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ayon")
            .join("client.toml")
    }

    /// Build configuration from process environment variables
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup, applying
    /// defaults for anything unset.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        config.apply_overrides(&lookup)?;
        Ok(config)
    }

    /// Overlay environment-style overrides on top of this configuration
    pub fn apply_overrides<F>(&mut self, lookup: &F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(AYON_SERVER_URL) {
            self.server_url = url.trim_end_matches('/').to_string();
        }
        if let Some(project) = lookup(AYON_PROJECT_NAME) {
            self.project_name = project;
        }
        // An api key takes precedence over a session token
        if let Some(key) = lookup(AYON_API_KEY).filter(|k| !k.is_empty()) {
            self.credentials = Credentials::ApiKey(key);
        } else if let Some(token) = lookup(AYON_TOKEN).filter(|t| !t.is_empty()) {
            self.credentials = Credentials::Token(token);
        }
        if let Some(raw) = lookup(AYON_HTTP_REQUEST_TIMEOUT_SECS) {
            self.request_timeout_secs = parse_secs(AYON_HTTP_REQUEST_TIMEOUT_SECS, &raw)?;
        }
        if let Some(raw) = lookup(AYON_HTTP_CONNECT_TIMEOUT_SECS) {
            self.connect_timeout_secs = parse_secs(AYON_HTTP_CONNECT_TIMEOUT_SECS, &raw)?;
        }
        if let Some(raw) = lookup(AYON_CACHE_STALE_SECS) {
            self.cache_stale_secs = Some(parse_secs(AYON_CACHE_STALE_SECS, &raw)?);
        }
        Ok(())
    }

    /// Load configuration from a TOML file. A missing file yields defaults.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            debug!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load the default config file, then apply environment overrides
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load(&Self::default_path())?;
        config.apply_overrides(&|name: &str| env::var(name).ok())?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.server_url.starts_with("http://") && !self.server_url.starts_with("https://") {
            return Err(ConfigError::InvalidServerUrl(self.server_url.clone()));
        }
        if self.project_name.is_empty() {
            return Err(ConfigError::Missing(AYON_PROJECT_NAME));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                name: AYON_HTTP_REQUEST_TIMEOUT_SECS,
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn cache_stale_after(&self) -> Option<Duration> {
        self.cache_stale_secs.map(Duration::from_secs)
    }
}

fn parse_secs(name: &'static str, raw: &str) -> ConfigResult<u64> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::InvalidValue {
            name,
            value: raw.to_string(),
        })
}

/// Configuration builder
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
        }
    }

    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        self.config.server_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn project_name(mut self, project: impl Into<String>) -> Self {
        self.config.project_name = project.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.credentials = Credentials::ApiKey(key.into());
        self
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.config.credentials = Credentials::Token(token.into());
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    pub fn cache_stale_secs(mut self, secs: u64) -> Self {
        self.config.cache_stale_secs = Some(secs);
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> ConfigResult<ClientConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ClientConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
