//! Configuration management for siteprospector
//!
//! Configuration is read from `./config/siteprospector.toml` (or a path
//! given with `--config`). A missing file falls back to built-in defaults;
//! the template in `config/siteprospector.toml` mirrors those defaults.
//! The places API key is resolved from the environment first so it never
//! has to live in a checked-in file.

use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Configuration file path relative to working directory
pub const CONFIG_PATH: &str = "./config/siteprospector.toml";

/// Default configuration file content
pub const DEFAULT_CONFIG: &str = include_str!("../config/siteprospector.toml");

/// Environment variable carrying the places API key
pub const API_KEY_ENV: &str = "GOOGLE_PLACES_API_KEY";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found at {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] io::Error),

    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid URL in '{field}': {url}")]
    InvalidUrl { field: String, url: String },

    #[error("Configuration field '{field}' cannot be empty")]
    EmptyRequired { field: String },

    #[error("Configuration field '{field}' is {value}, must be between 1 and {max}")]
    OutOfRange { field: String, value: usize, max: usize },
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub places: PlacesConfig,
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Per-candidate timeout for domain existence probes
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,
    /// Timeout for registry and places API requests
    #[serde(default = "default_api_timeout_secs")]
    pub api_timeout_secs: u64,
}

/// Batch processing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BatchConfig {
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
}

/// Company registry API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    #[serde(default = "default_registry_base_url")]
    pub base_url: String,
}

/// Places API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PlacesConfig {
    #[serde(default = "default_places_base_url")]
    pub base_url: String,
    /// Fallback when the environment variable is not set
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (compatible; SiteProspector/1.0)".to_string()
}

fn default_probe_timeout_secs() -> u64 {
    5
}

fn default_api_timeout_secs() -> u64 {
    10
}

fn default_max_workers() -> usize {
    crate::batch::DEFAULT_WORKERS
}

fn default_registry_base_url() -> String {
    crate::registry::DEFAULT_BASE_URL.to_string()
}

fn default_places_base_url() -> String {
    crate::places::DEFAULT_BASE_URL.to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            probe_timeout_secs: default_probe_timeout_secs(),
            api_timeout_secs: default_api_timeout_secs(),
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_workers: default_max_workers(),
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: default_registry_base_url(),
        }
    }
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            base_url: default_places_base_url(),
            api_key: None,
        }
    }
}

impl HttpConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api_timeout_secs)
    }
}

impl PlacesConfig {
    /// Resolve the places API key: environment first, then the config file.
    /// `None` means enrichment runs without the places source.
    pub fn resolve_api_key(&self) -> Option<String> {
        env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| {
                self.api_key
                    .clone()
                    .filter(|key| !key.trim().is_empty())
            })
    }
}

impl AppConfig {
    /// Load configuration: an explicit path must exist, the default path is
    /// optional and falls back to built-in defaults when absent.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load_from_path(path),
            None => {
                let path = Path::new(CONFIG_PATH);
                if path.exists() {
                    Self::load_from_path(path)
                } else {
                    let config = Self::default();
                    config.validate()?;
                    Ok(config)
                }
            }
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.user_agent.is_empty() {
            return Err(ConfigError::EmptyRequired {
                field: "http.user_agent".to_string(),
            });
        }
        if self.http.probe_timeout_secs == 0 {
            return Err(ConfigError::EmptyRequired {
                field: "http.probe_timeout_secs".to_string(),
            });
        }
        if self.http.api_timeout_secs == 0 {
            return Err(ConfigError::EmptyRequired {
                field: "http.api_timeout_secs".to_string(),
            });
        }

        if self.batch.max_workers == 0 || self.batch.max_workers > crate::cli::MAX_WORKERS {
            return Err(ConfigError::OutOfRange {
                field: "batch.max_workers".to_string(),
                value: self.batch.max_workers,
                max: crate::cli::MAX_WORKERS,
            });
        }

        for (field, url) in [
            ("registry.base_url", &self.registry.base_url),
            ("places.base_url", &self.places.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::InvalidUrl {
                    field: field.to_string(),
                    url: url.clone(),
                });
            }
        }

        Ok(())
    }

    /// Write the default configuration template to `path`.
    pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = fs::File::create(path)?;
        file.write_all(DEFAULT_CONFIG.as_bytes())?;
        Ok(())
    }

    /// Create the default configuration file at the standard location
    pub fn create_default_config() -> Result<PathBuf, ConfigError> {
        let path = Path::new(CONFIG_PATH);
        Self::write_default_config(path)?;
        Ok(path.to_path_buf())
    }
}
