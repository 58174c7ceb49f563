use crate::cache::DEFAULT_CACHE_CAPACITY;
use crate::catalog::ModelCatalog;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// Bearer credential for the OpenRouter gateway. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Blank keys are treated as absent.
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into().trim().to_string();
        if key.is_empty() { None } else { Some(Self(key)) }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Where the credential was found, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    ConfigFile,
    Environment,
}

/// Contents of `~/.multichat/config.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API key for OpenRouter; takes precedence over the environment
    pub openrouter_api_key: Option<String>,

    /// Catalog label selected at startup
    pub default_model: Option<String>,

    pub ui: UiConfig,

    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub theme: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self { theme: "light".to_string() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum memoized replies per session; 0 disables memoization
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { max_entries: DEFAULT_CACHE_CAPACITY }
    }
}

impl Config {
    /// `~/.multichat`, or `./.multichat` when no home directory is known
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".multichat")
    }

    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Load the config file at `path`. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Config::default());
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

    /// Resolve the credential: config file first, then the environment
    /// (which includes anything a `.env` file contributed at startup).
    pub fn resolve_api_key(&self) -> Result<ApiKey, ConfigError> {
        self.resolve_api_key_with(|name| std::env::var(name).ok())
            .map(|(key, _)| key)
    }

    pub fn resolve_api_key_with<F>(&self, lookup: F) -> Result<(ApiKey, KeySource), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = self.openrouter_api_key.clone().and_then(ApiKey::new) {
            tracing::info!(source = ?KeySource::ConfigFile, "API key resolved");
            return Ok((key, KeySource::ConfigFile));
        }
        if let Some(key) = lookup(API_KEY_ENV).and_then(ApiKey::new) {
            tracing::info!(source = ?KeySource::Environment, "API key resolved");
            return Ok((key, KeySource::Environment));
        }
        Err(ConfigError::MissingApiKey)
    }

    /// Label of the model selected at startup, validated against the catalog.
    pub fn startup_model(&self, catalog: &ModelCatalog) -> Result<&'static str, ConfigError> {
        match self.default_model.as_deref() {
            None => Ok(catalog.default_entry().label),
            Some(label) => catalog
                .resolve(label)
                .map(|entry| entry.label)
                .ok_or_else(|| ConfigError::UnknownModel(label.to_string())),
        }
    }

    pub fn prefers_dark(&self) -> bool {
        self.ui.theme.eq_ignore_ascii_case("dark")
    }
}
