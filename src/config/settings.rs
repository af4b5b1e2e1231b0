//! Settings structures for movie-search configuration

use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Environment variable carrying the provider API key
pub const API_KEY_ENV: &str = "OMDB_API_KEY";

/// Errors raised while loading or validating settings
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No API key configured and none in the environment
    #[error("missing API key: set OMDB_API_KEY or provider.api_key")]
    MissingApiKey,

    /// Provider base URL does not parse
    #[error("invalid provider base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// A retained window of zero items would discard every result
    #[error("aggregator.retain_window must be at least 1")]
    InvalidWindow,

    /// A zero capacity or TTL would keep no detail records
    #[error("aggregator.detail_cache_capacity and detail_cache_ttl must be at least 1")]
    InvalidDetailCache,

    #[error("outgoing.request_timeout must be a positive number of seconds, got {0}")]
    InvalidTimeout(f64),

    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse settings: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Main settings structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub provider: ProviderSettings,
    pub aggregator: AggregatorSettings,
    pub server: ServerSettings,
    pub outgoing: OutgoingSettings,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse settings from a YAML document
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Merge with environment variables
    pub fn merge_env(&mut self) {
        self.merge_vars(|key| std::env::var(key).ok());
    }

    /// Merge overrides from an arbitrary variable lookup
    pub fn merge_vars<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // General settings
        if let Some(val) = lookup("MOVIE_SEARCH_DEBUG") {
            self.general.debug = val.parse().unwrap_or(false);
        }

        // Server settings
        if let Some(val) = lookup("MOVIE_SEARCH_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Some(val) = lookup("MOVIE_SEARCH_BIND_ADDRESS") {
            self.server.bind_address = val;
        }

        // Provider settings; a blank key does not override the file
        if let Some(val) = lookup(API_KEY_ENV) {
            if !val.trim().is_empty() {
                self.provider.api_key = Some(val);
            }
        }
        if let Some(val) = lookup("OMDB_BASE_URL") {
            self.provider.base_url = val;
        }
    }

    /// Check values that serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Provider base URL
        Url::parse(&self.provider.base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: self.provider.base_url.clone(),
            reason: e.to_string(),
        })?;

        // Aggregator window and detail cache
        if self.aggregator.retain_window == Some(0) {
            return Err(ConfigError::InvalidWindow);
        }
        if self.aggregator.detail_cache_capacity == 0 || self.aggregator.detail_cache_ttl == 0 {
            return Err(ConfigError::InvalidDetailCache);
        }

        // Outgoing request timeout
        let timeout = self.outgoing.request_timeout;
        if !timeout.is_finite() || timeout <= 0.0 {
            return Err(ConfigError::InvalidTimeout(timeout));
        }

        Ok(())
    }
}

/// General settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Enable debug logging
    pub debug: bool,
    /// Instance name reported by the health endpoint
    pub instance_name: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            debug: false,
            instance_name: "movie-search".to_string(),
        }
    }
}

/// Length of the plot text requested from the detail endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlotLength {
    #[default]
    Short,
    Full,
}

impl PlotLength {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlotLength::Short => "short",
            PlotLength::Full => "full",
        }
    }
}

/// Remote metadata provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Base URL of the keyed-lookup API
    pub base_url: String,
    /// API key; `OMDB_API_KEY` takes precedence
    pub api_key: Option<String>,
    /// Plot length for detail lookups
    pub plot: PlotLength,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: "https://www.omdbapi.com/".to_string(),
            api_key: None,
            plot: PlotLength::default(),
        }
    }
}

impl ProviderSettings {
    /// Resolve the API key, failing loudly when absent
    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)
    }
}

/// When detail records are fetched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailStrategy {
    /// Fetch every item's detail as part of the page fetch
    Eager,
    /// Fetch a single item's detail when it is expanded
    #[default]
    Lazy,
}

/// Result aggregation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorSettings {
    /// Detail enrichment strategy
    pub detail_strategy: DetailStrategy,
    /// Keep only the most recent N items after each merge (none = unbounded)
    pub retain_window: Option<usize>,
    /// Maximum number of memoized detail records
    pub detail_cache_capacity: u64,
    /// Lifetime of a memoized detail record in seconds
    pub detail_cache_ttl: u64,
}

impl Default for AggregatorSettings {
    fn default() -> Self {
        Self {
            detail_strategy: DetailStrategy::default(),
            retain_window: None,
            detail_cache_capacity: 1000,
            detail_cache_ttl: 3600,
        }
    }
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Server port
    pub port: u16,
    /// Bind address
    pub bind_address: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: 3000,
            bind_address: "127.0.0.1".to_string(),
        }
    }
}

/// Outgoing request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutgoingSettings {
    /// Default request timeout in seconds
    pub request_timeout: f64,
    /// Pool max idle connections per host
    pub pool_maxsize: usize,
    /// Verify SSL certificates
    pub verify_ssl: bool,
    /// Proxy settings
    pub proxies: ProxySettings,
}

impl Default for OutgoingSettings {
    fn default() -> Self {
        Self {
            request_timeout: crate::DEFAULT_TIMEOUT as f64,
            pool_maxsize: 20,
            verify_ssl: true,
            proxies: ProxySettings::default(),
        }
    }
}

/// Proxy settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    pub http: Option<String>,
    pub https: Option<String>,
    pub all: Option<String>,
}
