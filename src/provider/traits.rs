//! Provider traits and types

use super::models::{DetailRecord, SearchPage, SearchQuery};
use async_trait::async_trait;

/// Message shown for any transport-level failure
pub const TRANSPORT_ERROR_MESSAGE: &str = "Failed to fetch movies.";

/// Fallback when the provider reports failure without a message
pub const NO_RESULTS_MESSAGE: &str = "No movies found.";

/// Failure of a provider call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// Well-formed response with `Response=False`; message is user-facing
    #[error("{0}")]
    Provider(String),

    /// Network, HTTP or parse failure; the cause is not user-facing
    #[error("transport error: {0}")]
    Transport(String),
}

impl ProviderError {
    /// Text safe to show to the user
    pub fn user_message(&self) -> &str {
        match self {
            ProviderError::Provider(message) => message,
            ProviderError::Transport(_) => TRANSPORT_ERROR_MESSAGE,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ProviderError::Transport(_))
    }
}

impl From<anyhow::Error> for ProviderError {
    fn from(err: anyhow::Error) -> Self {
        ProviderError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::Transport(format!("invalid JSON: {}", err))
    }
}

/// HTTP GET request to be made against the provider
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    /// URL to request
    pub url: String,
    /// Query parameters, in order
    pub params: Vec<(String, String)>,
}

impl ProviderRequest {
    /// Create a GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            params: Vec::new(),
        }
    }

    /// Add a query parameter
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Look up a query parameter
    pub fn get_param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// HTTP response from a provider request
#[derive(Debug)]
pub struct ProviderResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub text: String,
}

impl ProviderResponse {
    /// Parse response as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, ProviderError> {
        Ok(serde_json::from_str(&self.text)?)
    }

    /// Check if response is successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// External keyed-lookup API for search and detail records
#[async_trait]
pub trait MovieProvider: Send + Sync {
    /// Provider name
    fn name(&self) -> &str;

    /// Fetch one page of search results
    async fn search(&self, query: &SearchQuery) -> Result<SearchPage, ProviderError>;

    /// Fetch the detail record for a single item
    async fn detail(&self, id: &str) -> Result<DetailRecord, ProviderError>;
}
