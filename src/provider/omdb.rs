//! OMDb provider implementation

use super::models::{DetailRecord, SearchPage, SearchQuery, SearchResultItem};
use super::traits::*;
use crate::config::{ConfigError, PlotLength, ProviderSettings};
use crate::network::HttpClient;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

/// Status envelope shared by every OMDb response
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Error")]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchBody {
    #[serde(rename = "Search", default)]
    search: Vec<SearchResultItem>,
    #[serde(rename = "totalResults")]
    total_results: Option<String>,
}

/// OMDb search and detail lookups
pub struct Omdb {
    client: HttpClient,
    base_url: String,
    api_key: String,
    plot: PlotLength,
}

impl Omdb {
    pub fn new(client: HttpClient, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            plot: PlotLength::default(),
        }
    }

    /// Build from settings; a missing API key is a configuration error
    pub fn from_settings(settings: &ProviderSettings, client: HttpClient) -> Result<Self, ConfigError> {
        let api_key = settings.api_key()?;
        Ok(Self::new(client, &settings.base_url, api_key).with_plot(settings.plot))
    }

    pub fn with_plot(mut self, plot: PlotLength) -> Self {
        self.plot = plot;
        self
    }

    /// Build the search request for a query
    pub fn search_request(&self, query: &SearchQuery) -> ProviderRequest {
        ProviderRequest::get(&self.base_url)
            .param("apikey", &self.api_key)
            .param("s", &query.term)
            .param("page", query.page.to_string())
    }

    /// Build the detail request for an id
    pub fn detail_request(&self, id: &str) -> ProviderRequest {
        ProviderRequest::get(&self.base_url)
            .param("apikey", &self.api_key)
            .param("i", id)
            .param("plot", self.plot.as_str())
    }

    /// Parse a search response into a page
    pub fn parse_search(&self, response: ProviderResponse) -> Result<SearchPage, ProviderError> {
        let body: SearchBody = Self::unwrap_envelope(&response)?;

        let total_results = body
            .total_results
            .as_deref()
            .and_then(|t| t.trim().parse::<u64>().ok());

        Ok(SearchPage {
            items: body.search,
            total_results,
        })
    }

    /// Parse a detail response into a record
    pub fn parse_detail(&self, response: ProviderResponse) -> Result<DetailRecord, ProviderError> {
        Self::unwrap_envelope(&response)
    }

    /// Check `Response`, then decode the payload.
    ///
    /// OMDb reports failures such as an invalid key with a non-2xx status and a
    /// regular envelope, so the envelope is consulted before the status code.
    fn unwrap_envelope<T: DeserializeOwned>(response: &ProviderResponse) -> Result<T, ProviderError> {
        let envelope: Envelope = match response.json() {
            Ok(envelope) => envelope,
            Err(_) if !response.is_success() => {
                return Err(ProviderError::Transport(format!(
                    "HTTP error: {}",
                    response.status
                )));
            }
            Err(e) => return Err(e),
        };

        if envelope.response != "True" {
            let message = envelope
                .error
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| NO_RESULTS_MESSAGE.to_string());
            return Err(ProviderError::Provider(message));
        }

        if !response.is_success() {
            return Err(ProviderError::Transport(format!(
                "HTTP error: {}",
                response.status
            )));
        }

        response.json()
    }
}

#[async_trait]
impl MovieProvider for Omdb {
    fn name(&self) -> &str {
        "omdb"
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchPage, ProviderError> {
        debug!("omdb search '{}' page {}", query.term, query.page);
        let response = self.client.execute(self.search_request(query)).await?;
        self.parse_search(response)
    }

    async fn detail(&self, id: &str) -> Result<DetailRecord, ProviderError> {
        debug!("omdb detail {}", id);
        let response = self.client.execute(self.detail_request(id)).await?;
        self.parse_detail(response)
    }
}
