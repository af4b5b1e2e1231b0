//! Application state shared across handlers

use crate::config::Settings;
use crate::network::HttpClient;
use crate::provider::{MovieProvider, Omdb};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Global settings
    pub settings: Arc<Settings>,
    /// Metadata provider the proxy forwards to
    pub provider: Arc<dyn MovieProvider>,
}

impl AppState {
    /// Create state backed by the OMDb provider; fails without an API key
    pub fn new(settings: Settings, client: HttpClient) -> anyhow::Result<Self> {
        let provider = Omdb::from_settings(&settings.provider, client)?;
        Ok(Self::with_provider(settings, Arc::new(provider)))
    }

    /// Create state around an existing provider
    pub fn with_provider(settings: Settings, provider: Arc<dyn MovieProvider>) -> Self {
        Self {
            settings: Arc::new(settings),
            provider,
        }
    }

    /// Get instance name
    pub fn instance_name(&self) -> &str {
        &self.settings.general.instance_name
    }
}
