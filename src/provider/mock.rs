//! Scripted provider for tests

use super::models::{DetailRecord, SearchPage, SearchQuery};
use super::traits::{MovieProvider, ProviderError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Provider answering from scripted pages and details.
///
/// Every call yields once before answering so callers observe the in-flight
/// state. Unscripted pages come back empty; unscripted details fail.
#[derive(Default)]
pub struct MockProvider {
    pages: Mutex<HashMap<(String, u32), Result<SearchPage, ProviderError>>>,
    details: Mutex<HashMap<String, Result<DetailRecord, ProviderError>>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    search_calls: AtomicUsize,
    detail_calls: AtomicUsize,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, term: &str, page: u32, result: SearchPage) -> Self {
        self.pages
            .lock()
            .unwrap()
            .insert((term.to_string(), page), Ok(result));
        self
    }

    pub fn with_page_error(self, term: &str, page: u32, error: ProviderError) -> Self {
        self.pages
            .lock()
            .unwrap()
            .insert((term.to_string(), page), Err(error));
        self
    }

    pub fn with_detail(self, record: DetailRecord) -> Self {
        self.details
            .lock()
            .unwrap()
            .insert(record.id.clone(), Ok(record));
        self
    }

    pub fn with_detail_error(self, id: &str, error: ProviderError) -> Self {
        self.details
            .lock()
            .unwrap()
            .insert(id.to_string(), Err(error));
        self
    }

    /// Hold searches for `term` until the returned handle is notified
    pub fn gate(&self, term: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates
            .lock()
            .unwrap()
            .insert(term.to_string(), gate.clone());
        gate
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MovieProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchPage, ProviderError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;

        let gate = self.gates.lock().unwrap().get(&query.term).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        self.pages
            .lock()
            .unwrap()
            .get(&(query.term.clone(), query.page))
            .cloned()
            .unwrap_or_else(|| Ok(SearchPage::default()))
    }

    async fn detail(&self, id: &str) -> Result<DetailRecord, ProviderError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;

        self.details
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .unwrap_or_else(|| Err(ProviderError::Provider("Incorrect IMDb ID.".to_string())))
    }
}
