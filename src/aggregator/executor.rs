//! Result aggregation over a movie provider

use super::detail::DetailCache;
use super::state::{Action, AggregateState, RequestTicket, Transition, EMPTY_TERM_MESSAGE};
use crate::config::{AggregatorSettings, DetailStrategy};
use crate::provider::{DetailRecord, MovieProvider, ProviderError, SearchQuery};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// What a page operation ended up doing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// A non-empty page was merged
    Loaded { page: u32, count: usize },
    /// The page came back empty; no more pages will be requested
    Exhausted,
    /// The fetch failed; the message is now in `error`
    Failed(String),
    /// A newer search started while this fetch was in flight
    Stale,
    /// Already loading, nothing more to fetch, or no active search
    Skipped,
    /// Empty search term; nothing was requested
    Rejected,
}

/// Owns the paginated result state for one search session.
///
/// All operations take `&self` and can be driven concurrently from one task.
/// The state lock is only held while reducing, never across an `.await`.
pub struct ResultAggregator {
    provider: Arc<dyn MovieProvider>,
    state: Mutex<AggregateState>,
    details: DetailCache,
    strategy: DetailStrategy,
}

impl ResultAggregator {
    /// Create an aggregator from settings
    pub fn new(provider: Arc<dyn MovieProvider>, settings: &AggregatorSettings) -> Self {
        Self {
            provider,
            state: Mutex::new(AggregateState::new(settings.retain_window)),
            details: DetailCache::new(settings.detail_cache_ttl, settings.detail_cache_capacity),
            strategy: settings.detail_strategy,
        }
    }

    /// Detail enrichment strategy in use
    pub fn strategy(&self) -> DetailStrategy {
        self.strategy
    }

    /// Snapshot of the current state
    pub fn state(&self) -> AggregateState {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, AggregateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn dispatch(&self, action: Action) -> Transition {
        self.lock().reduce(action)
    }

    fn is_current(&self, ticket: RequestTicket) -> bool {
        self.lock().pending() == Some(ticket)
    }

    /// Reset and load the first page for `term`.
    ///
    /// An empty term only sets `error`; the previous results stay in place.
    pub async fn start_search(&self, term: &str) -> PageOutcome {
        let term = term.trim();
        if term.is_empty() {
            self.dispatch(Action::Rejected {
                message: EMPTY_TERM_MESSAGE.to_string(),
            });
            return PageOutcome::Rejected;
        }

        info!("Starting search '{}'", term);
        self.dispatch(Action::SearchStarted {
            term: term.to_string(),
        });
        self.fetch_page(1).await
    }

    /// Fetch page `page` of the current search
    pub async fn fetch_page(&self, page: u32) -> PageOutcome {
        let (ticket, term) = {
            let mut state = self.lock();
            match state.reduce(Action::PageRequested { page }) {
                Transition::Started(ticket) => (ticket, state.term.clone()),
                _ => return PageOutcome::Skipped,
            }
        };

        let query = SearchQuery::new(term, page);
        let (action, outcome) = match self.provider.search(&query).await {
            Ok(results) if results.is_empty() => {
                debug!("'{}' page {} is empty", query.term, page);
                let action = Action::PageLoaded {
                    ticket,
                    page: results,
                    details: Vec::new(),
                };
                (action, PageOutcome::Exhausted)
            }
            Ok(results) => {
                let count = results.items.len();
                let details = match self.strategy {
                    DetailStrategy::Eager if self.is_current(ticket) => {
                        self.details
                            .get_or_fetch_all(self.provider.as_ref(), &results.items)
                            .await
                    }
                    _ => Vec::new(),
                };
                let action = Action::PageLoaded {
                    ticket,
                    page: results,
                    details,
                };
                (action, PageOutcome::Loaded { page, count })
            }
            Err(e) => {
                if e.is_transport() {
                    warn!("Search '{}' page {} failed: {}", query.term, page, e);
                } else {
                    debug!("Provider rejected '{}' page {}: {}", query.term, page, e);
                }
                let message = e.user_message().to_string();
                let action = Action::PageFailed {
                    ticket,
                    message: message.clone(),
                };
                (action, PageOutcome::Failed(message))
            }
        };

        match self.dispatch(action) {
            Transition::Stale => {
                debug!("Discarding stale response for '{}' page {}", query.term, page);
                PageOutcome::Stale
            }
            _ => outcome,
        }
    }

    /// Fetch the next page unless loading or exhausted
    pub async fn request_more(&self) -> PageOutcome {
        let next = self.lock().next_page();
        match next {
            Some(page) => self.fetch_page(page).await,
            None => PageOutcome::Skipped,
        }
    }

    /// Detail record for `id`, fetched at most once
    pub async fn fetch_detail(&self, id: &str) -> Result<DetailRecord, ProviderError> {
        let record = self
            .details
            .get_or_fetch(self.provider.as_ref(), id)
            .await
            .map_err(|e| {
                warn!("Detail lookup failed for {}: {}", id, e);
                e
            })?;

        self.dispatch(Action::DetailLoaded {
            record: record.clone(),
        });
        Ok(record)
    }

    /// Flip the expanded flag; returns whether the item is now expanded
    pub fn toggle_expanded(&self, id: &str) -> bool {
        let mut state = self.lock();
        state.reduce(Action::ToggleExpanded { id: id.to_string() });
        state.is_expanded(id)
    }

    /// Expand an item and return its detail record.
    ///
    /// Returns `Ok(None)` for ids not in the current results. In the lazy
    /// strategy the first expansion triggers the lookup; in the eager strategy
    /// the record is normally present already.
    pub async fn expand(&self, id: &str) -> Result<Option<DetailRecord>, ProviderError> {
        let known = {
            let mut state = self.lock();
            if !state.contains(id) {
                return Ok(None);
            }
            if !state.is_expanded(id) {
                state.reduce(Action::ToggleExpanded { id: id.to_string() });
            }
            state.details.get(id).cloned()
        };

        match known {
            Some(record) => Ok(Some(record)),
            None => self.fetch_detail(id).await.map(Some),
        }
    }

    /// Collapse an item
    pub fn collapse(&self, id: &str) {
        let mut state = self.lock();
        if state.is_expanded(id) {
            state.reduce(Action::ToggleExpanded { id: id.to_string() });
        }
    }
}
