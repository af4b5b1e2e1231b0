//! Aggregate state and its reducer
//!
//! Every mutation goes through [`AggregateState::reduce`]. Page fetches are
//! tagged with a [`RequestTicket`]; a completion whose ticket is no longer the
//! pending one is rejected without touching state.

use crate::provider::{DetailRecord, SearchPage, SearchResultItem};
use std::collections::{HashMap, HashSet};

/// Message set when a search is started without a term
pub const EMPTY_TERM_MESSAGE: &str = "Please enter a search term.";

/// Tag of an in-flight page fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestTicket {
    pub generation: u64,
    pub page: u32,
}

/// Inputs to the reducer
#[derive(Debug, Clone)]
pub enum Action {
    /// Empty term submitted; no request is issued
    Rejected { message: String },
    /// New search: clears results and bumps the generation
    SearchStarted { term: String },
    /// A page fetch is about to be issued
    PageRequested { page: u32 },
    /// A page fetch completed; details are present in the eager strategy
    PageLoaded {
        ticket: RequestTicket,
        page: SearchPage,
        details: Vec<DetailRecord>,
    },
    /// A page fetch failed with a user-facing message
    PageFailed { ticket: RequestTicket, message: String },
    /// A lazily fetched detail record arrived
    DetailLoaded { record: DetailRecord },
    /// Flip the expanded flag of an item
    ToggleExpanded { id: String },
}

/// What the reducer did with an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// A page fetch may proceed under this ticket
    Started(RequestTicket),
    /// State changed
    Applied,
    /// Guard prevented the action (already loading, nothing more to fetch)
    Skipped,
    /// Completion for a request that is no longer current
    Stale,
}

/// Paginated result state owned by one aggregator
#[derive(Debug, Clone, Default)]
pub struct AggregateState {
    /// Current search term
    pub term: String,
    /// Results, unique by id, in fetch order
    pub items: Vec<SearchResultItem>,
    /// A page fetch is in flight
    pub loading: bool,
    /// Last user-facing error
    pub error: Option<String>,
    /// Highest page merged so far (0 before the first page lands)
    pub page: u32,
    /// More pages may exist
    pub has_more: bool,
    /// Detail records by item id
    pub details: HashMap<String, DetailRecord>,
    /// Ids of expanded items
    pub expanded: HashSet<String>,
    generation: u64,
    pending: Option<RequestTicket>,
    received: u64,
    window: Option<usize>,
}

impl AggregateState {
    /// Create an idle state; `window` caps retained items
    pub fn new(window: Option<usize>) -> Self {
        Self {
            window,
            ..Default::default()
        }
    }

    /// Generation of the current search
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Ticket of the in-flight page fetch
    pub fn pending(&self) -> Option<RequestTicket> {
        self.pending
    }

    /// A search term is active
    pub fn is_active(&self) -> bool {
        !self.term.is_empty()
    }

    /// Next page `request_more` would fetch, if allowed
    pub fn next_page(&self) -> Option<u32> {
        (!self.loading && self.has_more && self.is_active()).then_some(self.page + 1)
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|item| item.id == id)
    }

    /// Items paired with their detail record, if any
    pub fn entries(&self) -> impl Iterator<Item = (&SearchResultItem, Option<&DetailRecord>)> + '_ {
        self.items
            .iter()
            .map(move |item| (item, self.details.get(&item.id)))
    }

    /// Single mutation entry point
    pub fn reduce(&mut self, action: Action) -> Transition {
        match action {
            Action::Rejected { message } => {
                self.error = Some(message);
                Transition::Applied
            }
            Action::SearchStarted { term } => {
                self.generation += 1;
                self.term = term;
                self.items.clear();
                self.details.clear();
                self.expanded.clear();
                self.page = 0;
                self.received = 0;
                self.has_more = true;
                self.error = None;
                self.loading = false;
                self.pending = None;
                Transition::Applied
            }
            Action::PageRequested { page } => {
                if self.loading || !self.is_active() || page == 0 {
                    return Transition::Skipped;
                }
                if page > 1 && !self.has_more {
                    return Transition::Skipped;
                }
                let ticket = RequestTicket {
                    generation: self.generation,
                    page,
                };
                self.loading = true;
                self.error = None;
                self.pending = Some(ticket);
                Transition::Started(ticket)
            }
            Action::PageLoaded {
                ticket,
                page,
                details,
            } => {
                if !self.accepts(ticket) {
                    return Transition::Stale;
                }
                self.finish();

                if page.is_empty() {
                    self.has_more = false;
                    return Transition::Applied;
                }

                if ticket.page == 1 {
                    self.items.clear();
                    self.details.clear();
                    self.expanded.clear();
                    self.received = 0;
                }
                self.received += page.items.len() as u64;
                self.merge(page.items);
                for record in details {
                    if self.contains(&record.id) {
                        self.details.insert(record.id.clone(), record);
                    }
                }
                self.page = ticket.page;

                if let Some(total) = page.total_results {
                    if self.received >= total {
                        self.has_more = false;
                    }
                }
                Transition::Applied
            }
            Action::PageFailed { ticket, message } => {
                if !self.accepts(ticket) {
                    return Transition::Stale;
                }
                self.finish();
                self.error = Some(message);
                Transition::Applied
            }
            Action::DetailLoaded { record } => {
                if !self.contains(&record.id) {
                    return Transition::Stale;
                }
                self.details.insert(record.id.clone(), record);
                Transition::Applied
            }
            Action::ToggleExpanded { id } => {
                if !self.contains(&id) {
                    return Transition::Skipped;
                }
                if !self.expanded.remove(&id) {
                    self.expanded.insert(id);
                }
                Transition::Applied
            }
        }
    }

    fn accepts(&self, ticket: RequestTicket) -> bool {
        ticket.generation == self.generation && self.pending == Some(ticket)
    }

    fn finish(&mut self) {
        self.loading = false;
        self.pending = None;
    }

    /// Append unseen items, then trim to the retained window
    fn merge(&mut self, incoming: Vec<SearchResultItem>) {
        let mut seen: HashSet<String> = self.items.iter().map(|i| i.id.clone()).collect();
        for item in incoming {
            if seen.insert(item.id.clone()) {
                self.items.push(item);
            }
        }

        if let Some(window) = self.window {
            if self.items.len() > window {
                let evicted = self.items.len() - window;
                self.items.drain(..evicted);
                let kept: HashSet<&str> = self.items.iter().map(|i| i.id.as_str()).collect();
                self.details.retain(|id, _| kept.contains(id.as_str()));
                self.expanded.retain(|id| kept.contains(id.as_str()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str) -> SearchResultItem {
        SearchResultItem::new(id, format!("Title {}", id))
    }

    fn page(ids: &[&str]) -> SearchPage {
        SearchPage::new(ids.iter().map(|id| item(id)).collect())
    }

    fn ids(state: &AggregateState) -> Vec<&str> {
        state.items.iter().map(|i| i.id.as_str()).collect()
    }

    fn start(state: &mut AggregateState, term: &str) -> RequestTicket {
        state.reduce(Action::SearchStarted {
            term: term.to_string(),
        });
        match state.reduce(Action::PageRequested { page: 1 }) {
            Transition::Started(ticket) => ticket,
            other => panic!("expected ticket, got {:?}", other),
        }
    }

    fn load(state: &mut AggregateState, ticket: RequestTicket, page: SearchPage) -> Transition {
        state.reduce(Action::PageLoaded {
            ticket,
            page,
            details: Vec::new(),
        })
    }

    #[test]
    fn test_merge_skips_duplicates_and_keeps_order() {
        let mut state = AggregateState::new(None);
        let t1 = start(&mut state, "alien");
        load(&mut state, t1, page(&["a", "b", "c"]));

        let Transition::Started(t2) = state.reduce(Action::PageRequested { page: 2 }) else {
            panic!("page 2 should start");
        };
        load(&mut state, t2, page(&["c", "d", "d", "a", "e"]));

        assert_eq!(ids(&state), vec!["a", "b", "c", "d", "e"]);
        assert_eq!(state.page, 2);
        assert!(!state.loading);
    }

    #[test]
    fn test_page_one_replaces() {
        let mut state = AggregateState::new(None);
        let t1 = start(&mut state, "alien");
        load(&mut state, t1, page(&["a", "b"]));

        // a retried page 1 under the same search replaces instead of appending
        let Transition::Started(retry) = state.reduce(Action::PageRequested { page: 1 }) else {
            panic!("retry should start");
        };
        load(&mut state, retry, page(&["x"]));
        assert_eq!(ids(&state), vec!["x"]);
    }

    #[test]
    fn test_window_keeps_most_recent() {
        let mut state = AggregateState::new(Some(3));
        let t1 = start(&mut state, "alien");
        load(&mut state, t1, page(&["a", "b"]));
        state.reduce(Action::ToggleExpanded { id: "a".to_string() });
        state.reduce(Action::DetailLoaded {
            record: DetailRecord::new("a"),
        });

        let Transition::Started(t2) = state.reduce(Action::PageRequested { page: 2 }) else {
            panic!("page 2 should start");
        };
        load(&mut state, t2, page(&["c", "d"]));

        assert_eq!(ids(&state), vec!["b", "c", "d"]);
        assert!(!state.details.contains_key("a"));
        assert!(!state.is_expanded("a"));
    }

    #[test]
    fn test_empty_page_exhausts() {
        let mut state = AggregateState::new(None);
        let t1 = start(&mut state, "batman");
        load(&mut state, t1, page(&["a", "b"]));
        assert_eq!(state.next_page(), Some(2));

        let Transition::Started(t2) = state.reduce(Action::PageRequested { page: 2 }) else {
            panic!("page 2 should start");
        };
        load(&mut state, t2, SearchPage::default());

        assert!(!state.has_more);
        assert_eq!(state.items.len(), 2);
        assert_eq!(state.page, 1);
        assert_eq!(state.next_page(), None);
        assert_eq!(
            state.reduce(Action::PageRequested { page: 2 }),
            Transition::Skipped
        );
    }

    #[test]
    fn test_total_results_exhausts() {
        let mut state = AggregateState::new(None);
        let t1 = start(&mut state, "batman");
        load(&mut state, t1, page(&["a", "b"]).with_total(2));
        assert!(!state.has_more);
    }

    #[test]
    fn test_second_request_while_loading_skipped() {
        let mut state = AggregateState::new(None);
        let _t1 = start(&mut state, "batman");
        assert!(state.loading);
        assert_eq!(
            state.reduce(Action::PageRequested { page: 2 }),
            Transition::Skipped
        );
    }

    #[test]
    fn test_failure_keeps_items() {
        let mut state = AggregateState::new(None);
        let t1 = start(&mut state, "batman");
        load(&mut state, t1, page(&["a"]));

        let Transition::Started(t2) = state.reduce(Action::PageRequested { page: 2 }) else {
            panic!("page 2 should start");
        };
        state.reduce(Action::PageFailed {
            ticket: t2,
            message: "Movie not found!".to_string(),
        });

        assert_eq!(state.error.as_deref(), Some("Movie not found!"));
        assert_eq!(ids(&state), vec!["a"]);
        assert!(!state.loading);
        // retry is user-driven and allowed
        assert_eq!(state.next_page(), Some(2));
    }

    #[test]
    fn test_stale_completion_rejected() {
        let mut state = AggregateState::new(None);
        let stale = start(&mut state, "a");
        let current = start(&mut state, "b");

        assert_eq!(load(&mut state, stale, page(&["from-a"])), Transition::Stale);
        assert!(state.loading, "stale completion must not release the newer request");
        assert!(state.items.is_empty());

        assert_eq!(load(&mut state, current, page(&["from-b"])), Transition::Applied);
        assert_eq!(ids(&state), vec!["from-b"]);
        assert_eq!(state.term, "b");

        let failed = state.reduce(Action::PageFailed {
            ticket: stale,
            message: "late".to_string(),
        });
        assert_eq!(failed, Transition::Stale);
        assert_eq!(state.error, None);
    }

    #[test]
    fn test_rejected_keeps_items() {
        let mut state = AggregateState::new(None);
        let t1 = start(&mut state, "a");
        load(&mut state, t1, page(&["x"]));

        state.reduce(Action::Rejected {
            message: EMPTY_TERM_MESSAGE.to_string(),
        });
        assert_eq!(ids(&state), vec!["x"]);
        assert_eq!(state.error.as_deref(), Some(EMPTY_TERM_MESSAGE));
    }

    #[test]
    fn test_detail_for_unknown_item_ignored() {
        let mut state = AggregateState::new(None);
        let t1 = start(&mut state, "a");
        load(&mut state, t1, page(&["x"]));

        let result = state.reduce(Action::DetailLoaded {
            record: DetailRecord::new("gone"),
        });
        assert_eq!(result, Transition::Stale);
        assert!(state.details.is_empty());

        let result = state.reduce(Action::DetailLoaded {
            record: DetailRecord::new("x"),
        });
        assert_eq!(result, Transition::Applied);
        let entries: Vec<_> = state.entries().collect();
        assert!(entries[0].1.is_some());
    }

    #[test]
    fn test_request_before_search_skipped() {
        let mut state = AggregateState::new(None);
        assert_eq!(
            state.reduce(Action::PageRequested { page: 1 }),
            Transition::Skipped
        );
        assert_eq!(state.next_page(), None);
    }
}
