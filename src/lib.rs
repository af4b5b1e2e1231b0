//! movie-search: paginated movie search with on-demand detail enrichment
//!
//! A [`ResultAggregator`] drives a search session against a [`MovieProvider`]
//! (OMDb by default), merging pages into ordered, duplicate-free state and
//! fetching detail records lazily or eagerly. A thin HTTP proxy exposes the
//! raw search endpoint.

pub mod aggregator;
pub mod config;
pub mod network;
pub mod provider;
pub mod web;

pub use aggregator::{AggregateState, PageOutcome, ResultAggregator};
pub use config::Settings;
pub use provider::{DetailRecord, MovieProvider, Omdb, SearchQuery, SearchResultItem};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default timeout for provider requests in seconds
pub const DEFAULT_TIMEOUT: u64 = 5;
