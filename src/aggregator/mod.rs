//! Result aggregation module
//!
//! Runs a search session against a provider: paginates, merges pages into
//! ordered state, and enriches items with detail records.

mod detail;
mod executor;
mod state;

pub use detail::DetailCache;
pub use executor::{PageOutcome, ResultAggregator};
pub use state::*;
