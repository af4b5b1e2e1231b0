//! HTTP networking module
//!
//! Provides the shared HTTP client used to reach the metadata provider.

mod client;

pub use client::HttpClient;
