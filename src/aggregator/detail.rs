//! Memoized detail lookups

use crate::provider::{DetailRecord, MovieProvider, ProviderError, SearchResultItem};
use futures::future::join_all;
use moka::future::Cache;
use std::time::Duration;
use tracing::warn;

/// Detail records memoized by item id.
///
/// Concurrent lookups of the same id share a single provider request. Failed
/// lookups are not stored, so the next request for that id tries again.
#[derive(Clone)]
pub struct DetailCache {
    cache: Cache<String, DetailRecord>,
}

impl DetailCache {
    /// Create a new detail cache with specified TTL
    pub fn new(ttl_seconds: u64, max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .time_to_live(Duration::from_secs(ttl_seconds))
            .max_capacity(max_capacity)
            .build();

        Self { cache }
    }

    /// Cached record, without fetching
    pub async fn get(&self, id: &str) -> Option<DetailRecord> {
        self.cache.get(id).await
    }

    /// Cached record, or fetch it once from the provider
    pub async fn get_or_fetch(
        &self,
        provider: &dyn MovieProvider,
        id: &str,
    ) -> Result<DetailRecord, ProviderError> {
        self.cache
            .try_get_with(id.to_string(), provider.detail(id))
            .await
            .map_err(|e| (*e).clone())
    }

    /// Fetch details for a whole page in parallel.
    ///
    /// Output follows the order of `items`; items whose lookup failed are left out.
    pub async fn get_or_fetch_all(
        &self,
        provider: &dyn MovieProvider,
        items: &[SearchResultItem],
    ) -> Vec<DetailRecord> {
        let lookups = items
            .iter()
            .map(|item| self.get_or_fetch(provider, &item.id));

        join_all(lookups)
            .await
            .into_iter()
            .zip(items)
            .filter_map(|(result, item)| match result {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("Detail lookup failed for {}: {}", item.id, e);
                    None
                }
            })
            .collect()
    }
}

impl Default for DetailCache {
    fn default() -> Self {
        Self::new(3600, 1000) // 1 hour TTL, 1k entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::mock::MockProvider;

    #[tokio::test]
    async fn test_concurrent_lookups_share_request() {
        let provider = MockProvider::new().with_detail(DetailRecord::new("tt1"));
        let cache = DetailCache::default();

        let (a, b) = tokio::join!(
            cache.get_or_fetch(&provider, "tt1"),
            cache.get_or_fetch(&provider, "tt1")
        );
        assert_eq!(a.unwrap().id, "tt1");
        assert_eq!(b.unwrap().id, "tt1");

        cache.get_or_fetch(&provider, "tt1").await.unwrap();
        assert_eq!(provider.detail_calls(), 1);
        assert!(cache.get("tt1").await.is_some());
    }

    #[tokio::test]
    async fn test_failure_not_cached() {
        let provider = MockProvider::new()
            .with_detail_error("tt9", ProviderError::Transport("reset".to_string()));
        let cache = DetailCache::default();

        assert!(cache.get_or_fetch(&provider, "tt9").await.is_err());
        assert!(cache.get_or_fetch(&provider, "tt9").await.is_err());
        assert_eq!(provider.detail_calls(), 2);
        assert!(cache.get("tt9").await.is_none());
    }

    #[tokio::test]
    async fn test_batch_keeps_item_order() {
        let provider = MockProvider::new()
            .with_detail(DetailRecord::new("a"))
            .with_detail_error("b", ProviderError::Provider("Incorrect IMDb ID.".to_string()))
            .with_detail(DetailRecord::new("c"));
        let cache = DetailCache::default();
        let items = vec![
            SearchResultItem::new("a", "A"),
            SearchResultItem::new("b", "B"),
            SearchResultItem::new("c", "C"),
        ];

        let records = cache.get_or_fetch_all(&provider, &items).await;
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(provider.detail_calls(), 3);
    }
}
