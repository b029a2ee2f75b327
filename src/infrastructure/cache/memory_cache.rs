//! In-process cache backed by Moka.

use super::service::{CacheResult, CacheService};
use async_trait::async_trait;
use moka::future::Cache;
use std::time::Duration;
use tracing::debug;

/// Process-local `code -> target URL` cache.
///
/// Bounded by entry count with a uniform TTL. Used when Redis is not
/// configured; each process keeps its own copy, which is fine because
/// entries are immutable projections of store records.
#[derive(Clone)]
pub struct MemoryCache {
    cache: Cache<String, String>,
}

impl MemoryCache {
    /// Creates a cache holding at most `max_capacity` entries for `ttl` each.
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .build();
        Self { cache }
    }

    /// Number of live entries (approximate until pending tasks run).
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(100_000, Duration::from_secs(3600))
    }
}

#[async_trait]
impl CacheService for MemoryCache {
    async fn get_url(&self, short_code: &str) -> CacheResult<Option<String>> {
        let cached = self.cache.get(short_code).await;
        match &cached {
            Some(url) => debug!("Cache HIT: {} -> {}", short_code, url),
            None => debug!("Cache MISS: {}", short_code),
        }
        Ok(cached)
    }

    // Moka applies one TTL to every entry, so a per-call TTL is ignored.
    async fn set_url(
        &self,
        short_code: &str,
        target_url: &str,
        _ttl_seconds: Option<u64>,
    ) -> CacheResult<()> {
        self.cache
            .insert(short_code.to_string(), target_url.to_string())
            .await;
        Ok(())
    }

    async fn invalidate(&self, short_code: &str) -> CacheResult<()> {
        self.cache.invalidate(short_code).await;
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
