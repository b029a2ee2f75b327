//! Cache-aside redirect resolution with visit counting.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, error, warn};

use crate::domain::repositories::UrlRepository;
use crate::domain::visit_worker::{VisitQueue, VisitQueueError};
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;

/// Where a resolved target URL came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    /// Served from the cache; the visit was queued for the background worker.
    Cache,
    /// Served from the store; the visit was counted inline.
    Store,
}

/// A resolved redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub target_url: String,
    pub source: ResolutionSource,
}

/// Service resolving short codes to target URLs.
///
/// Every resolve that finds a record counts exactly one visit, on one of two
/// paths:
///
/// - **Cache hit**: the increment is handed to the [`VisitQueue`] and the
///   cached URL is returned without waiting for the store. A dropped or failed
///   background increment loses that one visit; this is the price of not
///   blocking redirects on a durable write.
/// - **Cache miss** (or cache failure): a single atomic find-and-increment
///   against the store, then a best-effort cache fill so the next resolve
///   for the code is a hit.
///
/// Cache errors never reach the caller.
pub struct RedirectService<R: UrlRepository + ?Sized> {
    repository: Arc<R>,
    cache: Arc<dyn CacheService>,
    visits: VisitQueue,
}

impl<R: UrlRepository + ?Sized> RedirectService<R> {
    /// Creates a new redirect service.
    pub fn new(repository: Arc<R>, cache: Arc<dyn CacheService>, visits: VisitQueue) -> Self {
        Self {
            repository,
            cache,
            visits,
        }
    }

    /// Resolves `code` to its target URL, counting one visit.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no record exists for `code`.
    /// Returns [`AppError::StoreUnavailable`] if the store lookup failed.
    pub async fn resolve(&self, code: &str) -> Result<String, AppError> {
        self.resolve_with_source(code)
            .await
            .map(|resolution| resolution.target_url)
    }

    /// Like [`Self::resolve`], also reporting which path served the request.
    ///
    /// # Errors
    ///
    /// See [`Self::resolve`].
    pub async fn resolve_with_source(&self, code: &str) -> Result<Resolution, AppError> {
        match self.cache.get_url(code).await {
            Ok(Some(target_url)) => {
                metrics::counter!("redirect_cache_hits_total").increment(1);
                debug!(code = %code, "Cache hit");

                match self.visits.submit(code) {
                    Ok(()) => {}
                    Err(VisitQueueError::Full) => {
                        warn!(code = %code, "Visit queue full, increment dropped")
                    }
                    Err(VisitQueueError::Closed) => {
                        error!(code = %code, "Visit worker stopped, increment dropped")
                    }
                }

                return Ok(Resolution {
                    target_url,
                    source: ResolutionSource::Cache,
                });
            }
            Ok(None) => {
                metrics::counter!("redirect_cache_misses_total").increment(1);
                debug!(code = %code, "Cache miss");
            }
            Err(e) => {
                metrics::counter!("redirect_cache_errors_total").increment(1);
                warn!(code = %code, error = %e, "Cache unavailable, falling back to store");
            }
        }

        let record = self
            .repository
            .find_and_increment_visits(code)
            .await?
            .ok_or_else(|| AppError::not_found("Short link not found", json!({ "code": code })))?;

        if let Err(e) = self.cache.set_url(code, &record.target_url, None).await {
            warn!(code = %code, error = %e, "Failed to populate cache");
        }

        Ok(Resolution {
            target_url: record.target_url,
            source: ResolutionSource::Store,
        })
    }

    /// The queue used for cache-hit increments.
    pub fn visit_queue(&self) -> &VisitQueue {
        &self.visits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::UrlRecord;
    use crate::domain::repositories::{MockUrlRepository, StoreError};
    use crate::infrastructure::cache::{CacheError, MockCacheService};
    use chrono::Utc;
    use tokio::sync::mpsc;

    fn record(code: &str, url: &str, visits: i64) -> UrlRecord {
        UrlRecord::new(code.to_string(), url.to_string(), Utc::now(), visits)
    }

    fn service(
        repo: MockUrlRepository,
        cache: MockCacheService,
    ) -> (
        RedirectService<MockUrlRepository>,
        mpsc::Receiver<crate::domain::visit_event::VisitEvent>,
    ) {
        let (queue, rx) = VisitQueue::channel(16);
        (
            RedirectService::new(Arc::new(repo), Arc::new(cache), queue),
            rx,
        )
    }

    #[tokio::test]
    async fn test_cache_hit_queues_visit() {
        let mut repo = MockUrlRepository::new();
        repo.expect_find_and_increment_visits().times(0);

        let mut cache = MockCacheService::new();
        cache
            .expect_get_url()
            .withf(|code| code == "abc123")
            .times(1)
            .returning(|_| Ok(Some("https://example.com/a".to_string())));
        cache.expect_set_url().times(0);

        let (service, mut rx) = service(repo, cache);

        let resolution = service.resolve_with_source("abc123").await.unwrap();

        assert_eq!(resolution.target_url, "https://example.com/a");
        assert_eq!(resolution.source, ResolutionSource::Cache);
        assert_eq!(rx.try_recv().unwrap().code, "abc123");
    }

    #[tokio::test]
    async fn test_cache_miss_increments_and_populates() {
        let mut repo = MockUrlRepository::new();
        repo.expect_find_and_increment_visits()
            .withf(|code| code == "abc123")
            .times(1)
            .returning(|_| Ok(Some(record("abc123", "https://example.com/a", 1))));

        let mut cache = MockCacheService::new();
        cache.expect_get_url().times(1).returning(|_| Ok(None));
        cache
            .expect_set_url()
            .withf(|code, url, ttl| code == "abc123" && url == "https://example.com/a" && ttl.is_none())
            .times(1)
            .returning(|_, _, _| Ok(()));

        let (service, mut rx) = service(repo, cache);

        let resolution = service.resolve_with_source("abc123").await.unwrap();

        assert_eq!(resolution.target_url, "https://example.com/a");
        assert_eq!(resolution.source, ResolutionSource::Store);
        assert!(rx.try_recv().is_err(), "miss path must not queue a second increment");
    }

    #[tokio::test]
    async fn test_unknown_code_is_not_found() {
        let mut repo = MockUrlRepository::new();
        repo.expect_find_and_increment_visits()
            .times(1)
            .returning(|_| Ok(None));

        let mut cache = MockCacheService::new();
        cache.expect_get_url().times(1).returning(|_| Ok(None));
        cache.expect_set_url().times(0);

        let (service, mut rx) = service(repo, cache);

        let result = service.resolve("zzzzzz").await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_cache_read_failure_falls_back_to_store() {
        let mut repo = MockUrlRepository::new();
        repo.expect_find_and_increment_visits()
            .times(1)
            .returning(|_| Ok(Some(record("abc123", "https://example.com/a", 4))));

        let mut cache = MockCacheService::new();
        cache
            .expect_get_url()
            .times(1)
            .returning(|_| Err(CacheError::Timeout(250)));
        cache.expect_set_url().times(1).returning(|_, _, _| Ok(()));

        let (service, _rx) = service(repo, cache);

        let resolution = service.resolve_with_source("abc123").await.unwrap();

        assert_eq!(resolution.source, ResolutionSource::Store);
    }

    #[tokio::test]
    async fn test_cache_write_failure_does_not_fail_resolve() {
        let mut repo = MockUrlRepository::new();
        repo.expect_find_and_increment_visits()
            .times(1)
            .returning(|_| Ok(Some(record("abc123", "https://example.com/a", 1))));

        let mut cache = MockCacheService::new();
        cache.expect_get_url().times(1).returning(|_| Ok(None));
        cache
            .expect_set_url()
            .times(1)
            .returning(|_, _, _| Err(CacheError::OperationError("READONLY".to_string())));

        let (service, _rx) = service(repo, cache);

        assert_eq!(
            service.resolve("abc123").await.unwrap(),
            "https://example.com/a"
        );
    }

    #[tokio::test]
    async fn test_store_failure_on_miss_is_surfaced() {
        let mut repo = MockUrlRepository::new();
        repo.expect_find_and_increment_visits()
            .times(1)
            .returning(|_| Err(StoreError::Unavailable("pool timed out".to_string())));

        let mut cache = MockCacheService::new();
        cache.expect_get_url().times(1).returning(|_| Ok(None));
        cache.expect_set_url().times(0);

        let (service, _rx) = service(repo, cache);

        let result = service.resolve("abc123").await;

        assert!(matches!(result, Err(AppError::StoreUnavailable(_))));
    }

    #[tokio::test]
    async fn test_cache_hit_with_closed_queue_still_redirects() {
        let repo = MockUrlRepository::new();
        let mut cache = MockCacheService::new();
        cache
            .expect_get_url()
            .times(1)
            .returning(|_| Ok(Some("https://example.com/a".to_string())));

        let (service, rx) = service(repo, cache);
        drop(rx);

        assert_eq!(
            service.resolve("abc123").await.unwrap(),
            "https://example.com/a"
        );
        assert!(service.visit_queue().is_closed());
    }
}
