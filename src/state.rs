//! Shared application state injected into every handler.

use std::sync::Arc;

use crate::application::retry::RetryPolicy;
use crate::application::services::{RedirectService, ShorteningService, StatsService};
use crate::domain::repositories::UrlRepository;
use crate::domain::visit_worker::VisitQueue;
use crate::infrastructure::cache::CacheService;
use crate::utils::code_generator::CodeGenerator;

/// Services and handles shared across requests.
///
/// Every clone holds a [`VisitQueue`] sender; the visit worker only drains
/// once all clones are dropped.
#[derive(Clone)]
pub struct AppState {
    pub shortening_service: Arc<ShorteningService<dyn UrlRepository>>,
    pub redirect_service: Arc<RedirectService<dyn UrlRepository>>,
    pub stats_service: Arc<StatsService<dyn UrlRepository>>,
    pub repository: Arc<dyn UrlRepository>,
    pub cache: Arc<dyn CacheService>,
    pub visits: VisitQueue,
}

impl AppState {
    /// Wires the services over one store, cache and visit queue.
    pub fn new(
        repository: Arc<dyn UrlRepository>,
        cache: Arc<dyn CacheService>,
        generator: Arc<dyn CodeGenerator>,
        retry_policy: RetryPolicy,
        visits: VisitQueue,
    ) -> Self {
        let shortening_service = Arc::new(ShorteningService::new(
            repository.clone(),
            generator,
            retry_policy,
        ));
        let redirect_service = Arc::new(RedirectService::new(
            repository.clone(),
            cache.clone(),
            visits.clone(),
        ));
        let stats_service = Arc::new(StatsService::new(repository.clone()));

        Self {
            shortening_service,
            redirect_service,
            stats_service,
            repository,
            cache,
            visits,
        }
    }
}
