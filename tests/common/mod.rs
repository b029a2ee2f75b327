#![allow(dead_code)]

use axum_test::TestServer;
use parking_lot::Mutex;
use snaplink::application::retry::RetryPolicy;
use snaplink::domain::repositories::UrlRepository;
use snaplink::domain::visit_worker::{VisitQueue, run_visit_worker};
use snaplink::infrastructure::cache::{CacheService, MemoryCache};
use snaplink::infrastructure::persistence::InMemoryUrlRepository;
use snaplink::routes::router;
use snaplink::state::AppState;
use snaplink::utils::code_generator::{CodeGenerator, RandomCodeGenerator};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// A fully wired service over in-process backends.
pub struct TestApp {
    pub state: AppState,
    pub repository: Arc<InMemoryUrlRepository>,
    pub cache: Arc<MemoryCache>,
    pub worker: JoinHandle<()>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_generator(Arc::new(RandomCodeGenerator::default()), 5)
    }

    pub fn with_generator(generator: Arc<dyn CodeGenerator>, max_attempts: usize) -> Self {
        let repository = Arc::new(InMemoryUrlRepository::new());
        let cache = Arc::new(MemoryCache::new(10_000, Duration::from_secs(3600)));

        let (visits, rx) = VisitQueue::channel(1_000);
        let worker = tokio::spawn(run_visit_worker(rx, repository.clone(), 4));

        let store: Arc<dyn UrlRepository> = repository.clone();
        let cache_service: Arc<dyn CacheService> = cache.clone();
        let state = AppState::new(
            store,
            cache_service,
            generator,
            RetryPolicy::new(max_attempts),
            visits,
        );

        Self {
            state,
            repository,
            cache,
            worker,
        }
    }

    pub fn server(&self) -> TestServer {
        TestServer::new(router(self.state.clone())).unwrap()
    }

    /// Closes the visit queue and waits until every queued increment is applied.
    ///
    /// Any other clone of the state (servers included) must be dropped first.
    pub async fn drain(self) -> Arc<InMemoryUrlRepository> {
        let Self {
            state,
            repository,
            worker,
            ..
        } = self;
        drop(state);
        tokio::time::timeout(Duration::from_secs(5), worker)
            .await
            .expect("visit worker did not drain")
            .unwrap();
        repository
    }
}

/// Polls the store until `code` reaches `expected` visits.
pub async fn wait_for_visits(repository: &dyn UrlRepository, code: &str, expected: i64) -> i64 {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        let visits = repository
            .find_by_code(code)
            .await
            .unwrap()
            .map(|r| r.visits)
            .unwrap_or(-1);
        if visits >= expected || tokio::time::Instant::now() >= deadline {
            return visits;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Replays a fixed list of codes, then repeats the last one.
pub struct SequenceGenerator {
    codes: Mutex<VecDeque<String>>,
    last: Mutex<String>,
}

impl SequenceGenerator {
    pub fn new(codes: &[&str]) -> Self {
        Self {
            codes: Mutex::new(codes.iter().map(|c| c.to_string()).collect()),
            last: Mutex::new(codes.last().copied().unwrap_or("aaaaaa").to_string()),
        }
    }
}

impl CodeGenerator for SequenceGenerator {
    fn generate(&self) -> String {
        match self.codes.lock().pop_front() {
            Some(code) => {
                *self.last.lock() = code.clone();
                code
            }
            None => self.last.lock().clone(),
        }
    }
}
