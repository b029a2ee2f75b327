//! HTTP server initialization and runtime setup.
//!
//! Handles the database pool, cache selection, the visit worker, and the Axum
//! server lifecycle including graceful shutdown.

use crate::config::{CacheBackend, Config};
use crate::domain::repositories::UrlRepository;
use crate::domain::visit_worker::{VisitQueue, run_visit_worker};
use crate::infrastructure::cache::{CacheService, MemoryCache, NullCache, RedisCache};
use crate::infrastructure::persistence::PgUrlRepository;
use crate::routes::app_router;
use crate::state::AppState;
use crate::utils::code_generator::RandomCodeGenerator;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool
/// - Apply migrations
/// - Cache backend (Redis, in-process, or none)
/// - Background visit worker
/// - Axum HTTP server
///
/// On Ctrl-C or SIGTERM the server stops accepting connections, finishes
/// in-flight requests, drains queued visit increments and closes the pool.
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = connect_pool(&config).await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to migrate")?;

    let cache = build_cache(&config).await;

    let repository: Arc<dyn UrlRepository> =
        Arc::new(PgUrlRepository::new(Arc::new(pool.clone())));

    let (visits, visit_rx) = VisitQueue::channel(config.visit_queue_capacity);
    let worker = tokio::spawn(run_visit_worker(
        visit_rx,
        repository.clone(),
        config.visit_worker_concurrency,
    ));
    tracing::info!("Visit worker started");

    let retry_policy = config.shorten_retry_policy();
    let state = AppState::new(
        repository,
        cache,
        Arc::new(RandomCodeGenerator::new(config.code_length)),
        retry_policy,
        visits,
    );

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router and every state clone are gone now, so the queue is closed.
    tracing::info!("Draining visit queue");
    if let Err(e) = worker.await {
        tracing::error!("Visit worker panicked: {}", e);
    }

    pool.close().await;
    tracing::info!("Shutdown complete");

    Ok(())
}

/// Opens the pool with the configured limits and a server-side statement timeout.
async fn connect_pool(config: &Config) -> Result<PgPool> {
    let options = PgConnectOptions::from_str(&config.database_url)
        .context("Invalid DATABASE_URL")?
        .options([(
            "statement_timeout",
            config.db_statement_timeout_ms.to_string(),
        )]);

    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect_with(options)
        .await
        .context("Failed to connect to database")
}

/// Selects the cache backend.
///
/// An unreachable Redis degrades to the in-process cache instead of failing startup.
async fn build_cache(config: &Config) -> Arc<dyn CacheService> {
    let memory = || -> Arc<dyn CacheService> {
        Arc::new(MemoryCache::new(config.cache_capacity, config.cache_ttl()))
    };

    match (config.cache_backend, &config.redis_url) {
        (CacheBackend::Redis, Some(redis_url)) => {
            match RedisCache::connect(redis_url, config.cache_ttl_seconds, config.cache_timeout())
                .await
            {
                Ok(redis) => {
                    tracing::info!("Cache enabled (Redis)");
                    Arc::new(redis)
                }
                Err(e) => {
                    tracing::warn!("Failed to connect to Redis: {}. Using in-process cache.", e);
                    memory()
                }
            }
        }
        (CacheBackend::None, _) => {
            tracing::info!("Cache disabled (NullCache)");
            Arc::new(NullCache::new())
        }
        _ => {
            tracing::info!("Cache enabled (in-process)");
            memory()
        }
    }
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
