mod common;

use snaplink::application::services::ResolutionSource;
use snaplink::domain::repositories::UrlRepository;
use snaplink::error::AppError;
use snaplink::infrastructure::cache::CacheService;
use std::collections::HashSet;
use std::sync::Arc;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_distinct_urls_get_distinct_codes() {
    let app = common::TestApp::new();

    let handles: Vec<_> = (0..200)
        .map(|i| {
            let service = app.state.shortening_service.clone();
            tokio::spawn(async move {
                service
                    .shorten(&format!("https://example.com/page/{i}"))
                    .await
                    .unwrap()
            })
        })
        .collect();

    let mut codes = HashSet::new();
    for handle in handles {
        codes.insert(handle.await.unwrap().code);
    }

    assert_eq!(codes.len(), 200);
    assert_eq!(app.repository.len(), 200);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_same_url_converges() {
    let app = common::TestApp::new();

    let handles: Vec<_> = (0..50)
        .map(|_| {
            let service = app.state.shortening_service.clone();
            tokio::spawn(async move { service.shorten("https://example.com/hot").await.unwrap() })
        })
        .collect();

    let mut codes = HashSet::new();
    for handle in handles {
        codes.insert(handle.await.unwrap().code);
    }

    assert_eq!(codes.len(), 1);
    assert_eq!(app.repository.len(), 1);
}

#[tokio::test]
async fn test_collisions_retry_until_free_code() {
    let generator = Arc::new(common::SequenceGenerator::new(&[
        "aaaaaa", "aaaaaa", "aaaaaa", "bbbbbb",
    ]));
    let app = common::TestApp::with_generator(generator, 5);

    let first = app
        .state
        .shortening_service
        .shorten("https://example.com/1")
        .await
        .unwrap();
    let second = app
        .state
        .shortening_service
        .shorten("https://example.com/2")
        .await
        .unwrap();

    assert_eq!(first.code, "aaaaaa");
    assert_eq!(second.code, "bbbbbb");
}

#[tokio::test]
async fn test_code_space_exhausted_after_max_attempts() {
    let generator = Arc::new(common::SequenceGenerator::new(&["aaaaaa"]));
    let app = common::TestApp::with_generator(generator, 5);

    app.state
        .shortening_service
        .shorten("https://example.com/1")
        .await
        .unwrap();

    let err = app
        .state
        .shortening_service
        .shorten("https://example.com/2")
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::CodeSpaceExhausted { attempts: 5 }));
    assert_eq!(app.repository.len(), 1);
}

#[tokio::test]
async fn test_scenario_shorten_then_resolve_twice() {
    let app = common::TestApp::new();
    let shortening = app.state.shortening_service.clone();
    let redirect = app.state.redirect_service.clone();

    // New URL starts at zero visits.
    let created = shortening.shorten("https://example.com/a").await.unwrap();
    assert_eq!(created.visits, 0);

    // Same URL again returns the same record.
    let again = shortening.shorten("https://example.com/a").await.unwrap();
    assert_eq!(again.code, created.code);
    assert_eq!(app.repository.len(), 1);

    // Cold cache: counted inline, cache populated.
    let first = redirect.resolve_with_source(&created.code).await.unwrap();
    assert_eq!(first.source, ResolutionSource::Store);
    assert_eq!(first.target_url, "https://example.com/a");
    let stored = app.repository.find_by_code(&created.code).await.unwrap().unwrap();
    assert_eq!(stored.visits, 1);

    // Warm cache: counted by the worker.
    let second = redirect.resolve_with_source(&created.code).await.unwrap();
    assert_eq!(second.source, ResolutionSource::Cache);
    assert_eq!(second.target_url, "https://example.com/a");

    drop((shortening, redirect));
    let repository = app.drain().await;
    let stored = repository.find_by_code(&created.code).await.unwrap().unwrap();
    assert_eq!(stored.visits, 2);
}

#[tokio::test]
async fn test_scenario_unknown_code_is_not_found() {
    let app = common::TestApp::new();

    let err = app
        .state
        .redirect_service
        .resolve("zzzzzz")
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound { .. }));
    assert_eq!(app.cache.get_url("zzzzzz").await.unwrap(), None);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_visit_count_matches_resolves() {
    let app = common::TestApp::new();
    let code = app
        .state
        .shortening_service
        .shorten("https://example.com/popular")
        .await
        .unwrap()
        .code;

    let handles: Vec<_> = (0..100)
        .map(|_| {
            let service = app.state.redirect_service.clone();
            let code = code.clone();
            tokio::spawn(async move { service.resolve(&code).await.unwrap() })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    let repository = app.drain().await;
    let stored = repository.find_by_code(&code).await.unwrap().unwrap();
    assert_eq!(stored.visits, 100);
}

#[tokio::test]
async fn test_cache_matches_store_after_resolves() {
    let app = common::TestApp::new();

    let mut codes = Vec::new();
    for i in 0..20 {
        let record = app
            .state
            .shortening_service
            .shorten(&format!("https://example.com/{i}"))
            .await
            .unwrap();
        app.state.redirect_service.resolve(&record.code).await.unwrap();
        codes.push(record.code);
    }

    for code in &codes {
        let cached = app.cache.get_url(code).await.unwrap().unwrap();
        let stored = app.repository.find_by_code(code).await.unwrap().unwrap();
        assert_eq!(cached, stored.target_url);
    }
}

#[tokio::test]
async fn test_miss_then_hit() {
    let app = common::TestApp::new();
    let code = app
        .state
        .shortening_service
        .shorten("https://example.com/warm")
        .await
        .unwrap()
        .code;

    let sources: Vec<_> = {
        let mut out = Vec::new();
        for _ in 0..3 {
            out.push(
                app.state
                    .redirect_service
                    .resolve_with_source(&code)
                    .await
                    .unwrap()
                    .source,
            );
        }
        out
    };

    assert_eq!(
        sources,
        vec![
            ResolutionSource::Store,
            ResolutionSource::Cache,
            ResolutionSource::Cache
        ]
    );
}

#[tokio::test]
async fn test_cache_hit_on_removed_record_keeps_redirecting() {
    let app = common::TestApp::new();
    let code = app
        .state
        .shortening_service
        .shorten("https://example.com/retired")
        .await
        .unwrap()
        .code;
    app.state.redirect_service.resolve(&code).await.unwrap();

    app.repository.remove(&code);

    // The cached mapping is still correct for the code it names; the lost
    // background increment is logged and dropped by the worker.
    let target = app.state.redirect_service.resolve(&code).await.unwrap();
    assert_eq!(target, "https://example.com/retired");

    let repository = app.drain().await;
    assert!(repository.find_by_code(&code).await.unwrap().is_none());
}
