use std::sync::Arc;
use std::time::Duration;

use taxform::cache::{TemplateCache, fingerprint};
use taxform::config::EngineConfig;
use taxform::test_utils::fixtures;

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_n_concurrent_callers_share_one_parse() {
    const CALLERS: usize = 32;
    let cache = TemplateCache::new(EngineConfig::default());
    let source = Arc::new(fixtures::large_template(2_000));
    let barrier = Arc::new(tokio::sync::Barrier::new(CALLERS));

    let handles: Vec<_> = (0..CALLERS)
        .map(|_| {
            let cache = cache.clone();
            let source = Arc::clone(&source);
            let barrier = Arc::clone(&barrier);
            tokio::spawn(async move {
                barrier.wait().await;
                cache.get_or_parse(&source, "01/GTGT").await.unwrap()
            })
        })
        .collect();

    let mut results = Vec::with_capacity(CALLERS);
    for handle in handles {
        results.push(handle.await.unwrap());
    }

    assert_eq!(cache.stats().parses, 1);
    assert!(results.iter().all(|r| Arc::ptr_eq(r, &results[0])));
    assert!(results[0].success);
    assert_eq!(results[0].template.as_ref().unwrap().field_count(), 2_000);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_async_and_blocking_callers_share_one_parse() {
    const CALLERS: usize = 16;
    let cache = TemplateCache::new(EngineConfig::default());
    let source = Arc::new(fixtures::large_template(2_000));
    let barrier = Arc::new(std::sync::Barrier::new(CALLERS));

    let handles: Vec<_> = (0..CALLERS)
        .map(|i| {
            let cache = cache.clone();
            let source = Arc::clone(&source);
            let barrier = Arc::clone(&barrier);
            if i % 2 == 0 {
                tokio::task::spawn_blocking(move || {
                    barrier.wait();
                    cache.get_or_parse_blocking(&source, "01/GTGT")
                })
            } else {
                tokio::task::spawn_blocking(move || {
                    barrier.wait();
                    tokio::runtime::Handle::current()
                        .block_on(cache.get_or_parse(&source, "01/GTGT"))
                        .unwrap()
                })
            }
        })
        .collect();

    let mut results = Vec::with_capacity(CALLERS);
    for handle in handles {
        results.push(handle.await.unwrap());
    }

    let stats = cache.stats();
    assert_eq!(stats.parses, 1);
    assert_eq!(stats.hits + stats.coalesced, CALLERS as u64 - 1);
    assert!(results.iter().all(|r| Arc::ptr_eq(r, &results[0])));
    assert!(results[0].success);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_distinct_keys_parse_independently() {
    let cache = TemplateCache::new(EngineConfig::default());
    let a = cache.get_or_parse(fixtures::BASIC_TEMPLATE, "01/GTGT");
    let b = cache.get_or_parse(fixtures::BASIC_TEMPLATE, "01/GTGT-BS");
    let (a, b) = tokio::join!(a, b);
    let (a, b) = (a.unwrap(), b.unwrap());

    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(a.template.as_ref().unwrap().form_code(), "01/GTGT");
    assert_eq!(b.template.as_ref().unwrap().form_code(), "01/GTGT-BS");
    assert_eq!(cache.stats().parses, 2);
    assert_eq!(cache.len(), 2);
}

#[tokio::test]
async fn test_caller_timeout_leaves_cache_usable() {
    let cache = TemplateCache::new(EngineConfig::default());
    let source = fixtures::large_template(5_000);

    let _ = tokio::time::timeout(Duration::from_micros(1), cache.get_or_parse(&source, "X")).await;

    let result = cache.get_or_parse(&source, "X").await.unwrap();
    assert!(result.success);
    assert_eq!(cache.stats().parses, 1);
}

#[test]
fn test_fingerprint_is_content_based() {
    let a = fingerprint(fixtures::BASIC_TEMPLATE, "01/GTGT");
    let b = fingerprint(&fixtures::BASIC_TEMPLATE.replace("2.5.4", "2.5.5"), "01/GTGT");
    assert_ne!(a, b);
    assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
}
