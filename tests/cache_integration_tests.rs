//! Integration Tests for the Cache Layer
//!
//! End-to-end scenarios over the in-process store backend: storing and
//! retrieving values, call counting and history replay, and page-cache
//! deduplication inside the expiry window.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

use memocache::{
    replay, Cache, CacheError, Fetcher, KeyValueStore, MemoryStore, PageCache, Result, Value,
    STORE_OP,
};

// == Helper Functions ==

fn new_cache() -> (Arc<MemoryStore>, Cache<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let cache = Cache::new(Arc::clone(&store));
    (store, cache)
}

/// Fetcher double that counts how often the underlying fetch ran.
struct CountingFetcher {
    calls: Arc<AtomicUsize>,
}

impl CountingFetcher {
    fn new() -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }
}

#[async_trait]
impl Fetcher for CountingFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("<html>{url}</html>"))
    }
}

// == Store / Retrieve Scenarios ==

#[tokio::test]
async fn test_store_then_retrieve_text() {
    let (_store, cache) = new_cache();

    let key = cache.store("Hello").await.unwrap();
    let text = cache.retrieve_str(&key).await.unwrap();

    assert_eq!(text.as_deref(), Some("Hello"));
}

#[tokio::test]
async fn test_roundtrip_for_every_value_kind() {
    let (_store, cache) = new_cache();

    let k_text = cache.store("some text").await.unwrap();
    assert_eq!(
        cache.retrieve_str(&k_text).await.unwrap().as_deref(),
        Some("some text")
    );

    let k_int = cache.store(1234i64).await.unwrap();
    assert_eq!(cache.retrieve_int(&k_int).await.unwrap(), Some(1234));

    let k_bytes = cache.store(vec![0u8, 159, 146, 150]).await.unwrap();
    assert_eq!(
        cache.retrieve(&k_bytes).await.unwrap(),
        Some(vec![0u8, 159, 146, 150])
    );

    let k_float = cache.store(3.25f64).await.unwrap();
    assert_eq!(
        cache.retrieve(&k_float).await.unwrap(),
        Some(b"3.25".to_vec())
    );
}

#[tokio::test]
async fn test_store_assigns_unique_keys() {
    let (_store, cache) = new_cache();

    let mut keys = HashSet::new();
    for _ in 0..25 {
        keys.insert(cache.store("same input").await.unwrap());
    }

    assert_eq!(keys.len(), 25);
}

#[tokio::test]
async fn test_retrieve_absent_key_is_sentinel() {
    let (_store, cache) = new_cache();

    assert_eq!(cache.retrieve("missing").await.unwrap(), None);
    // Typed retrieval short-circuits on absence too
    assert_eq!(cache.retrieve_str("missing").await.unwrap(), None);
    assert_eq!(cache.retrieve_int("missing").await.unwrap(), None);
}

// == Call Counting / Replay Scenarios ==

#[tokio::test]
async fn test_counter_reads_n_after_n_calls() {
    let (store, cache) = new_cache();

    for _ in 0..5 {
        cache.store("x").await.unwrap();
    }

    let raw = store.get(STORE_OP).await.unwrap().unwrap();
    assert_eq!(raw, b"5");
}

#[tokio::test]
async fn test_replay_reports_calls_in_order() {
    let (_store, cache) = new_cache();

    let k1 = cache.store("first").await.unwrap();
    let k2 = cache.store(2i64).await.unwrap();

    let report = cache.replay_store().await.unwrap();

    assert_eq!(report.op, STORE_OP);
    assert_eq!(report.count, 2);
    assert_eq!(report.calls.len(), 2);

    assert_eq!(report.calls[0].input, "Text(\"first\")");
    assert_eq!(report.calls[0].output, k1);
    assert_eq!(report.calls[1].input, "Int(2)");
    assert_eq!(report.calls[1].output, k2);

    let rendered = report.to_string();
    assert!(rendered.starts_with("Cache::store was called 2 times:\n"));
    assert!(rendered.contains(&format!("Cache::store(Text(\"first\")) -> {k1}")));
}

#[tokio::test]
async fn test_replay_of_uncalled_operation() {
    let (store, _cache) = new_cache();

    let report = replay(store.as_ref(), "Cache::never").await.unwrap();

    assert_eq!(report.count, 0);
    assert!(report.calls.is_empty());
}

#[tokio::test]
async fn test_replay_truncates_mismatched_histories() {
    let (store, cache) = new_cache();

    cache.store("only call").await.unwrap();
    // A stray input with no matching output, as interleaved concurrent
    // appends could leave behind
    store
        .append_to_list("Cache::store:inputs", b"orphan")
        .await
        .unwrap();

    let report = cache.replay_store().await.unwrap();

    assert_eq!(report.count, 1);
    assert_eq!(report.calls.len(), 1);
    assert_eq!(report.calls[0].input, "Text(\"only call\")");
}

#[tokio::test]
async fn test_histories_grow_one_entry_per_call() {
    let (store, cache) = new_cache();

    for i in 0..4usize {
        cache.store(i as i64).await.unwrap();

        let inputs = store
            .list_range("Cache::store:inputs", 0, -1)
            .await
            .unwrap();
        let outputs = store
            .list_range("Cache::store:outputs", 0, -1)
            .await
            .unwrap();
        assert_eq!(inputs.len(), i + 1);
        assert_eq!(outputs.len(), i + 1);
    }
}

// == Page Cache Scenarios ==

#[tokio::test]
async fn test_second_fetch_within_window_is_served_from_cache() {
    let store = Arc::new(MemoryStore::new());
    let (fetcher, calls) = CountingFetcher::new();
    let pages = PageCache::new(Arc::clone(&store), fetcher);

    let url = "http://example.com";
    let first = pages.get_page(url).await.unwrap();
    let second = pages.get_page(url).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(calls.load(Ordering::SeqCst), 1, "one underlying fetch");
    assert_eq!(pages.request_count(url).await.unwrap(), 2);
}

#[tokio::test]
async fn test_fetch_after_expiry_hits_the_network_again() {
    let store = Arc::new(MemoryStore::new());
    let (fetcher, calls) = CountingFetcher::new();
    let pages = PageCache::with_ttl(Arc::clone(&store), fetcher, 1);

    let url = "http://example.com";
    pages.get_page(url).await.unwrap();

    sleep(Duration::from_millis(1200)).await;

    pages.get_page(url).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2, "two underlying fetches");
    assert_eq!(pages.request_count(url).await.unwrap(), 2);
}

#[tokio::test]
async fn test_page_and_memo_layers_share_one_store() {
    // One explicit store handle wired into both layers
    let store = Arc::new(MemoryStore::new());
    let cache = Cache::new(Arc::clone(&store));
    let (fetcher, _calls) = CountingFetcher::new();
    let pages = PageCache::new(Arc::clone(&store), fetcher);

    let key = cache.store("shared").await.unwrap();
    pages.get_page("http://example.com").await.unwrap();

    // Both layers' keys are visible through the same store
    assert!(store.exists(&key).await.unwrap());
    assert!(store.exists("count:http://example.com").await.unwrap());
    assert!(store.exists(STORE_OP).await.unwrap());

    // And a flush wipes them all
    store.flush_all().await.unwrap();
    assert!(!store.exists(&key).await.unwrap());
    assert_eq!(pages.request_count("http://example.com").await.unwrap(), 0);
}

// == Error Propagation ==

#[tokio::test]
async fn test_decode_error_names_the_key() {
    let (_store, cache) = new_cache();

    let key = cache.store("definitely not a number").await.unwrap();
    let err = cache.retrieve_int(&key).await.unwrap_err();

    match err {
        CacheError::Decode { key: k, .. } => assert_eq!(k, key),
        other => panic!("expected decode error, got {other}"),
    }
}

#[tokio::test]
async fn test_value_variants_compare() {
    // Sanity on the input domain itself
    assert_eq!(Value::from("a"), Value::Text("a".to_string()));
    assert_eq!(Value::from(7i64), Value::Int(7));
    assert_ne!(Value::from(7i64), Value::from(7.0f64));
}
