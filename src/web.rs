//! Page Cache Module
//!
//! Deduplicates repeated fetches of the same URL inside an expiry window
//! while counting every request.
//!
//! The wrapper only sets the expiry at write time; enforcement is the
//! store's. The per-URL request counter is incremented unconditionally on
//! every call, cached or not, and is never reset by expiry.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{CacheError, Result};
use crate::store::KeyValueStore;

/// Expiry window in seconds applied to cached page bodies by default.
pub const DEFAULT_PAGE_TTL_SECS: u64 = 10;

// == Fetcher Trait ==
/// An idempotent fetch of a resource by URL.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches the resource at `url` and returns its body text.
    /// May fail on network errors; the caller decides what to do with that.
    async fn fetch(&self, url: &str) -> Result<String>;
}

// == HTTP Fetcher ==
/// Real fetcher backed by an HTTP client.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Creates a fetcher whose requests time out after `timeout_seconds`.
    pub fn new(timeout_seconds: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let body = self.client.get(url).send().await?.text().await?;
        Ok(body)
    }
}

// == Page Keys ==
/// Request counter key for `url`.
fn count_key(url: &str) -> String {
    format!("count:{url}")
}

/// Cached body key for `url`.
fn result_key(url: &str) -> String {
    format!("result:{url}")
}

// == Page Cache ==
/// Expiring response cache keyed by URL.
pub struct PageCache<S, F> {
    store: Arc<S>,
    fetcher: F,
    ttl_seconds: u64,
}

impl<S: KeyValueStore, F: Fetcher> PageCache<S, F> {
    // == Constructors ==
    /// Creates a page cache with the default expiry window.
    pub fn new(store: Arc<S>, fetcher: F) -> Self {
        Self::with_ttl(store, fetcher, DEFAULT_PAGE_TTL_SECS)
    }

    /// Creates a page cache with an explicit expiry window in seconds.
    pub fn with_ttl(store: Arc<S>, fetcher: F, ttl_seconds: u64) -> Self {
        Self {
            store,
            fetcher,
            ttl_seconds,
        }
    }

    // == Get Page ==
    /// Returns the body for `url`, from cache when live, otherwise through
    /// the underlying fetcher.
    ///
    /// The request counter for `url` is incremented before anything else.
    /// On a miss the fresh body is cached with the configured expiry, which
    /// restarts on every write. If the fetch fails the error propagates,
    /// nothing is cached, and the counter increment stands.
    pub async fn get_page(&self, url: &str) -> Result<String> {
        self.store.increment(&count_key(url)).await?;

        let result_key = result_key(url);
        if let Some(cached) = self.store.get(&result_key).await? {
            debug!(url, "page cache hit");
            return String::from_utf8(cached)
                .map_err(|_| CacheError::decode(result_key.as_str(), "UTF-8 text"));
        }

        debug!(url, "page cache miss, fetching");
        let body = self.fetcher.fetch(url).await?;
        self.store
            .set_with_expiry(&result_key, body.as_bytes(), self.ttl_seconds)
            .await?;

        Ok(body)
    }

    // == Request Count ==
    /// Reads the request counter for `url`, zero if it was never requested.
    pub async fn request_count(&self, url: &str) -> Result<u64> {
        let key = count_key(url);
        match self.store.get(&key).await? {
            Some(raw) => std::str::from_utf8(&raw)
                .ok()
                .and_then(|s| s.parse().ok())
                .ok_or_else(|| CacheError::decode(key.as_str(), "a request counter")),
            None => Ok(0),
        }
    }
}
