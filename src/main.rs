//! memocache demo binary
//!
//! Wires the cache layer to a real Redis server and runs the reference
//! scenario: store and retrieve a value, replay the call history, then
//! fetch a page twice through the expiring cache.
//!
//! # Startup Sequence
//! 1. Initialize tracing subscriber for logging
//! 2. Load configuration from environment variables
//! 3. Build the Redis connection pool (PING-verified)
//! 4. Optionally wipe the store when FLUSH_ON_START is set
//! 5. Run the scenario and log what happened

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use memocache::{Cache, Config, HttpFetcher, KeyValueStore, PageCache, RedisStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "memocache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting memocache demo");

    // Load configuration from environment variables
    let config = Config::from_env();
    info!(
        redis_url = %config.redis_url,
        page_ttl = config.page_ttl,
        pool_size = config.pool_size,
        "Configuration loaded"
    );

    // The store handle is built once here and passed explicitly everywhere
    let store = Arc::new(RedisStore::connect(&config).await?);
    if config.flush_on_start {
        store.flush_all().await?;
        info!("Store wiped at startup");
    }

    // -- Memoizing cache --
    let cache = Cache::new(Arc::clone(&store));

    let key = cache.store("Hello, cache!").await?;
    info!(%key, "Stored text value");

    let text = cache.retrieve_str(&key).await?;
    info!(?text, "Retrieved it back");

    cache.store(42i64).await?;
    cache.store(3.25f64).await?;

    let report = cache.replay_store().await?;
    info!("Call history:\n{report}");
    info!(json = %serde_json::to_string(&report)?, "Report as JSON");

    // -- Expiring page cache --
    let fetcher = HttpFetcher::new(config.fetch_timeout)?;
    let pages = PageCache::with_ttl(Arc::clone(&store), fetcher, config.page_ttl);

    let url = "http://example.com";
    let first = pages.get_page(url).await?;
    info!(bytes = first.len(), "Fetched page");

    let second = pages.get_page(url).await?;
    info!(
        bytes = second.len(),
        served_from_cache = (first == second),
        "Fetched page again"
    );

    let count = pages.request_count(url).await?;
    info!(count, "Request counter for {url}");

    Ok(())
}
