//! Redis Store Module
//!
//! [`KeyValueStore`] backend speaking to a real Redis server through a
//! connection pool. Atomicity of INCR and RPUSH is the server's; this
//! backend only forwards commands.

use async_trait::async_trait;
use deadpool_redis::{Config as PoolConfig, Connection, Pool, Runtime};
use redis::AsyncCommands;
use tracing::info;

use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::store::KeyValueStore;

// == Redis Store ==
/// Redis-backed key-value store.
pub struct RedisStore {
    pool: Pool,
}

impl RedisStore {
    // == Constructor ==
    /// Creates a connection pool from the configuration and verifies the
    /// server is reachable before handing the store out.
    ///
    /// # Arguments
    /// * `config` - Connection URL and pool sizing
    pub async fn connect(config: &Config) -> Result<Self> {
        info!(url = %config.redis_url, "Creating Redis connection pool");

        let cfg = PoolConfig::from_url(&config.redis_url);
        let pool = cfg
            .builder()
            .map_err(|e| CacheError::Config(format!("invalid Redis config: {e}")))?
            .max_size(config.pool_size)
            .runtime(Runtime::Tokio1)
            .build()
            .map_err(|e| CacheError::Config(format!("failed to create pool: {e}")))?;

        // Verify the server answers before any caller depends on the pool
        let mut conn = pool.get().await?;
        redis::cmd("PING").query_async::<String>(&mut *conn).await?;

        info!("Redis connection pool ready");
        Ok(Self { pool })
    }

    /// Checks a connection out of the pool.
    async fn conn(&self) -> Result<Connection> {
        Ok(self.pool.get().await?)
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.conn().await?;
        let value: Option<Vec<u8>> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut conn = self.conn().await?;
        let _: () = conn.set(key, value).await?;
        Ok(())
    }

    async fn set_with_expiry(&self, key: &str, value: &[u8], ttl_seconds: u64) -> Result<()> {
        let mut conn = self.conn().await?;
        let _: () = conn.set_ex(key, value, ttl_seconds).await?;
        Ok(())
    }

    async fn increment(&self, key: &str) -> Result<i64> {
        let mut conn = self.conn().await?;
        let next: i64 = conn.incr(key, 1).await?;
        Ok(next)
    }

    async fn append_to_list(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut conn = self.conn().await?;
        let _: () = conn.rpush(key, value).await?;
        Ok(())
    }

    async fn list_range(&self, key: &str, start: isize, stop: isize) -> Result<Vec<Vec<u8>>> {
        let mut conn = self.conn().await?;
        let items: Vec<Vec<u8>> = conn.lrange(key, start, stop).await?;
        Ok(items)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.conn().await?;
        let exists: bool = conn.exists(key).await?;
        Ok(exists)
    }

    async fn flush_all(&self) -> Result<()> {
        let mut conn = self.conn().await?;
        let _: () = redis::cmd("FLUSHDB").query_async(&mut *conn).await?;
        Ok(())
    }
}
