//! Redis cache.
//!
//! JSON values under string keys, the category tree cache and fixed-window
//! rate limit counters.

use redis::{aio::ConnectionManager, AsyncCommands, Client, RedisError};
use serde::{de::DeserializeOwned, Serialize};

use crate::config::{
    Config, CACHE_KEY_CATEGORY_TREE, CACHE_PREFIX_RATE_LIMIT, CATEGORY_CACHE_TTL_SECONDS,
};
use crate::errors::{AppError, AppResult};
use domain::CategoryNode;

/// Redis cache wrapper around a multiplexed connection manager.
#[derive(Clone)]
pub struct Cache {
    connection: ConnectionManager,
}

impl Cache {
    /// Connect to Redis.
    pub async fn connect(config: &Config) -> Result<Self, RedisError> {
        let client = Client::open(config.redis_url.as_str())?;
        let connection = ConnectionManager::new(client).await?;
        tracing::info!("Redis cache connected");
        Ok(Self { connection })
    }

    // =========================================================================
    // Generic Cache Operations
    // =========================================================================

    /// Get a JSON value from cache.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        let mut conn = self.connection.clone();
        let value: Option<String> = conn.get(key).await?;

        value
            .map(|json| {
                serde_json::from_str(&json).map_err(|e| {
                    AppError::internal(format!("Cache deserialization error for {}: {}", key, e))
                })
            })
            .transpose()
    }

    /// Set a JSON value with a TTL in seconds.
    pub async fn set_with_ttl<T: Serialize + Sync + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl_seconds: u64,
    ) -> AppResult<()> {
        let mut conn = self.connection.clone();
        let json = serde_json::to_string(value)
            .map_err(|e| AppError::internal(format!("Cache serialization error: {}", e)))?;

        conn.set_ex::<_, _, ()>(key, json, ttl_seconds).await?;
        Ok(())
    }

    pub async fn delete(&self, key: &str) -> AppResult<()> {
        let mut conn = self.connection.clone();
        conn.del::<_, ()>(key).await?;
        Ok(())
    }

    /// Round-trip a `PING` to check connectivity.
    pub async fn ping(&self) -> Result<(), RedisError> {
        let mut conn = self.connection.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    // =========================================================================
    // Categories
    // =========================================================================

    pub async fn get_category_tree(&self) -> AppResult<Option<Vec<CategoryNode>>> {
        self.get(CACHE_KEY_CATEGORY_TREE).await
    }

    pub async fn set_category_tree(&self, tree: &[CategoryNode]) -> AppResult<()> {
        self.set_with_ttl(CACHE_KEY_CATEGORY_TREE, tree, CATEGORY_CACHE_TTL_SECONDS)
            .await
    }

    pub async fn invalidate_category_tree(&self) -> AppResult<()> {
        self.delete(CACHE_KEY_CATEGORY_TREE).await
    }

    // =========================================================================
    // Rate Limiting
    // =========================================================================

    /// Count a request against a fixed window.
    ///
    /// Returns the request count in the current window and whether it is
    /// within `max_requests`. The window starts at the first request.
    pub async fn check_rate_limit(
        &self,
        identifier: &str,
        max_requests: u64,
        window_seconds: u64,
    ) -> AppResult<(u64, bool)> {
        let key = format!("{}{}", CACHE_PREFIX_RATE_LIMIT, identifier);
        let mut conn = self.connection.clone();

        let count: u64 = conn.incr(&key, 1u64).await?;
        if count == 1 {
            conn.expire::<_, ()>(&key, window_seconds as i64).await?;
        }

        Ok((count, count <= max_requests))
    }
}
