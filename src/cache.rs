// src/cache.rs
//! Provides a Redis-based caching layer for upstream TMDB response bodies.

use crate::error::AppError;
use log::{debug, error, info, warn};
use redis::{aio::ConnectionManager, AsyncCommands};
use std::fmt;

/// A shared Redis cache client.
/// Uses a `ConnectionManager` for automatic reconnection and resilience.
#[derive(Clone)]
pub struct ResponseCache {
    conn_manager: ConnectionManager,
    default_ttl_secs: u64,
    redis_url: String,
}

impl fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseCache")
            .field("redis_url", &self.redis_url)
            .field("default_ttl_secs", &self.default_ttl_secs)
            .field("conn_manager", &"<ConnectionManager instance>")
            .finish()
    }
}

impl ResponseCache {
    pub async fn new(redis_url: &str, default_ttl_secs: u64) -> Result<Self, AppError> {
        info!("Initializing Redis connection manager for URL: {}", redis_url);
        let client = redis::Client::open(redis_url)?;
        let conn_manager = ConnectionManager::new(client).await.map_err(|e| {
            error!("Failed to create Redis ConnectionManager: {}", e);
            AppError::CacheError(format!("Failed to create Redis ConnectionManager: {}", e))
        })?;
        info!(
            "Redis ConnectionManager initialized successfully. Default TTL: {}s",
            default_ttl_secs
        );
        Ok(Self {
            conn_manager,
            default_ttl_secs,
            redis_url: redis_url.to_string(),
        })
    }

    pub fn generate_key(prefix: &str, params: &[&str]) -> String {
        let mut key = prefix.to_string();
        for param in params {
            key.push(':');
            key.push_str(param);
        }
        key
    }

    pub async fn get_raw(&self, key: &str) -> Result<Option<String>, AppError> {
        debug!("Attempting to GET cache for key: {}", key);

        let mut conn = self.conn_manager.clone();
        match conn.get::<_, Option<String>>(key).await {
            Ok(Some(value)) => {
                debug!("Cache HIT for key: {}", key);
                Ok(Some(value))
            }
            Ok(None) => {
                debug!("Cache MISS for key: {}", key);
                Ok(None)
            }
            Err(e) => {
                error!("Redis GET error for key {}: {}", key, e);
                Err(AppError::CacheError(format!("Redis GET error for key {}: {}", key, e)))
            }
        }
    }

    pub async fn set_ex_raw(
        &self,
        key: &str,
        value: &str,
        ttl_seconds: Option<u64>,
    ) -> Result<(), AppError> {
        let mut conn = self.conn_manager.clone();
        let ttl_to_use = ttl_seconds.unwrap_or(self.default_ttl_secs);

        match conn.set_ex::<_, _, ()>(key, value, ttl_to_use).await {
            Ok(_) => {
                debug!("Cache SETEX success for key: {} with TTL: {}s", key, ttl_to_use);
                Ok(())
            }
            Err(e) => {
                warn!("Failed to SETEX key '{}' in Redis: {}", key, e);
                Err(AppError::CacheError(e.to_string()))
            }
        }
    }
}
