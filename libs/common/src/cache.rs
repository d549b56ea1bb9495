//! Redis connection module
//!
//! Thin wrapper over a multiplexed Redis connection with the handful of
//! key/value operations the session store needs.

use redis::{AsyncCommands, Client, RedisResult};
use tracing::info;

/// Configuration for Redis connection
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis connection URL (e.g., "redis://localhost:6379")
    pub url: String,
}

impl RedisConfig {
    /// Create a new RedisConfig from environment variables
    ///
    /// # Environment Variables
    /// - `REDIS_URL`: Redis connection URL (default: "redis://localhost:6379")
    pub fn from_env() -> Self {
        let url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());

        RedisConfig { url }
    }
}

/// Redis connection handle
#[derive(Clone)]
pub struct RedisPool {
    client: Client,
}

impl RedisPool {
    /// Create a client for the configured URL. No connection is opened yet.
    pub fn new(config: &RedisConfig) -> RedisResult<Self> {
        let client = Client::open(config.url.clone())?;
        info!("Redis client initialized with URL: {}", config.url);
        Ok(RedisPool { client })
    }

    async fn get_connection(&self) -> RedisResult<redis::aio::MultiplexedConnection> {
        self.client.get_multiplexed_async_connection().await
    }

    /// Set a key-value pair with a TTL in seconds
    pub async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> RedisResult<()> {
        let mut conn = self.get_connection().await?;
        let _: () = conn.set_ex(key, value, ttl_seconds).await?;
        Ok(())
    }

    /// Get a value by key
    pub async fn get(&self, key: &str) -> RedisResult<Option<String>> {
        let mut conn = self.get_connection().await?;
        conn.get(key).await
    }

    /// Reset the TTL of an existing key. Returns false when the key is gone.
    pub async fn expire(&self, key: &str, ttl_seconds: u64) -> RedisResult<bool> {
        let mut conn = self.get_connection().await?;
        conn.expire(key, ttl_seconds as i64).await
    }

    /// Delete a key
    pub async fn delete(&self, key: &str) -> RedisResult<bool> {
        let mut conn = self.get_connection().await?;
        let removed: u64 = conn.del(key).await?;
        Ok(removed > 0)
    }

    /// Check if Redis is reachable
    pub async fn health_check(&self) -> RedisResult<bool> {
        let mut conn = self.get_connection().await?;
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(pong == "PONG")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_redis_config_default_url() {
        unsafe {
            std::env::remove_var("REDIS_URL");
        }
        assert_eq!(RedisConfig::from_env().url, "redis://localhost:6379");
    }

    #[test]
    fn test_redis_pool_rejects_bad_url() {
        let config = RedisConfig {
            url: "http://localhost:6379".to_string(),
        };
        assert!(RedisPool::new(&config).is_err());
    }
}
