//! Server-side sessions stored in Redis
//!
//! A session is an opaque random token, handed to the browser in a cookie,
//! that maps to a user id. Redis expires the key after the configured TTL;
//! every successful lookup slides the expiry forward.

use redis::RedisResult;
use tracing::info;
use uuid::Uuid;

use crate::cache::RedisPool;

const KEY_PREFIX: &str = "session:";

/// Session manager for handling user sessions in Redis
#[derive(Clone)]
pub struct SessionStore {
    redis_pool: RedisPool,
    ttl_seconds: u64,
}

impl SessionStore {
    pub fn new(redis_pool: RedisPool, ttl_seconds: u64) -> Self {
        Self {
            redis_pool,
            ttl_seconds,
        }
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    /// Open a session for a user and return its token
    pub async fn create(&self, user_id: i64) -> RedisResult<String> {
        let token = Uuid::new_v4().simple().to_string();
        self.redis_pool
            .set_ex(&session_key(&token), &user_id.to_string(), self.ttl_seconds)
            .await?;

        info!("Created session for user: {}", user_id);
        Ok(token)
    }

    /// Look up the user behind a token.
    ///
    /// Unknown, expired and malformed entries all read as `None`.
    pub async fn user_id(&self, token: &str) -> RedisResult<Option<i64>> {
        if !is_well_formed(token) {
            return Ok(None);
        }

        let key = session_key(token);
        let Some(value) = self.redis_pool.get(&key).await? else {
            return Ok(None);
        };

        let Ok(user_id) = value.parse::<i64>() else {
            return Ok(None);
        };

        self.redis_pool.expire(&key, self.ttl_seconds).await?;
        Ok(Some(user_id))
    }

    /// Delete a session. Returns false when it did not exist.
    pub async fn delete(&self, token: &str) -> RedisResult<bool> {
        if !is_well_formed(token) {
            return Ok(false);
        }

        let deleted = self.redis_pool.delete(&session_key(token)).await?;
        if deleted {
            info!("Deleted session");
        }
        Ok(deleted)
    }

    pub async fn health_check(&self) -> RedisResult<bool> {
        self.redis_pool.health_check().await
    }
}

fn session_key(token: &str) -> String {
    format!("{}{}", KEY_PREFIX, token)
}

/// Tokens are simple-format UUIDs: 32 lowercase hex characters
fn is_well_formed(token: &str) -> bool {
    token.len() == 32 && token.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_key() {
        assert_eq!(session_key("abc"), "session:abc");
    }

    #[test]
    fn test_generated_tokens_are_well_formed() {
        let token = Uuid::new_v4().simple().to_string();
        assert!(is_well_formed(&token));
    }

    #[test]
    fn test_rejects_malformed_tokens() {
        assert!(!is_well_formed(""));
        assert!(!is_well_formed("session:*"));
        assert!(!is_well_formed(&"A".repeat(32)));
        assert!(!is_well_formed(&"a".repeat(33)));
    }
}
