//! Login rate limiter for preventing brute force attacks

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Entry count above which stale entries are swept on the next attempt
const PRUNE_THRESHOLD: usize = 1024;

/// Rate limiter configuration
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Maximum number of failed attempts allowed within the window
    pub max_attempts: u32,
    /// Time window in seconds
    pub window_seconds: u64,
    /// Ban duration in seconds
    pub ban_duration_seconds: u64,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window_seconds: 300,        // 5 minutes
            ban_duration_seconds: 3600, // 1 hour
        }
    }
}

#[derive(Debug)]
struct RateLimiterEntry {
    attempts: u32,
    last_attempt: Instant,
    ban_expires: Option<Instant>,
}

/// Rate limiter keyed by login name
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    entries: Arc<Mutex<HashMap<String, RateLimiterEntry>>>,
}

impl RateLimiter {
    /// Create a new rate limiter
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            config,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Record an attempt for `key` and report whether it may proceed
    pub async fn is_allowed(&self, key: &str) -> bool {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        if entries.len() >= PRUNE_THRESHOLD {
            self.prune(&mut entries, now);
        }

        let entry = entries
            .entry(normalize(key))
            .or_insert(RateLimiterEntry {
                attempts: 0,
                last_attempt: now,
                ban_expires: None,
            });

        if let Some(ban_expires) = entry.ban_expires {
            if now >= ban_expires {
                entry.attempts = 0;
                entry.ban_expires = None;
            } else {
                return false;
            }
        }

        if now.duration_since(entry.last_attempt) >= Duration::from_secs(self.config.window_seconds)
        {
            entry.attempts = 0;
        }

        if entry.attempts >= self.config.max_attempts {
            entry.ban_expires = Some(now + Duration::from_secs(self.config.ban_duration_seconds));
            info!(
                "Banned login {} for {} seconds",
                key, self.config.ban_duration_seconds
            );
            return false;
        }

        entry.attempts += 1;
        entry.last_attempt = now;

        true
    }

    /// Drop entries whose window has passed and which carry no active ban
    fn prune(&self, entries: &mut HashMap<String, RateLimiterEntry>, now: Instant) {
        let window = Duration::from_secs(self.config.window_seconds);
        let before = entries.len();

        entries.retain(|_, entry| {
            let banned = entry.ban_expires.is_some_and(|expires| now < expires);
            banned || now.duration_since(entry.last_attempt) < window
        });

        debug!("Pruned {} stale login entries", before - entries.len());
    }

    /// Forget the attempts recorded for `key` after a successful login
    pub async fn reset(&self, key: &str) {
        self.entries.lock().await.remove(&normalize(key));
    }
}

fn normalize(key: &str) -> String {
    key.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_attempts: u32) -> RateLimiter {
        RateLimiter::new(RateLimiterConfig {
            max_attempts,
            window_seconds: 300,
            ban_duration_seconds: 3600,
        })
    }

    #[tokio::test]
    async fn test_bans_after_max_attempts() {
        let limiter = limiter(3);
        for _ in 0..3 {
            assert!(limiter.is_allowed("manager").await);
        }
        assert!(!limiter.is_allowed("manager").await);
        assert!(!limiter.is_allowed("manager").await);
    }

    #[tokio::test]
    async fn test_keys_are_case_insensitive() {
        let limiter = limiter(1);
        assert!(limiter.is_allowed("Manager").await);
        assert!(!limiter.is_allowed("manager ").await);
        assert!(limiter.is_allowed("client").await);
    }

    #[tokio::test]
    async fn test_reset_clears_attempts() {
        let limiter = limiter(2);
        assert!(limiter.is_allowed("client").await);
        assert!(limiter.is_allowed("client").await);
        limiter.reset("client").await;
        assert!(limiter.is_allowed("client").await);
    }

    #[tokio::test]
    async fn test_stale_entries_are_evicted() {
        let limiter = RateLimiter::new(RateLimiterConfig {
            max_attempts: 5,
            window_seconds: 0,
            ban_duration_seconds: 0,
        });
        for i in 0..10_000 {
            assert!(limiter.is_allowed(&format!("unknown-user-{}", i)).await);
        }
        assert!(limiter.entries.lock().await.len() <= PRUNE_THRESHOLD);
    }

    #[tokio::test]
    async fn test_prune_keeps_banned_and_recent_entries() {
        let limiter = limiter(1);
        assert!(limiter.is_allowed("banned").await);
        assert!(!limiter.is_allowed("banned").await);
        for i in 0..PRUNE_THRESHOLD {
            limiter.is_allowed(&format!("user-{}", i)).await;
        }
        assert!(!limiter.is_allowed("banned").await);
        assert!(limiter.entries.lock().await.contains_key("user-0"));
    }

    #[tokio::test]
    async fn test_zero_window_resets_every_attempt() {
        let limiter = RateLimiter::new(RateLimiterConfig {
            max_attempts: 1,
            window_seconds: 0,
            ban_duration_seconds: 3600,
        });
        assert!(limiter.is_allowed("service").await);
        assert!(limiter.is_allowed("service").await);
    }
}
