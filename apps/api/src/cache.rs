//! Session cache: refresh-token storage and login-attempt throttling.
//!
//! The cache is strictly best-effort. Every backend failure is logged and
//! the caller proceeds as if the cache had answered permissively
//! (token accepted, zero failed attempts).

use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

const OPERATION_TIMEOUT: Duration = Duration::from_millis(500);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheStatus {
    Healthy,
    Unhealthy,
    Unavailable,
}

/// Carried in `AppState` as `Arc<dyn SessionCache>`.
#[async_trait]
pub trait SessionCache: Send + Sync {
    async fn store_refresh_token(&self, user_id: Uuid, token: &str, ttl_seconds: u64);
    async fn verify_refresh_token(&self, user_id: Uuid, token: &str) -> bool;
    async fn revoke_refresh_token(&self, user_id: Uuid);

    /// Increments the counter, starting the window on the first failure.
    async fn increment_login_attempts(&self, email: &str, window_seconds: i64) -> u32;
    async fn login_attempts(&self, email: &str) -> u32;
    async fn reset_login_attempts(&self, email: &str);

    async fn ping(&self) -> CacheStatus;
}

fn refresh_token_key(user_id: Uuid) -> String {
    format!("refresh_token:{user_id}")
}

fn login_attempts_key(email: &str) -> String {
    format!("login_attempts:{email}")
}

// ────────────────────────────────────────────────────────────────────────────
// Redis backend
// ────────────────────────────────────────────────────────────────────────────

pub struct RedisSessionCache {
    conn: MultiplexedConnection,
}

impl RedisSessionCache {
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url).context("Invalid REDIS_URL")?;
        let conn = tokio::time::timeout(CONNECT_TIMEOUT, client.get_multiplexed_tokio_connection())
            .await
            .context("Timed out connecting to Redis")?
            .context("Failed to connect to Redis")?;
        info!("Redis connection established");
        Ok(Self { conn })
    }

    async fn run<T, F>(&self, op: &str, fut: F) -> Option<T>
    where
        F: Future<Output = redis::RedisResult<T>> + Send,
    {
        match tokio::time::timeout(OPERATION_TIMEOUT, fut).await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(e)) => {
                warn!(operation = op, error = %e, "redis command failed");
                None
            }
            Err(_) => {
                warn!(operation = op, "redis command timed out");
                None
            }
        }
    }
}

#[async_trait]
impl SessionCache for RedisSessionCache {
    async fn store_refresh_token(&self, user_id: Uuid, token: &str, ttl_seconds: u64) {
        let mut conn = self.conn.clone();
        let key = refresh_token_key(user_id);
        self.run::<(), _>("store_refresh_token", conn.set_ex(&key, token, ttl_seconds))
            .await;
    }

    async fn verify_refresh_token(&self, user_id: Uuid, token: &str) -> bool {
        let mut conn = self.conn.clone();
        let key = refresh_token_key(user_id);
        match self
            .run::<Option<String>, _>("verify_refresh_token", conn.get(&key))
            .await
        {
            Some(stored) => stored.as_deref() == Some(token),
            None => true,
        }
    }

    async fn revoke_refresh_token(&self, user_id: Uuid) {
        let mut conn = self.conn.clone();
        let key = refresh_token_key(user_id);
        self.run::<(), _>("revoke_refresh_token", conn.del(&key)).await;
    }

    async fn increment_login_attempts(&self, email: &str, window_seconds: i64) -> u32 {
        let mut conn = self.conn.clone();
        let key = login_attempts_key(email);
        let Some(count) = self
            .run::<i64, _>("increment_login_attempts", conn.incr(&key, 1))
            .await
        else {
            return 0;
        };
        if count == 1 {
            let mut conn = self.conn.clone();
            self.run::<(), _>("expire_login_attempts", conn.expire(&key, window_seconds))
                .await;
        }
        u32::try_from(count).unwrap_or(0)
    }

    async fn login_attempts(&self, email: &str) -> u32 {
        let mut conn = self.conn.clone();
        let key = login_attempts_key(email);
        self.run::<Option<u32>, _>("login_attempts", conn.get(&key))
            .await
            .flatten()
            .unwrap_or(0)
    }

    async fn reset_login_attempts(&self, email: &str) {
        let mut conn = self.conn.clone();
        let key = login_attempts_key(email);
        self.run::<(), _>("reset_login_attempts", conn.del(&key)).await;
    }

    async fn ping(&self) -> CacheStatus {
        let mut conn = self.conn.clone();
        let ping = redis::cmd("PING");
        match self
            .run::<String, _>("ping", ping.query_async(&mut conn))
            .await
        {
            Some(_) => CacheStatus::Healthy,
            None => CacheStatus::Unhealthy,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Disabled backend (Redis unreachable at startup)
// ────────────────────────────────────────────────────────────────────────────

pub struct DisabledCache;

#[async_trait]
impl SessionCache for DisabledCache {
    async fn store_refresh_token(&self, _user_id: Uuid, _token: &str, _ttl_seconds: u64) {}

    async fn verify_refresh_token(&self, _user_id: Uuid, _token: &str) -> bool {
        true
    }

    async fn revoke_refresh_token(&self, _user_id: Uuid) {}

    async fn increment_login_attempts(&self, _email: &str, _window_seconds: i64) -> u32 {
        0
    }

    async fn login_attempts(&self, _email: &str) -> u32 {
        0
    }

    async fn reset_login_attempts(&self, _email: &str) {}

    async fn ping(&self) -> CacheStatus {
        CacheStatus::Unavailable
    }
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory backend for tests
// ────────────────────────────────────────────────────────────────────────────


#[cfg(test)]
mod tests {
    use super::memory::MemorySessionCache;
    use super::*;

    #[tokio::test]
    async fn test_disabled_cache_fails_open() {
        let cache = DisabledCache;
        let id = Uuid::new_v4();
        assert!(cache.verify_refresh_token(id, "anything").await);
        assert_eq!(cache.increment_login_attempts("a@b.cm", 900).await, 0);
        assert_eq!(cache.login_attempts("a@b.cm").await, 0);
        assert_eq!(cache.ping().await, CacheStatus::Unavailable);
    }

    #[tokio::test]
    async fn test_memory_cache_rotates_refresh_tokens() {
        let cache = MemorySessionCache::default();
        let id = Uuid::new_v4();
        cache.store_refresh_token(id, "first", 60).await;
        assert!(cache.verify_refresh_token(id, "first").await);
        cache.store_refresh_token(id, "second", 60).await;
        assert!(!cache.verify_refresh_token(id, "first").await);
        cache.revoke_refresh_token(id).await;
        assert!(!cache.verify_refresh_token(id, "second").await);
    }

    #[tokio::test]
    async fn test_memory_cache_counts_attempts() {
        let cache = MemorySessionCache::default();
        for expected in 1..=3 {
            assert_eq!(cache.increment_login_attempts("x@y.cm", 900).await, expected);
        }
        cache.reset_login_attempts("x@y.cm").await;
        assert_eq!(cache.login_attempts("x@y.cm").await, 0);
    }

    #[test]
    fn test_key_layout() {
        let id = Uuid::nil();
        assert_eq!(
            refresh_token_key(id),
            "refresh_token:00000000-0000-0000-0000-000000000000"
        );
        assert_eq!(login_attempts_key("a@b.cm"), "login_attempts:a@b.cm");
    }
}
