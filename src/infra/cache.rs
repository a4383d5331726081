//! Redis cache implementation.
//!
//! Backs the three server-side stores this application needs: admin
//! session records, the revoked-token denylist consulted on every
//! bearer request, and rate-limit counters.

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client, RedisError};
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use crate::config::{
    Config, CACHE_PREFIX_RATE_LIMIT, CACHE_PREFIX_REVOKED_TOKEN, CACHE_PREFIX_SESSION,
};
use crate::domain::AdminSessionData;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Server-side store for admin console sessions.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AdminSessionStore: Send + Sync {
    /// Persist session data under a session id with a TTL
    async fn put_session(
        &self,
        session_id: &str,
        data: &AdminSessionData,
        ttl_seconds: u64,
    ) -> AppResult<()>;

    /// Fetch session data, None when expired or unknown
    async fn fetch_session(&self, session_id: &str) -> AppResult<Option<AdminSessionData>>;

    /// Destroy a session
    async fn remove_session(&self, session_id: &str) -> AppResult<()>;
}

/// Denylist of revoked token ids, consulted on every bearer request.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait TokenRevocationStore: Send + Sync {
    /// Mark a token id revoked until its natural expiry
    async fn revoke(&self, token_id: &Uuid, ttl_seconds: u64) -> AppResult<()>;

    /// Check whether a token id has been revoked
    async fn is_revoked(&self, token_id: &Uuid) -> AppResult<bool>;
}

/// Redis cache wrapper with connection pooling.
#[derive(Clone)]
pub struct Cache {
    connection: ConnectionManager,
}

impl Cache {
    /// Create a new cache instance and connect to Redis.
    ///
    /// # Panics
    /// Panics if Redis connection fails.
    pub async fn connect(config: &Config) -> Self {
        let client =
            Client::open(config.redis_url.as_str()).expect("Failed to create Redis client");

        let connection = ConnectionManager::new(client)
            .await
            .expect("Failed to connect to Redis");

        tracing::info!("Redis cache connected");

        Self { connection }
    }

    /// Try to connect to Redis, returning an error instead of panicking.
    pub async fn try_connect(config: &Config) -> Result<Self, RedisError> {
        let client = Client::open(config.redis_url.as_str())?;
        let connection = ConnectionManager::new(client).await?;

        Ok(Self { connection })
    }

    // =========================================================================
    // Generic Cache Operations
    // =========================================================================

    /// Get a value from cache.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        let mut conn = self.connection.clone();
        let value: Option<String> = conn.get(key).await.map_err(cache_error)?;

        match value {
            Some(json) => {
                let parsed = serde_json::from_str(&json)
                    .map_err(|e| AppError::Cache(format!("deserialization error: {}", e)))?;
                Ok(Some(parsed))
            }
            None => Ok(None),
        }
    }

    /// Set a value in cache with a TTL (in seconds).
    pub async fn set_with_ttl<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl_seconds: u64,
    ) -> AppResult<()> {
        let mut conn = self.connection.clone();
        let json = serde_json::to_string(value)
            .map_err(|e| AppError::Cache(format!("serialization error: {}", e)))?;

        conn.set_ex::<_, _, ()>(key, json, ttl_seconds)
            .await
            .map_err(cache_error)?;

        Ok(())
    }

    /// Delete a value from cache.
    pub async fn delete(&self, key: &str) -> AppResult<()> {
        let mut conn = self.connection.clone();
        let _: () = conn.del(key).await.map_err(cache_error)?;
        Ok(())
    }

    /// Check if a key exists in cache.
    pub async fn exists(&self, key: &str) -> AppResult<bool> {
        let mut conn = self.connection.clone();
        let exists: bool = conn.exists(key).await.map_err(cache_error)?;
        Ok(exists)
    }

    // =========================================================================
    // Rate Limiting Operations
    // =========================================================================

    /// Check and increment rate limit counter.
    /// Returns (current_count, is_allowed) tuple.
    pub async fn check_rate_limit(
        &self,
        identifier: &str,
        max_requests: u64,
        window_seconds: u64,
    ) -> AppResult<(u64, bool)> {
        let key = format!("{}{}", CACHE_PREFIX_RATE_LIMIT, identifier);
        let mut conn = self.connection.clone();

        // Check if key exists
        let exists: bool = conn.exists(&key).await.map_err(cache_error)?;

        if !exists {
            // First request in window
            let _: () = conn
                .set_ex(&key, 1i64, window_seconds)
                .await
                .map_err(cache_error)?;
            return Ok((1, true));
        }

        // Increment counter
        let count: i64 = conn.incr(&key, 1).await.map_err(cache_error)?;
        let count = count as u64;
        let allowed = count <= max_requests;

        Ok((count, allowed))
    }
}

#[async_trait]
impl AdminSessionStore for Cache {
    async fn put_session(
        &self,
        session_id: &str,
        data: &AdminSessionData,
        ttl_seconds: u64,
    ) -> AppResult<()> {
        let key = format!("{}{}", CACHE_PREFIX_SESSION, session_id);
        self.set_with_ttl(&key, data, ttl_seconds).await
    }

    async fn fetch_session(&self, session_id: &str) -> AppResult<Option<AdminSessionData>> {
        let key = format!("{}{}", CACHE_PREFIX_SESSION, session_id);
        self.get(&key).await
    }

    async fn remove_session(&self, session_id: &str) -> AppResult<()> {
        let key = format!("{}{}", CACHE_PREFIX_SESSION, session_id);
        self.delete(&key).await
    }
}

#[async_trait]
impl TokenRevocationStore for Cache {
    async fn revoke(&self, token_id: &Uuid, ttl_seconds: u64) -> AppResult<()> {
        let key = format!("{}{}", CACHE_PREFIX_REVOKED_TOKEN, token_id);
        self.set_with_ttl(&key, &true, ttl_seconds).await
    }

    async fn is_revoked(&self, token_id: &Uuid) -> AppResult<bool> {
        let key = format!("{}{}", CACHE_PREFIX_REVOKED_TOKEN, token_id);
        self.exists(&key).await
    }
}

/// Convert Redis error to AppError.
fn cache_error(e: RedisError) -> AppError {
    tracing::error!("Redis error: {}", e);
    AppError::Cache(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_prefixes() {
        assert_eq!(CACHE_PREFIX_SESSION, "session:");
        assert_eq!(CACHE_PREFIX_REVOKED_TOKEN, "revoked_token:");
        assert_eq!(CACHE_PREFIX_RATE_LIMIT, "rate_limit:");
    }
}
