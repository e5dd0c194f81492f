//! Redis-backed session storage

use async_trait::async_trait;
use redis::{AsyncCommands, Client};

use crate::error::{AppError, AppResult};

use super::sessions::SessionStore;

/// Session data kept in one Redis hash per session, `session:<id>`
#[derive(Clone)]
pub struct RedisSessionStore {
    client: Client,
    ttl_seconds: u64,
}

impl RedisSessionStore {
    /// Connect and check the server answers
    pub async fn new(url: &str, ttl_seconds: u64) -> AppResult<Self> {
        let client = Client::open(url)
            .map_err(|e| AppError::Internal(format!("Failed to create Redis client: {}", e)))?;

        let mut conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to connect to Redis: {}", e)))?;

        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| AppError::Internal(format!("Redis connection test failed: {}", e)))?;

        Ok(Self { client, ttl_seconds })
    }

    async fn connection(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to get Redis connection: {}", e)))
    }

    fn key(session_id: &str) -> String {
        format!("session:{}", session_id)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn get_int(&self, session_id: &str, field: &str) -> AppResult<Option<i64>> {
        let mut conn = self.connection().await?;
        let value: Option<i64> = conn
            .hget(Self::key(session_id), field)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to read session from Redis: {}", e)))?;
        Ok(value)
    }

    async fn set_int(&self, session_id: &str, field: &str, value: i64) -> AppResult<()> {
        let mut conn = self.connection().await?;
        let key = Self::key(session_id);

        conn.hset::<_, _, _, ()>(&key, field, value)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to write session to Redis: {}", e)))?;
        // Every write pushes the session expiry back
        conn.expire::<_, ()>(&key, self.ttl_seconds as i64)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to refresh session expiry: {}", e)))?;

        Ok(())
    }
}
