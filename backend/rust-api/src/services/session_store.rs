use async_trait::async_trait;
use redis::aio::ConnectionManager;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::metrics::track_cache_operation;
use crate::models::{GameSession, User};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Failed to (de)serialize cached value: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Cache for game sessions and users.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn store_session(&self, session: &GameSession) -> Result<(), StoreError>;
    async fn fetch_session(&self, session_id: &str) -> Result<Option<GameSession>, StoreError>;
    async fn store_user(&self, user: &User) -> Result<(), StoreError>;
    async fn fetch_user(&self, user_id: &str) -> Result<Option<User>, StoreError>;
}

fn session_key(session_id: &str) -> String {
    format!("session:{}", session_id)
}

fn user_key(user_id: &str) -> String {
    format!("user:{}", user_id)
}

pub struct RedisSessionStore {
    redis: ConnectionManager,
    ttl_seconds: u64,
}

impl RedisSessionStore {
    pub fn new(redis: ConnectionManager, ttl_seconds: u64) -> Self {
        Self { redis, ttl_seconds }
    }

    async fn set_json<T: Serialize + Sync>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let payload = serde_json::to_string(value)?;
        let mut conn = self.redis.clone();

        track_cache_operation("setex", async {
            redis::cmd("SETEX")
                .arg(key)
                .arg(self.ttl_seconds)
                .arg(payload)
                .query_async::<()>(&mut conn)
                .await
        })
        .await?;

        Ok(())
    }

    async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let mut conn = self.redis.clone();

        let payload: Option<String> = track_cache_operation("get", async {
            redis::cmd("GET").arg(key).query_async(&mut conn).await
        })
        .await?;

        match payload {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn store_session(&self, session: &GameSession) -> Result<(), StoreError> {
        self.set_json(&session_key(&session.id), session).await?;
        tracing::debug!("Cached session {} (ttl={}s)", session.id, self.ttl_seconds);
        Ok(())
    }

    async fn fetch_session(&self, session_id: &str) -> Result<Option<GameSession>, StoreError> {
        self.get_json(&session_key(session_id)).await
    }

    async fn store_user(&self, user: &User) -> Result<(), StoreError> {
        self.set_json(&user_key(&user.id), user).await?;
        tracing::debug!("Cached user {}", user.id);
        Ok(())
    }

    async fn fetch_user(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        self.get_json(&user_key(user_id)).await
    }
}

/// Process-local store for tests and runs without Redis. Entries never expire.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, GameSession>>,
    users: RwLock<HashMap<String, User>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn store_session(&self, session: &GameSession) -> Result<(), StoreError> {
        self.sessions
            .write()
            .await
            .insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn fetch_session(&self, session_id: &str) -> Result<Option<GameSession>, StoreError> {
        Ok(self.sessions.read().await.get(session_id).cloned())
    }

    async fn store_user(&self, user: &User) -> Result<(), StoreError> {
        self.users.write().await.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn fetch_user(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(user_id).cloned())
    }
}
