//! Per-session key/value data and the landing page visit counter

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::AppResult;

/// Session key holding the landing page visit counter
pub const NUM_VISITS: &str = "num_visits";

/// Integer values scoped to one session identifier
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get_int(&self, session_id: &str, field: &str) -> AppResult<Option<i64>>;

    async fn set_int(&self, session_id: &str, field: &str, value: i64) -> AppResult<()>;
}

/// Sessions held in process memory, lost on restart
#[derive(Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, HashMap<String, i64>>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get_int(&self, session_id: &str, field: &str) -> AppResult<Option<i64>> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(session_id)
            .and_then(|data| data.get(field))
            .copied())
    }

    async fn set_int(&self, session_id: &str, field: &str, value: i64) -> AppResult<()> {
        self.sessions
            .write()
            .await
            .entry(session_id.to_string())
            .or_default()
            .insert(field.to_string(), value);
        Ok(())
    }
}

#[derive(Clone)]
pub struct SessionsService {
    store: Arc<dyn SessionStore>,
}

impl SessionsService {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Count a landing page visit; returns the count before this visit
    pub async fn record_visit(&self, session_id: &str) -> AppResult<i64> {
        let num_visits = self
            .store
            .get_int(session_id, NUM_VISITS)
            .await?
            .unwrap_or(0);
        self.store
            .set_int(session_id, NUM_VISITS, num_visits + 1)
            .await?;
        Ok(num_visits)
    }
}
