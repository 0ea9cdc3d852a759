//! Redis cache bridge.
//!
//! Keys are scoped as `<realm>:<project_id>:<key>` so projects never see each
//! other's entries. A missing key is `Ok(None)`, not an error.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    Connection(String),

    #[error("Cache command failed: {0}")]
    Command(String),
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Raw key/value store behind the bridge.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Set a value; a zero TTL stores it without expiry.
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()>;

    async fn del(&self, key: &str) -> CacheResult<()>;
}

// ============================================================================
// Redis store
// ============================================================================

pub struct RedisCacheStore {
    conn: ConnectionManager,
}

impl RedisCacheStore {
    pub async fn connect(url: &str) -> CacheResult<Self> {
        let client =
            redis::Client::open(url).map_err(|e| CacheError::Connection(e.to_string()))?;
        let conn = client
            .get_connection_manager()
            .await
            .map_err(|e| CacheError::Connection(e.to_string()))?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.conn.clone();
        redis::cmd("GET")
            .arg(key)
            .query_async::<Option<String>>(&mut conn)
            .await
            .map_err(|e| CacheError::Command(e.to_string()))
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        let mut conn = self.conn.clone();
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value);
        if ttl.as_secs() > 0 {
            cmd.arg("EX").arg(ttl.as_secs());
        }
        cmd.query_async::<()>(&mut conn)
            .await
            .map_err(|e| CacheError::Command(e.to_string()))
    }

    async fn del(&self, key: &str) -> CacheResult<()> {
        let mut conn = self.conn.clone();
        redis::cmd("DEL")
            .arg(key)
            .query_async::<i64>(&mut conn)
            .await
            .map(|_| ())
            .map_err(|e| CacheError::Command(e.to_string()))
    }
}

// ============================================================================
// In-memory store
// ============================================================================

/// Process-local store used when no Redis URL is configured.
#[derive(Default)]
pub struct InMemoryCacheStore {
    entries: RwLock<HashMap<String, (String, Option<Instant>)>>,
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut entries = self.entries.write().await;
        let now = Instant::now();
        let expired = matches!(entries.get(key), Some((_, Some(expires))) if *expires <= now);
        if expired {
            entries.remove(key);
            return Ok(None);
        }
        Ok(entries.get(key).map(|(value, _)| value.clone()))
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        let expires = (!ttl.is_zero()).then(|| Instant::now() + ttl);
        self.entries
            .write()
            .await
            .insert(key.to_string(), (value.to_string(), expires));
        Ok(())
    }

    async fn del(&self, key: &str) -> CacheResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

// ============================================================================
// Bridge
// ============================================================================

/// Project-scoped view over a [`CacheStore`].
#[derive(Clone)]
pub struct CacheBridge {
    store: Arc<dyn CacheStore>,
    realm: String,
    default_ttl: Duration,
}

impl CacheBridge {
    pub fn new(store: Arc<dyn CacheStore>, realm: impl Into<String>, default_ttl: Duration) -> Self {
        Self {
            store,
            realm: realm.into(),
            default_ttl,
        }
    }

    pub fn scoped_key(&self, project_id: &str, key: &str) -> String {
        format!("{}:{}:{}", self.realm, project_id, key)
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub async fn get(&self, key: &str, project_id: &str) -> CacheResult<Option<String>> {
        self.store.get(&self.scoped_key(project_id, key)).await
    }

    pub async fn set_x(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
        project_id: &str,
    ) -> CacheResult<()> {
        self.store
            .set_ex(&self.scoped_key(project_id, key), value, ttl)
            .await
    }

    pub async fn del(&self, key: &str, project_id: &str) -> CacheResult<()> {
        self.store.del(&self.scoped_key(project_id, key)).await
    }
}
