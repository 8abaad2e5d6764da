//! Key-value cache used for OAuth state and transient credentials
//!
//! The integration only needs `set` with an expiry, `get` and `delete`.
//! [`MemoryCache`] keeps entries in-process; a networked store can be plugged
//! in by implementing [`KeyValueCache`].

use crate::error::Result;
use anyhow::anyhow;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;
use tracing::trace;

#[async_trait]
pub trait KeyValueCache: Send + Sync {
    /// Store `value` under `key`, replacing any previous value
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()>;

    /// Fetch the value for `key` if present and not expired
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn delete(&self, key: &str) -> Result<()>;
}

struct CacheEntry {
    value: String,
    expires_at: Instant,
}

/// In-process cache with per-entry expiry
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_entries<T>(&self, f: impl FnOnce(&mut HashMap<String, CacheEntry>) -> T) -> Result<T> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow!("cache lock poisoned"))?;
        Ok(f(&mut entries))
    }
}

#[async_trait]
impl KeyValueCache for MemoryCache {
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        trace!("Cache set: {} (ttl {:?})", key, ttl);
        let expires_at = Instant::now() + ttl;
        self.with_entries(|entries| {
            entries.insert(key.to_string(), CacheEntry { value, expires_at });
        })
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let now = Instant::now();
        self.with_entries(|entries| {
            let expired = match entries.get(key) {
                Some(entry) if entry.expires_at > now => return Some(entry.value.clone()),
                Some(_) => true,
                None => false,
            };
            if expired {
                trace!("Cache entry expired: {}", key);
                entries.remove(key);
            }
            None
        })
    }

    async fn delete(&self, key: &str) -> Result<()> {
        trace!("Cache delete: {}", key);
        self.with_entries(|entries| {
            entries.remove(key);
        })
    }
}
