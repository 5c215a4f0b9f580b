//! Time- and size-bounded store of resolved articles.
//!
//! Eviction is by insertion order, not recency: when the store is full the
//! oldest inserted key goes, however often it has been read since.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use citalex_core::ArticleContent;
use indexmap::IndexMap;
use tokio::time::Instant;
use tracing::debug;

use crate::config::PreviewConfig;

/// One cached article and when it was fetched.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub data: ArticleContent,
    pub fetched_at: Instant,
}

/// A cache instance shared by every preview surface that should see the same entries.
pub type SharedPreviewCache = Arc<Mutex<PreviewCache>>;

/// Lock a shared cache, recovering the data if a holder panicked.
pub fn lock(cache: &SharedPreviewCache) -> MutexGuard<'_, PreviewCache> {
    cache.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug)]
pub struct PreviewCache {
    entries: IndexMap<String, CacheEntry>,
    ttl: Duration,
    capacity: usize,
}

impl Default for PreviewCache {
    fn default() -> Self {
        Self::from_config(&PreviewConfig::default())
    }
}

impl PreviewCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
            ttl,
            capacity,
        }
    }

    pub fn from_config(config: &PreviewConfig) -> Self {
        Self::new(config.cache_ttl, config.cache_capacity)
    }

    pub fn into_shared(self) -> SharedPreviewCache {
        Arc::new(Mutex::new(self))
    }

    /// Fresh data for `key`, evicting the entry if it has outlived the TTL.
    pub fn get(&mut self, key: &str) -> Option<ArticleContent> {
        self.get_at(key, Instant::now())
    }

    pub fn get_at(&mut self, key: &str, now: Instant) -> Option<ArticleContent> {
        let entry = self.entries.get(key)?;
        if now.saturating_duration_since(entry.fetched_at) <= self.ttl {
            return Some(entry.data.clone());
        }
        self.entries.shift_remove(key);
        debug!(key, "preview cache entry expired");
        None
    }

    /// Store `data` under `key`.
    ///
    /// Expired entries are swept first. If the store is still full, the
    /// earliest-inserted key is evicted. Re-putting a present key refreshes it
    /// in place without evicting anything.
    pub fn put(&mut self, key: impl Into<String>, data: ArticleContent) {
        self.put_at(key, data, Instant::now());
    }

    pub fn put_at(&mut self, key: impl Into<String>, data: ArticleContent, now: Instant) {
        let key = key.into();
        self.sweep(now);

        if let Some(entry) = self.entries.get_mut(&key) {
            *entry = CacheEntry {
                data,
                fetched_at: now,
            };
            return;
        }

        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            if let Some((evicted, _)) = self.entries.shift_remove_index(0) {
                debug!(key = %evicted, "preview cache full, evicted oldest entry");
            }
        }
        self.entries.insert(
            key,
            CacheEntry {
                data,
                fetched_at: now,
            },
        );
    }

    /// Drop every entry older than the TTL.
    fn sweep(&mut self, now: Instant) {
        let ttl = self.ttl;
        self.entries
            .retain(|_, entry| now.saturating_duration_since(entry.fetched_at) <= ttl);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
