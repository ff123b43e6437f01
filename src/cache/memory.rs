//! In-memory cache store
//!
//! Survives for as long as the value lives. Tests clone a store between two
//! coordinators to simulate a second process start with a warm cache.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;

use super::{CacheResult, CacheStore};

/// Shared in-memory URL-keyed store
#[derive(Clone, Debug, Default)]
pub struct MemoryCacheStore {
    entries: Arc<RwLock<HashMap<String, Bytes>>>,
}

impl MemoryCacheStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Insert an entry directly, bypassing the coordinator
    pub fn prewarm(&self, url: impl Into<String>, bytes: Bytes) {
        self.entries.write().insert(url.into(), bytes);
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn lookup(&self, url: &str) -> CacheResult<Option<Bytes>> {
        Ok(self.entries.read().get(url).cloned())
    }

    async fn store(&self, url: &str, bytes: Bytes) -> CacheResult<()> {
        self.entries.write().insert(url.to_string(), bytes);
        Ok(())
    }

    async fn contains(&self, url: &str) -> CacheResult<bool> {
        Ok(self.entries.read().contains_key(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn test_store_and_lookup() {
        let store = MemoryCacheStore::new();
        assert!(store.is_empty());
        assert_eq!(block_on(store.lookup("a.png")), Ok(None));

        block_on(store.store("a.png", Bytes::from_static(b"png"))).unwrap();
        assert_eq!(
            block_on(store.lookup("a.png")),
            Ok(Some(Bytes::from_static(b"png")))
        );
        assert_eq!(block_on(store.contains("a.png")), Ok(true));
    }

    #[test]
    fn test_clones_share_entries() {
        let store = MemoryCacheStore::new();
        let other = store.clone();
        other.prewarm("hero.mp4", Bytes::from_static(b"mp4"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_duplicate_writes_are_idempotent() {
        let store = MemoryCacheStore::new();
        block_on(store.store("a.png", Bytes::from_static(b"png"))).unwrap();
        block_on(store.store("a.png", Bytes::from_static(b"png"))).unwrap();
        assert_eq!(store.len(), 1);
    }
}
