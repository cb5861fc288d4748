//! Named cache storage.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::asset::CachedAsset;
use crate::key::CacheKey;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Cache operation errors.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Write to a cache that was never opened.
    #[error("cache not open: {0}")]
    UnknownCache(String),

    /// URL that cannot be turned into a key.
    #[error("invalid cache key: {0}")]
    InvalidKey(String),

    /// Backend storage error.
    #[error("storage error: {0}")]
    Storage(String),
}

/// Named caches of responses keyed by request URL.
///
/// Mirrors platform cache storage: caches are created by opening them,
/// enumerated in creation order and deleted whole.
#[async_trait]
pub trait KeyedCacheStore: Send + Sync {
    /// Open a cache, creating it if absent.
    async fn open(&self, cache: &str) -> CacheResult<()>;

    /// Names of all existing caches, in creation order.
    async fn cache_names(&self) -> CacheResult<Vec<String>>;

    /// Delete a cache and its entries. Returns whether it existed.
    async fn delete_cache(&self, cache: &str) -> CacheResult<bool>;

    /// Look up an entry. A missing cache is a miss.
    async fn get(&self, cache: &str, key: &CacheKey) -> CacheResult<Option<CachedAsset>>;

    /// Store an entry, replacing any existing one for the key.
    async fn put(&self, cache: &str, key: CacheKey, asset: CachedAsset) -> CacheResult<()>;

    /// Keys in a cache, in first-insertion order.
    async fn keys(&self, cache: &str) -> CacheResult<Vec<CacheKey>>;

    /// Whether a cache exists.
    async fn has_cache(&self, cache: &str) -> CacheResult<bool> {
        Ok(self.cache_names().await?.iter().any(|name| name == cache))
    }

    /// Store several entries.
    async fn put_all(&self, cache: &str, entries: Vec<(CacheKey, CachedAsset)>) -> CacheResult<()> {
        for (key, asset) in entries {
            self.put(cache, key, asset).await?;
        }
        Ok(())
    }
}

#[derive(Debug)]
struct NamedCache {
    name: String,
    entries: Vec<(CacheKey, CachedAsset)>,
}

/// In-memory cache store (for development/testing).
#[derive(Debug, Default)]
pub struct InMemoryCacheStore {
    caches: RwLock<Vec<NamedCache>>,
}

impl InMemoryCacheStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> CacheResult<RwLockReadGuard<'_, Vec<NamedCache>>> {
        self.caches
            .read()
            .map_err(|_| CacheError::Storage("cache store lock poisoned".to_string()))
    }

    fn write(&self) -> CacheResult<RwLockWriteGuard<'_, Vec<NamedCache>>> {
        self.caches
            .write()
            .map_err(|_| CacheError::Storage("cache store lock poisoned".to_string()))
    }
}

#[async_trait]
impl KeyedCacheStore for InMemoryCacheStore {
    async fn open(&self, cache: &str) -> CacheResult<()> {
        let mut caches = self.write()?;
        if !caches.iter().any(|c| c.name == cache) {
            caches.push(NamedCache {
                name: cache.to_string(),
                entries: Vec::new(),
            });
        }
        Ok(())
    }

    async fn cache_names(&self) -> CacheResult<Vec<String>> {
        Ok(self.read()?.iter().map(|c| c.name.clone()).collect())
    }

    async fn delete_cache(&self, cache: &str) -> CacheResult<bool> {
        let mut caches = self.write()?;
        let before = caches.len();
        caches.retain(|c| c.name != cache);
        Ok(caches.len() != before)
    }

    async fn get(&self, cache: &str, key: &CacheKey) -> CacheResult<Option<CachedAsset>> {
        let caches = self.read()?;
        Ok(caches
            .iter()
            .find(|c| c.name == cache)
            .and_then(|c| c.entries.iter().find(|(k, _)| k == key))
            .map(|(_, asset)| asset.clone()))
    }

    async fn put(&self, cache: &str, key: CacheKey, asset: CachedAsset) -> CacheResult<()> {
        let mut caches = self.write()?;
        let named = caches
            .iter_mut()
            .find(|c| c.name == cache)
            .ok_or_else(|| CacheError::UnknownCache(cache.to_string()))?;

        match named.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = asset,
            None => named.entries.push((key, asset)),
        }
        Ok(())
    }

    async fn keys(&self, cache: &str) -> CacheResult<Vec<CacheKey>> {
        let caches = self.read()?;
        Ok(caches
            .iter()
            .find(|c| c.name == cache)
            .map(|c| c.entries.iter().map(|(k, _)| k.clone()).collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(path: &str) -> CacheKey {
        CacheKey::parse(&format!("http://localhost{}", path)).unwrap()
    }

    #[tokio::test]
    async fn test_open_is_idempotent() {
        let store = InMemoryCacheStore::new();
        store.open("v1").await.unwrap();
        store.open("v2").await.unwrap();
        store.open("v1").await.unwrap();

        assert_eq!(store.cache_names().await.unwrap(), vec!["v1", "v2"]);
        assert!(store.has_cache("v2").await.unwrap());
    }

    #[tokio::test]
    async fn test_put_replaces_in_place() {
        let store = InMemoryCacheStore::new();
        store.open("v1").await.unwrap();
        store.put("v1", key("/a"), CachedAsset::ok("old")).await.unwrap();
        store.put("v1", key("/b"), CachedAsset::ok("b")).await.unwrap();
        store.put("v1", key("/a"), CachedAsset::ok("new")).await.unwrap();

        let hit = store.get("v1", &key("/a")).await.unwrap().unwrap();
        assert_eq!(hit.body, b"new");
        assert_eq!(store.keys("v1").await.unwrap(), vec![key("/a"), key("/b")]);
    }

    #[tokio::test]
    async fn test_caches_are_isolated() {
        let store = InMemoryCacheStore::new();
        store.open("v1").await.unwrap();
        store.open("v2").await.unwrap();
        store.put("v1", key("/a"), CachedAsset::ok("a")).await.unwrap();

        assert!(store.get("v2", &key("/a")).await.unwrap().is_none());
        assert!(store.get("missing", &key("/a")).await.unwrap().is_none());
        assert!(store.keys("missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_put_requires_open_cache() {
        let store = InMemoryCacheStore::new();
        let result = store.put("v1", key("/a"), CachedAsset::ok("a")).await;
        assert!(matches!(result, Err(CacheError::UnknownCache(name)) if name == "v1"));
    }

    #[tokio::test]
    async fn test_delete_cache() {
        let store = InMemoryCacheStore::new();
        store.open("v1").await.unwrap();
        store.put("v1", key("/a"), CachedAsset::ok("a")).await.unwrap();

        assert!(store.delete_cache("v1").await.unwrap());
        assert!(!store.delete_cache("v1").await.unwrap());
        assert!(store.get("v1", &key("/a")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_all() {
        let store = InMemoryCacheStore::new();
        store.open("v1").await.unwrap();
        store
            .put_all(
                "v1",
                vec![
                    (key("/"), CachedAsset::ok("index")),
                    (key("/app.js"), CachedAsset::ok("js")),
                ],
            )
            .await
            .unwrap();

        assert_eq!(store.keys("v1").await.unwrap().len(), 2);
    }
}
