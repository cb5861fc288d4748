//! Asset caching for the step image parser's offline worker.
//!
//! This crate provides:
//! - `KeyedCacheStore` - Named caches of responses keyed by request URL
//! - `InMemoryCacheStore` - Process-local store (for development/testing)
//! - `CachedAsset` - A stored response with its storage time
//! - `CacheKey` - Request URL normalized into a lookup key
//!
//! # Example
//!
//! ```ignore
//! use step_cache::{CacheKey, CachedAsset, InMemoryCacheStore, KeyedCacheStore};
//!
//! let store = InMemoryCacheStore::new();
//! store.open("step-parser-v1.0.0").await?;
//!
//! let key = CacheKey::parse("http://localhost/index.html")?;
//! store.put("step-parser-v1.0.0", key.clone(), CachedAsset::ok("<html>")).await?;
//! assert!(store.get("step-parser-v1.0.0", &key).await?.is_some());
//! ```

mod asset;
mod key;
mod store;

pub use asset::*;
pub use key::*;
pub use store::*;
