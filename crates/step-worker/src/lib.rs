//! Offline asset worker for the step image parser.
//!
//! This crate provides:
//! - `AssetCacheWorker` - Install / activate / fetch lifecycle over a named cache
//! - `NetworkFetcher` - Live network access, with `StaticFetcher` for tests
//! - `WorkerScope` - Host controls (skip waiting, claim clients)
//! - `BackgroundRefresh` - Stale-while-revalidate update of a served entry
//! - `WorkerStats` - Hit, miss and fallback counters
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use step_cache::InMemoryCacheStore;
//! use step_core::WorkerConfig;
//! use step_worker::{AssetCacheWorker, AssetRequest, InMemoryScope, StaticFetcher};
//!
//! let worker = AssetCacheWorker::new(
//!     WorkerConfig::default(),
//!     Arc::new(InMemoryCacheStore::new()),
//!     Arc::new(StaticFetcher::new().with_route("http://localhost/", "<html>")),
//!     Arc::new(InMemoryScope::new()),
//! )?;
//!
//! worker.install().await?;
//! worker.activate().await?;
//!
//! let response = worker.respond(&AssetRequest::get("http://localhost/")?).await;
//! ```

mod fetcher;
mod scope;
mod stats;
mod worker;

pub use fetcher::*;
pub use scope::*;
pub use stats::*;
pub use worker::*;
