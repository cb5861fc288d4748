//! Install, activate and fetch handling.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use futures::future::{try_join_all, BoxFuture, FutureExt};
use http::header::{HeaderValue, CONTENT_TYPE};
use http::{Method, Response};
use step_cache::{CacheError, CacheKey, CachedAsset, KeyedCacheStore};
use step_core::{ConfigError, WorkerConfig, WorkerState};
use step_observability::StructuredLogger;

use crate::fetcher::{AssetRequest, FetchError, NetworkFetcher};
use crate::scope::WorkerScope;
use crate::stats::{WorkerStats, WorkerStatsSnapshot};

/// Content type of the offline notice.
pub const OFFLINE_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Worker lifecycle errors.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("invalid worker configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to cache {url} during install: {source}")]
    Install {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("cache storage error: {0}")]
    Cache(#[from] CacheError),

    #[error("cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: WorkerState,
    },
}

/// Result of a successful install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    /// Cache the manifest was written to.
    pub cache_name: String,
    /// Keys stored, in manifest order.
    pub cached: Vec<CacheKey>,
}

/// Result of activation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivationReport {
    /// Older cache generations that were deleted.
    pub deleted_caches: Vec<String>,
    /// Pages taken under control.
    pub claimed_clients: usize,
}

/// Where a worker response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    Cache,
    Network,
    Offline,
}

impl fmt::Display for ResponseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cache => write!(f, "cache"),
            Self::Network => write!(f, "network"),
            Self::Offline => write!(f, "offline"),
        }
    }
}

/// What happened to a background refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The network response replaced the cached entry.
    Stored,
    /// No response, or the write failed; the entry was kept.
    Failed,
}

/// Network refresh of an entry that was just served from the cache.
///
/// Runs independently of the response: nothing waits on it.
pub struct BackgroundRefresh {
    future: BoxFuture<'static, RefreshOutcome>,
}

impl BackgroundRefresh {
    /// Drive the refresh to completion.
    pub async fn run(self) -> RefreshOutcome {
        self.future.await
    }

    /// Run the refresh on the tokio runtime.
    pub fn spawn(self) -> tokio::task::JoinHandle<RefreshOutcome> {
        tokio::spawn(self.future)
    }
}

impl fmt::Debug for BackgroundRefresh {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackgroundRefresh").finish_non_exhaustive()
    }
}

/// A response produced by the worker.
#[derive(Debug)]
pub struct WorkerResponse {
    pub response: Response<Vec<u8>>,
    pub source: ResponseSource,
    /// Present for cache hits.
    pub refresh: Option<BackgroundRefresh>,
}

/// How the worker handles an intercepted request.
#[derive(Debug)]
pub enum FetchDisposition {
    /// Not intercepted; the host's default handling applies.
    Passthrough,
    /// Answered by the worker.
    Respond(WorkerResponse),
}

impl FetchDisposition {
    /// The response, if the worker answered.
    pub fn into_response(self) -> Option<WorkerResponse> {
        match self {
            Self::Passthrough => None,
            Self::Respond(response) => Some(response),
        }
    }
}

/// Build the synthesized offline response.
pub fn offline_response(body: &str) -> Response<Vec<u8>> {
    let mut response = Response::new(body.as_bytes().to_vec());
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(OFFLINE_CONTENT_TYPE));
    response
}

/// Cache-first asset worker for one cache version.
///
/// Install stores the manifest, activate removes every other cache
/// generation, and fetch handling serves same-origin GETs from the cache
/// while refreshing them in the background.
pub struct AssetCacheWorker {
    config: WorkerConfig,
    origin: String,
    store: Arc<dyn KeyedCacheStore>,
    fetcher: Arc<dyn NetworkFetcher>,
    scope: Arc<dyn WorkerScope>,
    state: Mutex<WorkerState>,
    stats: Arc<WorkerStats>,
    logger: StructuredLogger,
}

impl AssetCacheWorker {
    /// Create a worker in the `Installing` state.
    pub fn new(
        config: WorkerConfig,
        store: Arc<dyn KeyedCacheStore>,
        fetcher: Arc<dyn NetworkFetcher>,
        scope: Arc<dyn WorkerScope>,
    ) -> Result<Self, WorkerError> {
        config.validate()?;
        let origin = origin_of(&CacheKey::parse(&config.origin)?);

        Ok(Self {
            config,
            origin,
            store,
            fetcher,
            scope,
            state: Mutex::new(WorkerState::Installing),
            stats: Arc::new(WorkerStats::new()),
            logger: StructuredLogger::for_component("worker"),
        })
    }

    /// Replace the logger.
    pub fn with_logger(mut self, logger: StructuredLogger) -> Self {
        self.logger = logger;
        self
    }

    /// Worker configuration.
    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Current cache version name.
    pub fn cache_name(&self) -> &str {
        &self.config.cache_name
    }

    /// Current lifecycle state.
    pub fn state(&self) -> WorkerState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, next: WorkerState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = next;
    }

    /// Counter snapshot.
    pub fn stats(&self) -> WorkerStatsSnapshot {
        self.stats.snapshot()
    }

    /// Store every manifest URL in the current cache, then skip waiting.
    ///
    /// All-or-nothing: each URL must fetch with a success status before
    /// anything is written. On failure the worker becomes `Redundant`.
    pub async fn install(&self) -> Result<InstallReport, WorkerError> {
        let state = self.state();
        if state != WorkerState::Installing {
            return Err(WorkerError::InvalidState {
                operation: "install",
                state,
            });
        }

        match self.populate_cache().await {
            Ok(cached) => {
                self.scope.skip_waiting().await;
                self.set_state(WorkerState::Skipped);

                self.logger
                    .info_builder("Worker installed")
                    .field("cache", self.cache_name())
                    .field_i64("cached", cached.len() as i64)
                    .emit();

                Ok(InstallReport {
                    cache_name: self.config.cache_name.clone(),
                    cached,
                })
            }
            Err(err) => {
                self.set_state(WorkerState::Redundant);
                self.logger
                    .error_builder("Worker install failed")
                    .field("cache", self.cache_name())
                    .field("error", err.to_string())
                    .emit();
                Err(err)
            }
        }
    }

    async fn populate_cache(&self) -> Result<Vec<CacheKey>, WorkerError> {
        let cache = self.cache_name();
        self.store.open(cache).await?;

        let urls = self.config.manifest_urls();
        let entries = try_join_all(urls.iter().map(|url| self.fetch_manifest_entry(url))).await?;
        let keys = entries.iter().map(|(key, _)| key.clone()).collect();

        self.store.put_all(cache, entries).await?;
        Ok(keys)
    }

    async fn fetch_manifest_entry(&self, url: &str) -> Result<(CacheKey, CachedAsset), WorkerError> {
        let install_error = |source| WorkerError::Install {
            url: url.to_string(),
            source,
        };

        let request = AssetRequest::get(url).map_err(install_error)?;
        let key = CacheKey::from_uri(&request.uri)?;
        let response = self.fetcher.fetch(&request).await.map_err(install_error)?;

        if !response.status().is_success() {
            return Err(install_error(FetchError::Http {
                status: response.status().as_u16(),
                url: url.to_string(),
            }));
        }

        Ok((key, CachedAsset::from_response(response)))
    }

    /// Delete every other cache generation and claim open pages.
    ///
    /// A storage error during cleanup makes the worker `Redundant`.
    pub async fn activate(&self) -> Result<ActivationReport, WorkerError> {
        let state = self.state();
        if !state.is_installed() {
            return Err(WorkerError::InvalidState {
                operation: "activate",
                state,
            });
        }
        self.set_state(WorkerState::Activating);

        let deleted_caches = match self.delete_other_caches().await {
            Ok(deleted) => deleted,
            Err(err) => {
                self.set_state(WorkerState::Redundant);
                self.logger
                    .error_builder("Worker activation failed")
                    .field("cache", self.cache_name())
                    .field("error", err.to_string())
                    .emit();
                return Err(err);
            }
        };

        let claimed_clients = self.scope.claim_clients().await;
        self.set_state(WorkerState::Activated);

        self.logger
            .info_builder("Worker activated")
            .field("cache", self.cache_name())
            .field_i64("deleted", deleted_caches.len() as i64)
            .field_i64("claimed", claimed_clients as i64)
            .emit();

        Ok(ActivationReport {
            deleted_caches,
            claimed_clients,
        })
    }

    async fn delete_other_caches(&self) -> Result<Vec<String>, WorkerError> {
        let mut deleted = Vec::new();
        for name in self.store.cache_names().await? {
            if name != self.config.cache_name && self.store.delete_cache(&name).await? {
                deleted.push(name);
            }
        }
        Ok(deleted)
    }

    /// Whether a request is a same-origin GET this worker intercepts.
    pub fn intercepts(&self, request: &AssetRequest) -> bool {
        if request.method != Method::GET {
            return false;
        }
        CacheKey::from_uri(&request.uri)
            .map(|key| origin_of(&key) == self.origin)
            .unwrap_or(false)
    }

    /// Decide how to answer an intercepted request.
    ///
    /// Only an activated worker answers. Cache hits come back with a
    /// [`BackgroundRefresh`] the caller should run; misses go to the network
    /// and are not cached, falling back to the offline notice.
    pub async fn handle_fetch(&self, request: &AssetRequest) -> FetchDisposition {
        if self.state() != WorkerState::Activated || !self.intercepts(request) {
            self.stats.record_bypass();
            return FetchDisposition::Passthrough;
        }

        let key = match CacheKey::from_uri(&request.uri) {
            Ok(key) => key,
            Err(_) => {
                self.stats.record_bypass();
                return FetchDisposition::Passthrough;
            }
        };
        let log = self.logger.child(key.path());

        match self.store.get(self.cache_name(), &key).await {
            Ok(Some(asset)) => {
                self.stats.record_hit();
                log.debug("Served from cache");
                return FetchDisposition::Respond(WorkerResponse {
                    response: asset.into_response(),
                    source: ResponseSource::Cache,
                    refresh: Some(self.background_refresh(request.clone(), key, log)),
                });
            }
            Ok(None) => {}
            Err(err) => {
                log.debug_builder("Cache lookup failed; treating as miss")
                    .field("error", err.to_string())
                    .emit();
            }
        }

        match self.fetcher.fetch(request).await {
            Ok(response) => {
                self.stats.record_network();
                log.debug_builder("Served from network")
                    .field_i64("status", i64::from(response.status().as_u16()))
                    .emit();
                FetchDisposition::Respond(WorkerResponse {
                    response,
                    source: ResponseSource::Network,
                    refresh: None,
                })
            }
            Err(err) => {
                self.stats.record_offline();
                log.warn_builder("Not cached and network failed; serving offline notice")
                    .field("error", err.to_string())
                    .emit();
                FetchDisposition::Respond(WorkerResponse {
                    response: offline_response(&self.config.offline_body),
                    source: ResponseSource::Offline,
                    refresh: None,
                })
            }
        }
    }

    /// Answer a request, spawning any background refresh on tokio.
    ///
    /// `None` means the request was not intercepted.
    pub async fn respond(&self, request: &AssetRequest) -> Option<Response<Vec<u8>>> {
        let WorkerResponse {
            response, refresh, ..
        } = self.handle_fetch(request).await.into_response()?;

        if let Some(refresh) = refresh {
            refresh.spawn();
        }
        Some(response)
    }

    fn background_refresh(
        &self,
        request: AssetRequest,
        key: CacheKey,
        log: StructuredLogger,
    ) -> BackgroundRefresh {
        let store = Arc::clone(&self.store);
        let fetcher = Arc::clone(&self.fetcher);
        let stats = Arc::clone(&self.stats);
        let cache = self.config.cache_name.clone();

        let future = async move {
            let outcome = match fetcher.fetch(&request).await {
                Ok(response) => {
                    let asset = CachedAsset::from_response(response);
                    match store.put(&cache, key, asset).await {
                        Ok(()) => RefreshOutcome::Stored,
                        Err(err) => {
                            log.debug_builder("Refresh could not be stored")
                                .field("error", err.to_string())
                                .emit();
                            RefreshOutcome::Failed
                        }
                    }
                }
                Err(err) => {
                    log.debug_builder("Refresh fetch failed; keeping cached copy")
                        .field("error", err.to_string())
                        .emit();
                    RefreshOutcome::Failed
                }
            };

            match outcome {
                RefreshOutcome::Stored => stats.record_refresh_stored(),
                RefreshOutcome::Failed => stats.record_refresh_failed(),
            }
            outcome
        };

        BackgroundRefresh {
            future: future.boxed(),
        }
    }
}

impl fmt::Debug for AssetCacheWorker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetCacheWorker")
            .field("cache_name", &self.config.cache_name)
            .field("origin", &self.origin)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

fn origin_of(key: &CacheKey) -> String {
    let url = key.as_str();
    let path_len = key.path().len();
    url[..url.len() - path_len].to_string()
}
