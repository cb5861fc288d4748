//! Network access for the worker.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};

use async_trait::async_trait;
use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, Method, Request, Response, StatusCode, Uri};
use step_cache::{CacheKey, CachedAsset};

/// Error type for fetch operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Network unavailable")]
    Offline,

    #[error("Connection error for {url}: {message}")]
    Connection { url: String, message: String },

    #[error("HTTP error: {status} for {url}")]
    Http { status: u16, url: String },
}

/// An intercepted request, detached from any body.
#[derive(Debug, Clone)]
pub struct AssetRequest {
    /// Request method.
    pub method: Method,
    /// Absolute request URI.
    pub uri: Uri,
    /// Request headers.
    pub headers: HeaderMap,
}

impl AssetRequest {
    /// Create a request.
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            method,
            uri,
            headers: HeaderMap::new(),
        }
    }

    /// Create a GET request for a URL.
    pub fn get(url: &str) -> Result<Self, FetchError> {
        let uri = url
            .parse()
            .map_err(|_| FetchError::InvalidUrl(url.to_string()))?;
        Ok(Self::new(Method::GET, uri))
    }

    /// Add a header.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Request URL as a string.
    pub fn url(&self) -> String {
        self.uri.to_string()
    }
}

impl<B> From<&Request<B>> for AssetRequest {
    fn from(request: &Request<B>) -> Self {
        Self {
            method: request.method().clone(),
            uri: request.uri().clone(),
            headers: request.headers().clone(),
        }
    }
}

/// Live network access.
///
/// Returns any response the server produced, including error statuses;
/// `Err` means no response arrived.
#[async_trait]
pub trait NetworkFetcher: Send + Sync {
    async fn fetch(&self, request: &AssetRequest) -> Result<Response<Vec<u8>>, FetchError>;
}

#[derive(Debug, Clone)]
enum Route {
    Respond(CachedAsset),
    Fail(String),
}

/// Fetcher answering from a fixed route table (for development/testing).
///
/// Unknown URLs get `404 Not Found`. Every call is logged, including calls
/// made while offline.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    routes: RwLock<HashMap<String, Route>>,
    offline: AtomicBool,
    requests: Mutex<Vec<String>>,
}

impl StaticFetcher {
    /// Create a fetcher with no routes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a `200 OK` route.
    pub fn with_route(self, url: &str, body: impl Into<Vec<u8>>) -> Self {
        self.set_route(url, CachedAsset::ok(body));
        self
    }

    /// Add a route answering with a full response.
    pub fn with_asset(self, url: &str, asset: CachedAsset) -> Self {
        self.set_route(url, asset);
        self
    }

    /// Add or replace a route.
    pub fn set_route(&self, url: &str, asset: CachedAsset) {
        self.insert(url, Route::Respond(asset));
    }

    /// Make a URL fail with a connection error.
    pub fn fail_route(&self, url: &str, message: impl Into<String>) {
        self.insert(url, Route::Fail(message.into()));
    }

    /// Fail every request with [`FetchError::Offline`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// URLs fetched so far, in call order.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of fetches for a URL.
    pub fn request_count(&self, url: &str) -> usize {
        let url = route_key(url);
        self.requests().iter().filter(|r| **r == url).count()
    }

    fn insert(&self, url: &str, route: Route) {
        self.routes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(route_key(url), route);
    }
}

fn route_key(url: &str) -> String {
    CacheKey::parse(url)
        .map(|key| key.to_string())
        .unwrap_or_else(|_| url.to_string())
}

#[async_trait]
impl NetworkFetcher for StaticFetcher {
    async fn fetch(&self, request: &AssetRequest) -> Result<Response<Vec<u8>>, FetchError> {
        let url = route_key(&request.url());
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.clone());

        if self.offline.load(Ordering::SeqCst) {
            return Err(FetchError::Offline);
        }

        let route = self
            .routes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&url)
            .cloned();

        match route {
            Some(Route::Respond(asset)) => Ok(asset.into_response()),
            Some(Route::Fail(message)) => Err(FetchError::Connection { url, message }),
            None => {
                let mut response = Response::new(b"Not Found".to_vec());
                *response.status_mut() = StatusCode::NOT_FOUND;
                Ok(response)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_routes_and_unknown_urls() {
        let fetcher = StaticFetcher::new().with_route("http://localhost/a", "a");

        let hit = fetcher.fetch(&AssetRequest::get("http://localhost/a").unwrap()).await.unwrap();
        assert_eq!(hit.status(), StatusCode::OK);
        assert_eq!(hit.body(), b"a");

        let miss = fetcher.fetch(&AssetRequest::get("http://localhost/b").unwrap()).await.unwrap();
        assert_eq!(miss.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_offline_and_failed_routes() {
        let fetcher = StaticFetcher::new().with_route("http://localhost/a", "a");
        fetcher.fail_route("http://localhost/b", "reset");

        let failed = fetcher.fetch(&AssetRequest::get("http://localhost/b").unwrap()).await;
        assert!(matches!(failed, Err(FetchError::Connection { message, .. }) if message == "reset"));

        fetcher.set_offline(true);
        let offline = fetcher.fetch(&AssetRequest::get("http://localhost/a").unwrap()).await;
        assert_eq!(offline.unwrap_err(), FetchError::Offline);

        assert_eq!(fetcher.request_count("http://localhost/a"), 1);
        assert_eq!(fetcher.requests().len(), 2);
    }

    #[test]
    fn test_request_from_http_request() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("http://localhost/form")
            .body(())
            .unwrap();
        let asset_request = AssetRequest::from(&request);

        assert_eq!(asset_request.method, Method::POST);
        assert_eq!(asset_request.url(), "http://localhost/form");
    }

    #[test]
    fn test_invalid_url() {
        assert!(matches!(
            AssetRequest::get("http://bad host/"),
            Err(FetchError::InvalidUrl(_))
        ));
    }
}
