//! Stored responses.

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::{HeaderMap, Response, StatusCode};

/// A response held in a named cache.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedAsset {
    /// Response status.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Response body.
    pub body: Vec<u8>,
    /// When the entry was written.
    pub stored_at: DateTime<Utc>,
}

impl CachedAsset {
    /// Create an asset with the given status and body.
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
            stored_at: Utc::now(),
        }
    }

    /// Create a `200 OK` asset.
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self::new(StatusCode::OK, body)
    }

    /// Add a header.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Set the content type.
    pub fn with_content_type(self, content_type: &'static str) -> Self {
        self.with_header(CONTENT_TYPE, HeaderValue::from_static(content_type))
    }

    /// Content type header, if present and valid UTF-8.
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
    }

    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Body as text, with invalid UTF-8 replaced.
    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Time since the entry was written.
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now.signed_duration_since(self.stored_at)
    }

    /// Build from an `http` response, stamped with the current time.
    pub fn from_response(response: Response<Vec<u8>>) -> Self {
        let (parts, body) = response.into_parts();
        Self {
            status: parts.status,
            headers: parts.headers,
            body,
            stored_at: Utc::now(),
        }
    }

    /// Convert into an `http` response.
    pub fn into_response(self) -> Response<Vec<u8>> {
        let mut response = Response::new(self.body);
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_conversion_keeps_status_and_headers() {
        let asset = CachedAsset::new(StatusCode::NOT_FOUND, "missing")
            .with_content_type("text/plain");

        let response = asset.clone().into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/plain");

        let back = CachedAsset::from_response(response);
        assert_eq!(back.body_text(), "missing");
        assert_eq!(back.content_type(), Some("text/plain"));
        assert!(!back.is_success());
    }

    #[test]
    fn test_age() {
        let asset = CachedAsset::ok("x");
        let later = asset.stored_at + chrono::Duration::seconds(30);
        assert_eq!(asset.age(later).num_seconds(), 30);
    }
}
