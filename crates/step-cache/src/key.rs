//! Cache key derivation.

use std::fmt;

use http::Uri;
use serde::{Deserialize, Serialize};

use crate::store::{CacheError, CacheResult};

/// Lookup key for a cached asset: the absolute request URL.
///
/// Scheme and host are lowercased and an empty path becomes `/`, so
/// `HTTP://Example.com` and `http://example.com/` share an entry. The query
/// string is part of the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derive a key from an absolute URI.
    pub fn from_uri(uri: &Uri) -> CacheResult<Self> {
        let (Some(scheme), Some(authority)) = (uri.scheme_str(), uri.authority()) else {
            return Err(CacheError::InvalidKey(uri.to_string()));
        };

        let path = match uri.path() {
            "" => "/",
            path => path,
        };

        let mut key = format!(
            "{}://{}{}",
            scheme.to_ascii_lowercase(),
            authority.as_str().to_ascii_lowercase(),
            path
        );
        if let Some(query) = uri.query() {
            key.push('?');
            key.push_str(query);
        }

        Ok(Self(key))
    }

    /// Parse an absolute URL string into a key.
    pub fn parse(url: &str) -> CacheResult<Self> {
        let uri: Uri = url
            .parse()
            .map_err(|_| CacheError::InvalidKey(url.to_string()))?;
        Self::from_uri(&uri)
    }

    /// Get the key string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path and query portion, for logs.
    pub fn path(&self) -> &str {
        self.0
            .find("://")
            .and_then(|scheme_end| {
                let rest = &self.0[scheme_end + 3..];
                rest.find('/').map(|i| &rest[i..])
            })
            .unwrap_or("/")
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes_scheme_and_host() {
        let a = CacheKey::parse("HTTP://LocalHost:8080/app.js").unwrap();
        let b = CacheKey::parse("http://localhost:8080/app.js").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "http://localhost:8080/app.js");
    }

    #[test]
    fn test_root_path() {
        let key = CacheKey::parse("http://localhost").unwrap();
        assert_eq!(key.as_str(), "http://localhost/");
        assert_eq!(key.path(), "/");
    }

    #[test]
    fn test_query_is_significant() {
        let plain = CacheKey::parse("http://localhost/a.png").unwrap();
        let versioned = CacheKey::parse("http://localhost/a.png?v=2").unwrap();
        assert_ne!(plain, versioned);
        assert_eq!(versioned.path(), "/a.png?v=2");
    }

    #[test]
    fn test_relative_url_rejected() {
        assert!(matches!(
            CacheKey::parse("/index.html"),
            Err(CacheError::InvalidKey(_))
        ));
    }
}
