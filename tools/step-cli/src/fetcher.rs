//! Serves manifest URLs from a deployed asset directory.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use http::header::{HeaderValue, CONTENT_LENGTH, CONTENT_TYPE};
use http::{Response, StatusCode};
use step_worker::{AssetRequest, FetchError, NetworkFetcher};

/// Fetcher mapping request paths onto files under a root directory.
///
/// Directory paths resolve to their `index.html`.
pub struct DirectoryFetcher {
    root: PathBuf,
}

impl DirectoryFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// File a request path maps to, or `None` if it escapes the root.
    pub fn file_for(&self, path: &str) -> Option<PathBuf> {
        let relative = path.trim_start_matches('/');
        let relative = Path::new(relative);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return None;
        }

        let mut file = self.root.join(relative);
        if path.ends_with('/') || path.is_empty() {
            file.push("index.html");
        }
        Some(file)
    }
}

#[async_trait]
impl NetworkFetcher for DirectoryFetcher {
    async fn fetch(&self, request: &AssetRequest) -> Result<Response<Vec<u8>>, FetchError> {
        let Some(file) = self.file_for(request.uri.path()) else {
            return Ok(status_response(StatusCode::NOT_FOUND));
        };

        match tokio::fs::read(&file).await {
            Ok(body) => {
                let len = body.len();
                let mut response = Response::new(body);
                let headers = response.headers_mut();
                headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type_for(&file)));
                headers.insert(CONTENT_LENGTH, HeaderValue::from(len));
                Ok(response)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(status_response(StatusCode::NOT_FOUND)),
            Err(e) => Err(FetchError::Connection {
                url: request.url(),
                message: e.to_string(),
            }),
        }
    }
}

fn status_response(status: StatusCode) -> Response<Vec<u8>> {
    let mut response = Response::new(Vec::new());
    *response.status_mut() = status;
    response
}

fn content_type_for(file: &Path) -> &'static str {
    match file.extension().and_then(|ext| ext.to_str()) {
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("js") | Some("mjs") => "text/javascript; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("json") => "application/json",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_mapping() {
        let fetcher = DirectoryFetcher::new("/srv/site");
        assert_eq!(
            fetcher.file_for("/"),
            Some(PathBuf::from("/srv/site/index.html"))
        );
        assert_eq!(
            fetcher.file_for("/docs/"),
            Some(PathBuf::from("/srv/site/docs/index.html"))
        );
        assert_eq!(
            fetcher.file_for("/step-parser.js"),
            Some(PathBuf::from("/srv/site/step-parser.js"))
        );
        assert_eq!(fetcher.file_for("/../etc/passwd"), None);
    }

    #[test]
    fn test_content_types() {
        assert_eq!(content_type_for(Path::new("a.js")), "text/javascript; charset=utf-8");
        assert_eq!(content_type_for(Path::new("a.PNG")), "application/octet-stream");
        assert_eq!(content_type_for(Path::new("index.html")), "text/html; charset=utf-8");
    }

    #[tokio::test]
    async fn test_missing_file_is_404() {
        let fetcher = DirectoryFetcher::new(std::env::temp_dir().join("steps-cli-missing-root"));
        let request = AssetRequest::get("http://localhost/nope.js").unwrap();
        let response = fetcher.fetch(&request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
