//! URL fetching for remote module imports
//!
//! Handles downloading modules and package descriptors from HTTP/HTTPS
//! URLs.

use reqwest::blocking::Client;
use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during URL fetching
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("HTTP {status} for URL: {url}")]
    HttpStatus { status: u16, url: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Content too large
    #[error("Content too large: {size} bytes (max: {max})")]
    ContentTooLarge { size: u64, max: u64 },
}

/// Maximum size for URL imports (50 MB)
pub const MAX_CONTENT_SIZE: u64 = 50 * 1024 * 1024;

/// HTTP client configuration
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Result of fetching a URL
#[derive(Debug)]
pub struct FetchResult {
    /// Content bytes
    pub content: Vec<u8>,
    /// SHA-256 checksum (hex-encoded)
    pub checksum: String,
    /// Content type (if provided by server)
    pub content_type: Option<String>,
    /// Final URL (after redirects)
    pub final_url: String,
}

/// Network collaborator that materializes a URL as a local file.
///
/// Implementations resolve once the complete body has been written to
/// `dest`. There is no retry or backoff; a hung transfer blocks the
/// calling operation.
pub trait Downloader {
    /// Fetch `url` and write its body to `dest`.
    fn fetch_to(&self, url: &str, dest: &Path) -> Result<FetchResult, FetchError>;
}

/// HTTP(S) fetcher backed by a blocking reqwest client.
pub struct UrlFetcher {
    client: Client,
    max_size: u64,
}

impl Default for UrlFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl UrlFetcher {
    /// Create a new URL fetcher
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("remod/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            max_size: MAX_CONTENT_SIZE,
        }
    }

    /// Create a URL fetcher with custom max size
    pub fn with_max_size(max_size: u64) -> Self {
        let mut fetcher = Self::new();
        fetcher.max_size = max_size;
        fetcher
    }

    /// Fetch content from a URL
    pub fn fetch(&self, url: &str) -> Result<FetchResult, FetchError> {
        validate_url(url)?;

        let response = self.client.get(url).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        if let Some(len) = response.content_length() {
            if len > self.max_size {
                return Err(FetchError::ContentTooLarge {
                    size: len,
                    max: self.max_size,
                });
            }
        }

        // Get metadata before consuming the response
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let final_url = response.url().to_string();

        // Read content with size limit
        let mut content = Vec::new();
        let mut reader = response.take(self.max_size + 1);
        reader.read_to_end(&mut content)?;

        if content.len() as u64 > self.max_size {
            return Err(FetchError::ContentTooLarge {
                size: content.len() as u64,
                max: self.max_size,
            });
        }

        let checksum = compute_checksum(&content);

        Ok(FetchResult {
            content,
            checksum,
            content_type,
            final_url,
        })
    }
}

impl Downloader for UrlFetcher {
    fn fetch_to(&self, url: &str, dest: &Path) -> Result<FetchResult, FetchError> {
        let result = self.fetch(url)?;

        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(dest, &result.content)?;

        Ok(result)
    }
}

/// Validate that a string is a syntactically well-formed HTTP(S) URL.
pub fn validate_url(url: &str) -> Result<url::Url, FetchError> {
    let parsed = url::Url::parse(url).map_err(|_| FetchError::InvalidUrl(url.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        _ => Err(FetchError::InvalidUrl(url.to_string())),
    }
}

/// Compute SHA-256 checksum of bytes
pub fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let hash = hasher.finalize();
    hex::encode(hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_checksum() {
        let data = b"hello world";
        let checksum = compute_checksum(data);
        assert_eq!(checksum.len(), 64);
        assert!(checksum.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_validate_url_accepts_http_and_https() {
        assert!(validate_url("https://example.com/mod.js").is_ok());
        assert!(validate_url("http://example.com/mod.js").is_ok());
    }

    #[test]
    fn test_validate_url_rejects_garbage() {
        assert!(matches!(
            validate_url("not-a-url"),
            Err(FetchError::InvalidUrl(_))
        ));
        assert!(matches!(
            validate_url("ftp://example.com/mod.js"),
            Err(FetchError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_invalid_url_fails_before_network() {
        let fetcher = UrlFetcher::new();
        let result = fetcher.fetch("not-a-url");
        assert!(matches!(result, Err(FetchError::InvalidUrl(_))));
    }
}
