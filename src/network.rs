//! HTTP transport for the crawl, behind the `Fetcher` capability.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;

use crate::canonical::CanonicalUrl;

/// Errors that can occur during HTTP fetching
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Connection refused - server not accepting connections")]
    ConnectionRefused,

    #[error("DNS resolution failed")]
    Dns,

    #[error("SSL/TLS error - certificate or encryption issue")]
    Tls,

    #[error("Request timeout")]
    Timeout,

    #[error("HTTP status {0}")]
    HttpStatus(u16),

    #[error("Failed to read response body: {0}")]
    Body(String),

    #[error("Content too large: {0} bytes (max: {1} bytes)")]
    ContentTooLarge(usize, usize),
}

/// Single GET-equivalent fetch capability consumed by the worker pool.
///
/// Implementations must be shareable across workers: either internally
/// reentrant (like `reqwest::Client`, which pools connections behind an
/// `Arc`) or stateless. Retries, if desired, are a decorator around this
/// trait; the core performs none.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &CanonicalUrl) -> Result<String, FetchError>;
}

/// `Fetcher` backed by a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout_duration: Duration,
    max_content_size: usize,
}

impl HttpFetcher {
    const DEFAULT_MAX_CONTENT_SIZE: usize = 10 * 1024 * 1024; // 10MB

    /// Create a fetcher with settings suited to crawling.
    pub fn new(user_agent: &str, timeout_secs: u64) -> Self {
        Self::with_content_limit(user_agent, timeout_secs, Self::DEFAULT_MAX_CONTENT_SIZE)
    }

    pub fn with_content_limit(user_agent: &str, timeout_secs: u64, max_content_size: usize) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(16)
            .pool_idle_timeout(Duration::from_secs(30))
            // HTTP/1.1 is more reliable than HTTP/2 for broad compatibility
            .http1_only()
            .tcp_keepalive(Duration::from_secs(60))
            .tcp_nodelay(true)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            timeout_duration: Duration::from_secs(timeout_secs),
            max_content_size,
        }
    }

    /// Classify reqwest errors into our FetchError taxonomy
    fn classify_error(error: reqwest::Error) -> FetchError {
        let error_msg = error.to_string().to_lowercase();

        if error_msg.contains("connection refused") {
            return FetchError::ConnectionRefused;
        }

        if error_msg.contains("dns") || error_msg.contains("name resolution") {
            return FetchError::Dns;
        }

        if error_msg.contains("ssl") || error_msg.contains("tls") || error_msg.contains("certificate") {
            return FetchError::Tls;
        }

        if error.is_timeout() {
            return FetchError::Timeout;
        }

        FetchError::Network(error.to_string())
    }

    fn is_html_content_type(content_type: &str) -> bool {
        let lower = content_type.to_ascii_lowercase();
        lower.starts_with("text/html") || lower.starts_with("application/xhtml+xml")
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &CanonicalUrl) -> Result<String, FetchError> {
        let response = timeout(
            self.timeout_duration,
            self.client
                .get(url.as_str())
                .header(
                    "Accept",
                    "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
                )
                .header("Accept-Language", "en-US,en;q=0.5")
                .send(),
        )
        .await
        .map_err(|_| FetchError::Timeout)?
        .map_err(Self::classify_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        // Non-HTML content carries no links worth parsing; skip the body.
        if let Some(content_type) = response
            .headers()
            .get("content-type")
            .and_then(|h| h.to_str().ok())
        {
            if !Self::is_html_content_type(content_type) {
                tracing::debug!(url = %url, content_type, "skipping non-HTML body");
                return Ok(String::new());
            }
        }

        // Check the declared length before buffering the body.
        if let Some(length) = response.content_length() {
            if length as usize > self.max_content_size {
                return Err(FetchError::ContentTooLarge(length as usize, self.max_content_size));
            }
        }

        let content = timeout(self.timeout_duration, response.text())
            .await
            .map_err(|_| FetchError::Timeout)?
            .map_err(|e| FetchError::Body(e.to_string()))?;

        if content.len() > self.max_content_size {
            return Err(FetchError::ContentTooLarge(content.len(), self.max_content_size));
        }

        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::canonicalize;

    #[test]
    fn test_is_html_content_type() {
        assert!(HttpFetcher::is_html_content_type("text/html"));
        assert!(HttpFetcher::is_html_content_type("text/html; charset=utf-8"));
        assert!(HttpFetcher::is_html_content_type("application/xhtml+xml"));
        assert!(!HttpFetcher::is_html_content_type("application/json"));
        assert!(!HttpFetcher::is_html_content_type("image/png"));
    }

    #[tokio::test]
    async fn test_fetch_unreachable_host_errors() {
        let fetcher = HttpFetcher::new("TestBot/1.0", 2);
        let url = canonicalize("http://127.0.0.1:9/unreachable", None).unwrap();

        let result = fetcher.fetch(&url).await;
        assert!(result.is_err());
    }
}
