//! HTTP client abstraction for testability

use std::time::Duration;

use futures::future::BoxFuture;

use super::error::FeedError;

/// Default request timeout for the station endpoint.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Trait for HTTP client operations.
///
/// This abstraction allows for dependency injection and easier testing
/// by enabling mock HTTP clients in tests. Uses `BoxFuture` so the feed can
/// hold an `Arc<dyn HttpClient>`.
pub trait HttpClient: Send + Sync {
    /// Performs an HTTP GET request.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to request
    ///
    /// # Returns
    ///
    /// The response body as bytes or an error.
    fn get<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Vec<u8>, FeedError>>;
}

/// Real HTTP client implementation using reqwest.
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Creates a new ReqwestClient with default configuration.
    pub fn new() -> Result<Self, FeedError> {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    /// Creates a new ReqwestClient with custom timeout.
    pub fn with_timeout(timeout_secs: u64) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("bikemap/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FeedError::Client(e.to_string()))?;

        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    fn get<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Vec<u8>, FeedError>> {
        Box::pin(async move {
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| FeedError::Request {
                    url: url.to_string(),
                    reason: e.to_string(),
                })?;

            // Check HTTP status
            let status = response.status();
            if !status.is_success() {
                return Err(FeedError::Status {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }

            // Read response body
            response
                .bytes()
                .await
                .map(|b| b.to_vec())
                .map_err(|e| FeedError::Request {
                    url: url.to_string(),
                    reason: format!("failed to read response: {}", e),
                })
        })
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use tokio::sync::Notify;

    /// Mock HTTP client for testing.
    ///
    /// Counts requests and can hold every response until released.
    pub struct MockHttpClient {
        pub response: Result<Vec<u8>, FeedError>,
        pub calls: AtomicUsize,
        pub gate: Option<Arc<Notify>>,
    }

    impl MockHttpClient {
        pub fn ok(body: &str) -> Self {
            Self {
                response: Ok(body.as_bytes().to_vec()),
                calls: AtomicUsize::new(0),
                gate: None,
            }
        }

        pub fn failing(error: FeedError) -> Self {
            Self {
                response: Err(error),
                calls: AtomicUsize::new(0),
                gate: None,
            }
        }

        pub fn gated(mut self, gate: Arc<Notify>) -> Self {
            self.gate = Some(gate);
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl HttpClient for MockHttpClient {
        fn get<'a>(&'a self, _url: &'a str) -> BoxFuture<'a, Result<Vec<u8>, FeedError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                if let Some(gate) = &self.gate {
                    gate.notified().await;
                }
                self.response.clone()
            })
        }
    }

    #[tokio::test]
    async fn test_mock_client_success() {
        let mock = MockHttpClient::ok("{}");

        let result = mock.get("http://example.com").await;
        assert_eq!(result.unwrap(), b"{}".to_vec());
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn test_mock_client_error() {
        let mock = MockHttpClient::failing(FeedError::Status {
            url: "http://example.com".to_string(),
            status: 503,
        });

        let result = mock.get("http://example.com").await;
        assert!(matches!(result, Err(FeedError::Status { status: 503, .. })));
    }

    #[test]
    fn test_reqwest_client_builds() {
        assert!(ReqwestClient::with_timeout(5).is_ok());
    }
}
