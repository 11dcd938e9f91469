//! HTTP mocking utilities for testing.
//!
//! Provides a mock [`Fetcher`] that answers GET requests with predefined
//! responses. Supports pattern matching, response sequences and request
//! recording for verification.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use serde::Serialize;

use crate::error::{Result, WatchError};
use crate::fetch::Fetcher;

/// Mock fetcher for testing.
///
/// # Example
///
/// ```ignore
/// let mock = MockHttp::builder()
///     .mock_json("/stats", json!({"counts": {"queued": 1}}))
///     .mock("/jobs*", |_| MockResponse::error(503, "unavailable"))
///     .build();
///
/// let body = mock.get("/stats").await?;
/// mock.assert_called("/stats");
/// ```
#[derive(Clone)]
pub struct MockHttp {
    mocks: Arc<RwLock<Vec<MockHandler>>>,
    requests: Arc<RwLock<Vec<RecordedRequest>>>,
}

/// Type alias for mock handler closure.
pub type BoxedHandler = Box<dyn Fn(&MockRequest) -> MockResponse + Send + Sync>;

/// A mock handler.
struct MockHandler {
    pattern: String,
    handler: Arc<dyn Fn(&MockRequest) -> MockResponse + Send + Sync>,
}

/// A recorded request for verification.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Request method.
    pub method: String,
    /// Request path, including the query string.
    pub path: String,
}

/// Mock HTTP request.
#[derive(Debug, Clone)]
pub struct MockRequest {
    /// Request method.
    pub method: String,
    /// Request path, including the query string.
    pub path: String,
}

/// Mock HTTP response.
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// Status code.
    pub status: u16,
    /// Response body.
    pub body: String,
    /// Time to wait before answering.
    pub delay: Option<Duration>,
    /// Fail at the transport level instead of answering.
    pub transport_error: Option<String>,
}

impl MockResponse {
    /// Create a successful JSON response.
    pub fn json<T: Serialize>(body: T) -> Self {
        Self::raw(serde_json::to_string(&body).unwrap_or_else(|_| "null".to_string()))
    }

    /// Create a 200 response with an arbitrary body.
    pub fn raw(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
            delay: None,
            transport_error: None,
        }
    }

    /// Create an error response with a plain text body.
    pub fn error(status: u16, message: &str) -> Self {
        Self {
            status,
            ..Self::raw(message)
        }
    }

    /// Create a 500 internal error.
    pub fn internal_error(message: &str) -> Self {
        Self::error(500, message)
    }

    /// Create a 404 not found.
    pub fn not_found(message: &str) -> Self {
        Self::error(404, message)
    }

    /// Simulate a connection failure.
    pub fn unreachable(message: &str) -> Self {
        Self {
            transport_error: Some(message.to_string()),
            ..Self::raw("")
        }
    }

    /// Answer only after `delay` has elapsed.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl MockHttp {
    /// Create a new mock HTTP client.
    pub fn new() -> Self {
        Self {
            mocks: Arc::new(RwLock::new(Vec::new())),
            requests: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Create a builder.
    pub fn builder() -> MockHttpBuilder {
        MockHttpBuilder::new()
    }

    /// Add a mock handler.
    pub fn add_mock_sync<F>(&self, pattern: &str, handler: F)
    where
        F: Fn(&MockRequest) -> MockResponse + Send + Sync + 'static,
    {
        let mut mocks = self.mocks.write().unwrap();
        mocks.push(MockHandler {
            pattern: pattern.to_string(),
            handler: Arc::new(handler),
        });
    }

    /// Add a mock handler from a boxed closure.
    pub fn add_mock_boxed(&mut self, pattern: &str, handler: BoxedHandler) {
        let mut mocks = self.mocks.write().unwrap();
        mocks.push(MockHandler {
            pattern: pattern.to_string(),
            handler: Arc::from(handler),
        });
    }

    /// Answer successive requests with `responses` in order, repeating the
    /// last one once the sequence is exhausted.
    pub fn add_sequence(&self, pattern: &str, responses: Vec<MockResponse>) {
        let next = AtomicUsize::new(0);
        self.add_mock_sync(pattern, move |_| {
            let idx = next.fetch_add(1, Ordering::SeqCst);
            responses
                .get(idx)
                .or_else(|| responses.last())
                .cloned()
                .unwrap_or_else(|| MockResponse::internal_error("empty mock sequence"))
        });
    }

    /// Replace every handler for `pattern` with `handler`.
    pub fn replace_mock<F>(&self, pattern: &str, handler: F)
    where
        F: Fn(&MockRequest) -> MockResponse + Send + Sync + 'static,
    {
        self.mocks.write().unwrap().retain(|m| m.pattern != pattern);
        self.add_mock_sync(pattern, handler);
    }

    /// Execute a mock request.
    pub fn execute(&self, request: &MockRequest) -> MockResponse {
        self.requests.write().unwrap().push(RecordedRequest {
            method: request.method.clone(),
            path: request.path.clone(),
        });

        let mocks = self.mocks.read().unwrap();
        for mock in mocks.iter() {
            if self.matches_pattern(&request.path, &mock.pattern) {
                return (mock.handler)(request);
            }
        }

        MockResponse::not_found(&format!("No mock found for {}", request.path))
    }

    /// Check if a path matches a pattern.
    fn matches_pattern(&self, url: &str, pattern: &str) -> bool {
        // Convert glob pattern to simple matching
        let pattern_parts: Vec<&str> = pattern.split('*').collect();
        if pattern_parts.len() == 1 {
            // No wildcards - exact match
            return url == pattern;
        }

        let mut remaining = url;
        for (i, part) in pattern_parts.iter().enumerate() {
            if part.is_empty() {
                continue;
            }

            if i == 0 {
                // First part must match at start
                if !remaining.starts_with(part) {
                    return false;
                }
                remaining = &remaining[part.len()..];
            } else if i == pattern_parts.len() - 1 {
                // Last part must match at end
                if !remaining.ends_with(part) {
                    return false;
                }
            } else if let Some(pos) = remaining.find(part) {
                remaining = &remaining[pos + part.len()..];
            } else {
                return false;
            }
        }

        true
    }

    /// Get recorded requests.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.read().unwrap().clone()
    }

    /// Get requests matching a pattern.
    pub fn requests_to(&self, pattern: &str) -> Vec<RecordedRequest> {
        self.requests
            .read()
            .unwrap()
            .iter()
            .filter(|r| self.matches_pattern(&r.path, pattern))
            .cloned()
            .collect()
    }

    /// Clear recorded requests.
    pub fn clear_requests(&self) {
        self.requests.write().unwrap().clear();
    }

    // =========================================================================
    // VERIFICATION METHODS
    // =========================================================================

    /// Assert that a path pattern was requested.
    pub fn assert_called(&self, pattern: &str) {
        let requests = self.requests();
        let matching = requests
            .iter()
            .filter(|r| self.matches_pattern(&r.path, pattern))
            .count();
        assert!(
            matching > 0,
            "Expected HTTP call matching '{}', but none found. Recorded requests: {:?}",
            pattern,
            requests.iter().map(|r| &r.path).collect::<Vec<_>>()
        );
    }

    /// Assert that a path pattern was requested a specific number of times.
    pub fn assert_called_times(&self, pattern: &str, expected: usize) {
        let matching = self.requests_to(pattern).len();
        assert_eq!(
            matching, expected,
            "Expected {} HTTP calls matching '{}', but found {}",
            expected, pattern, matching
        );
    }

    /// Assert that a path pattern was not requested.
    pub fn assert_not_called(&self, pattern: &str) {
        let matching = self.requests_to(pattern).len();
        assert_eq!(
            matching, 0,
            "Expected no HTTP calls matching '{}', but found {}",
            pattern, matching
        );
    }
}

impl Default for MockHttp {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetcher for MockHttp {
    fn get<'a>(
        &'a self,
        path: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>>> + Send + 'a>> {
        Box::pin(async move {
            let response = self.execute(&MockRequest {
                method: "GET".to_string(),
                path: path.to_string(),
            });

            if let Some(delay) = response.delay {
                tokio::time::sleep(delay).await;
            }

            if let Some(message) = response.transport_error {
                return Err(WatchError::Transport(message));
            }

            if !response.is_success() {
                return Err(WatchError::Request {
                    status: response.status,
                    body: response.body,
                });
            }

            Ok(response.body.into_bytes())
        })
    }
}

/// Builder for MockHttp.
pub struct MockHttpBuilder {
    mocks: Vec<(String, BoxedHandler)>,
}

impl MockHttpBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self { mocks: Vec::new() }
    }

    /// Add a mock with a custom handler.
    pub fn mock<F>(mut self, pattern: &str, handler: F) -> Self
    where
        F: Fn(&MockRequest) -> MockResponse + Send + Sync + 'static,
    {
        self.mocks.push((pattern.to_string(), Box::new(handler)));
        self
    }

    /// Add a mock that returns a JSON response.
    pub fn mock_json<T: Serialize + Clone + Send + Sync + 'static>(
        self,
        pattern: &str,
        response: T,
    ) -> Self {
        self.mock(pattern, move |_| MockResponse::json(response.clone()))
    }

    /// Build the MockHttp.
    pub fn build(self) -> MockHttp {
        let mut mock = MockHttp::new();
        for (pattern, handler) in self.mocks {
            mock.add_mock_boxed(&pattern, handler);
        }
        mock
    }
}

impl Default for MockHttpBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_response_json() {
        let response = MockResponse::json(serde_json::json!({"id": 123}));
        assert_eq!(response.status, 200);
        assert_eq!(response.body, r#"{"id":123}"#);
    }

    #[test]
    fn test_mock_response_error() {
        let response = MockResponse::error(404, "Not found");
        assert_eq!(response.status, 404);
        assert_eq!(response.body, "Not found");
    }

    #[test]
    fn test_pattern_matching() {
        let mock = MockHttp::new();

        assert!(mock.matches_pattern("/stats", "/stats"));
        assert!(mock.matches_pattern("/jobs?limit=50", "/jobs*"));
        assert!(mock.matches_pattern("/v2/jobs?limit=50", "/*/jobs*"));
        assert!(!mock.matches_pattern("/stats", "/jobs*"));
    }

    #[tokio::test]
    async fn test_get_success() {
        let mock = MockHttp::builder()
            .mock_json("/stats", serde_json::json!({"counts": {"queued": 1}}))
            .build();

        let body = mock.get("/stats").await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["counts"]["queued"], 1);
        mock.assert_called_times("/stats", 1);
    }

    #[tokio::test]
    async fn test_get_maps_failures() {
        let mock = MockHttp::builder()
            .mock("/stats", |_| MockResponse::error(503, "queue offline"))
            .mock("/jobs*", |_| MockResponse::unreachable("connection refused"))
            .build();

        match mock.get("/stats").await {
            Err(WatchError::Request { status, body }) => {
                assert_eq!(status, 503);
                assert_eq!(body, "queue offline");
            }
            other => panic!("expected request error, got {:?}", other),
        }

        assert!(matches!(
            mock.get("/jobs?limit=50").await,
            Err(WatchError::Transport(_))
        ));
        assert!(matches!(
            mock.get("/unknown").await,
            Err(WatchError::Request { status: 404, .. })
        ));
    }

    #[tokio::test]
    async fn test_sequence_repeats_last() {
        let mock = MockHttp::new();
        mock.add_sequence(
            "/stats",
            vec![MockResponse::raw("1"), MockResponse::internal_error("boom")],
        );

        assert_eq!(mock.get("/stats").await.unwrap(), b"1".to_vec());
        assert!(mock.get("/stats").await.is_err());
        assert!(mock.get("/stats").await.is_err());
        mock.assert_called_times("/stats", 3);
    }

    #[test]
    fn test_replace_mock() {
        let mock = MockHttp::new();
        mock.add_mock_sync("/stats", |_| MockResponse::raw("old"));
        mock.replace_mock("/stats", |_| MockResponse::raw("new"));

        let body = tokio_test::block_on(mock.get("/stats"));
        assert_eq!(body.unwrap(), b"new".to_vec());
    }

    #[tokio::test]
    async fn test_request_recording() {
        let mock = MockHttp::new();
        mock.add_mock_sync("*", |_| MockResponse::raw("{}"));

        let _ = mock.get("/jobs?limit=50").await;

        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "GET");
        assert_eq!(requests[0].path, "/jobs?limit=50");

        mock.assert_called("/jobs*");
        mock.assert_not_called("/stats");

        mock.clear_requests();
        assert!(mock.requests().is_empty());
    }

    #[test]
    fn test_builder() {
        let mock = MockHttpBuilder::new()
            .mock("/stats", |_| MockResponse::raw("{}"))
            .mock_json("/jobs*", serde_json::json!([]))
            .build();

        assert_eq!(mock.mocks.read().unwrap().len(), 2);
    }
}
