use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use queuewatch_core::config::ApiConfig;
use queuewatch_core::{Fetcher, Result, WatchError};

/// [`Fetcher`] backed by a reqwest client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    base_url: String,
    timeout: Option<Duration>,
}

impl HttpFetcher {
    /// Create a fetcher for `base_url` with no request timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a fetcher using an existing client.
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: None,
        }
    }

    pub fn from_config(config: &ApiConfig) -> Self {
        let mut fetcher = Self::new(config.base_url.clone());
        fetcher.timeout = config.request_timeout();
        fetcher
    }

    /// Bound every request by `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for `path`.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn fetch(&self, path: &str) -> Result<Vec<u8>> {
        let url = self.url(path);
        let mut request = self.client.get(&url);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|e| map_error(&url, e))?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(url = %url, status = status.as_u16(), "Request rejected");
            return Err(WatchError::Request {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await.map_err(|e| map_error(&url, e))?;
        Ok(body.to_vec())
    }
}

impl Fetcher for HttpFetcher {
    fn get<'a>(
        &'a self,
        path: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>>> + Send + 'a>> {
        Box::pin(self.fetch(path))
    }
}

fn map_error(url: &str, e: reqwest::Error) -> WatchError {
    if e.is_timeout() {
        WatchError::Timeout(format!("GET {}: {}", url, e))
    } else {
        WatchError::Transport(format!("GET {}: {}", url, e))
    }
}
