use std::future::Future;
use std::sync::Arc;

use queuewatch_core::{Fetcher, Result, WatchConfig};
use queuewatch_runtime::{CycleReport, HttpFetcher, Page, Poller, PollerConfig};

/// A configured dashboard: the page and the poller that keeps it fresh.
pub struct Dashboard {
    config: WatchConfig,
    page: Arc<Page>,
    poller: Arc<Poller>,
}

impl Dashboard {
    /// Create a builder.
    pub fn builder() -> DashboardBuilder {
        DashboardBuilder::new()
    }

    pub fn config(&self) -> &WatchConfig {
        &self.config
    }

    pub fn page(&self) -> Arc<Page> {
        self.page.clone()
    }

    pub fn poller(&self) -> Arc<Poller> {
        self.poller.clone()
    }

    /// Title shown above the dashboard.
    pub fn title(&self) -> String {
        format!("queuewatch · {}", self.config.api.base_url)
    }

    /// Run a single refresh cycle.
    pub async fn run_once(&self) -> Result<CycleReport> {
        self.poller.refresh().await
    }

    /// Poll until `shutdown` resolves.
    pub async fn run_until<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let task = tokio::spawn(self.poller.clone().run());

        shutdown.await;
        tracing::info!("Shutdown requested");
        self.poller.stop();

        if let Err(e) = task.await {
            tracing::warn!(error = %e, "Poller task ended abnormally");
        }
    }
}

/// Builder for [`Dashboard`].
pub struct DashboardBuilder {
    config: Option<WatchConfig>,
    fetcher: Option<Arc<dyn Fetcher>>,
}

impl DashboardBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            fetcher: None,
        }
    }

    /// Set the configuration.
    pub fn config(mut self, config: WatchConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Use `fetcher` instead of an HTTP client built from the config.
    pub fn fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Validate the configuration and wire up the dashboard.
    pub fn build(self) -> Result<Dashboard> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let fetcher = match self.fetcher {
            Some(fetcher) => fetcher,
            None => Arc::new(HttpFetcher::from_config(&config.api)),
        };

        let page = Arc::new(Page::new());
        let poller = Arc::new(Poller::new(
            fetcher,
            page.clone(),
            PollerConfig::from_watch_config(&config)?,
        ));

        Ok(Dashboard {
            config,
            page,
            poller,
        })
    }
}

impl Default for DashboardBuilder {
    fn default() -> Self {
        Self::new()
    }
}
