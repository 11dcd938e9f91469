use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use queuewatch_core::view::DisplayZone;
use queuewatch_core::{
    Fetcher, Job, JobRow, Renderer, Result, Stats, StatsView, WatchConfig, WatchError,
};
use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

/// Poller configuration.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Period between refresh cycles.
    pub interval: Duration,
    /// Path of the stats resource.
    pub stats_path: String,
    /// Path and query of the recent-jobs resource.
    pub jobs_path: String,
    /// Skip ticks while a cycle is still in flight.
    pub single_flight: bool,
    /// Zone used for job timestamps.
    pub zone: DisplayZone,
}

impl PollerConfig {
    pub fn from_watch_config(config: &WatchConfig) -> Result<Self> {
        Ok(Self {
            interval: config.poll.interval(),
            stats_path: config.api.stats_path.clone(),
            jobs_path: config.api.jobs_query(),
            single_flight: config.poll.single_flight,
            zone: config.display.zone()?,
        })
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(3000),
            stats_path: "/stats".to_string(),
            jobs_path: "/jobs?limit=50".to_string(),
            single_flight: false,
            zone: DisplayZone::Local,
        }
    }
}

/// Outcome of a successful refresh cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub stats: StatsView,
    pub jobs: usize,
}

/// Counters describing the poller's activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollerStats {
    pub cycles_started: u64,
    pub cycles_completed: u64,
    pub cycles_failed: u64,
    pub ticks_skipped: u64,
}

#[derive(Default)]
struct Counters {
    started: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
    skipped: AtomicU64,
}

/// Periodically fetches stats and recent jobs and renders them.
///
/// Cycles started by the timer run on their own tasks, so a slow cycle does
/// not delay the next tick. Unless `single_flight` is set, two cycles may be
/// in flight at once and whichever finishes last wins the page.
pub struct Poller {
    fetcher: Arc<dyn Fetcher>,
    renderer: Arc<dyn Renderer>,
    config: PollerConfig,
    running: AtomicBool,
    in_flight: Arc<AtomicUsize>,
    counters: Counters,
    shutdown_tx: watch::Sender<bool>,
}

impl Poller {
    /// Create a new poller.
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        renderer: Arc<dyn Renderer>,
        config: PollerConfig,
    ) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            fetcher,
            renderer,
            config,
            running: AtomicBool::new(false),
            in_flight: Arc::new(AtomicUsize::new(0)),
            counters: Counters::default(),
            shutdown_tx,
        }
    }

    pub fn config(&self) -> &PollerConfig {
        &self.config
    }

    /// Check if the timer loop is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Number of cycles currently in flight.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn stats(&self) -> PollerStats {
        PollerStats {
            cycles_started: self.counters.started.load(Ordering::SeqCst),
            cycles_completed: self.counters.completed.load(Ordering::SeqCst),
            cycles_failed: self.counters.failed.load(Ordering::SeqCst),
            ticks_skipped: self.counters.skipped.load(Ordering::SeqCst),
        }
    }

    /// Stop the timer loop. Cycles already in flight are not cancelled.
    pub fn stop(&self) {
        self.shutdown_tx.send_replace(true);
    }

    /// Get a shutdown receiver.
    pub fn shutdown_receiver(&self) -> watch::Receiver<bool> {
        self.shutdown_tx.subscribe()
    }

    /// Run one update cycle.
    ///
    /// A failure aborts the rest of the cycle and is logged once; whatever
    /// was already rendered stays on the page.
    pub async fn refresh(&self) -> Result<CycleReport> {
        self.counters.started.fetch_add(1, Ordering::SeqCst);

        match self.run_cycle().await {
            Ok(report) => {
                self.counters.completed.fetch_add(1, Ordering::SeqCst);
                tracing::debug!(jobs = report.jobs, "Dashboard refreshed");
                Ok(report)
            }
            Err(e) => {
                self.counters.failed.fetch_add(1, Ordering::SeqCst);
                tracing::error!(error = %e, "Dashboard refresh failed");
                Err(e)
            }
        }
    }

    async fn run_cycle(&self) -> Result<CycleReport> {
        let stats: Stats = self.fetch_json(&self.config.stats_path).await?;
        let view = StatsView::from_stats(&stats);
        for (id, value) in view.entries() {
            self.renderer.set_text(id, value);
        }

        let jobs: Vec<Job> = self.fetch_json(&self.config.jobs_path).await?;
        let rows: Vec<JobRow> = jobs
            .iter()
            .map(|job| JobRow::from_job(job, &self.config.zone))
            .collect();
        let count = rows.len();
        self.renderer.replace_jobs(rows);

        Ok(CycleReport {
            stats: view,
            jobs: count,
        })
    }

    /// GET `path` and decode the JSON body.
    pub async fn fetch_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let body = self.fetcher.get(path).await?;
        serde_json::from_slice(&body)
            .map_err(|e| WatchError::Decode(format!("Invalid JSON from {}: {}", path, e)))
    }

    /// Run the timer loop until [`stop`](Self::stop) is called.
    ///
    /// The first cycle starts immediately, then one per interval.
    pub async fn run(self: Arc<Self>) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }

        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            interval_ms = self.config.interval.as_millis() as u64,
            single_flight = self.config.single_flight,
            "Poller starting"
        );

        while !*shutdown_rx.borrow_and_update() {
            tokio::select! {
                _ = ticker.tick() => self.start_cycle(),
                changed = shutdown_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        self.running.store(false, Ordering::SeqCst);
        tracing::info!("Poller stopped");
    }

    fn start_cycle(self: &Arc<Self>) {
        if self.config.single_flight && self.in_flight() > 0 {
            self.counters.skipped.fetch_add(1, Ordering::SeqCst);
            tracing::debug!("Previous refresh still in flight, skipping tick");
            return;
        }

        let guard = InFlightGuard::enter(&self.in_flight);
        let poller = Arc::clone(self);
        tokio::spawn(async move {
            let _guard = guard;
            let _ = poller.refresh().await;
        });
    }
}

/// Counts a cycle as in flight until dropped.
struct InFlightGuard(Arc<AtomicUsize>);

impl InFlightGuard {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
