use anyhow::Result;
use clap::Parser;
use console::style;
use queuewatch::{logging, Dashboard};
use queuewatch_core::WatchConfig;
use queuewatch_runtime::TerminalView;
use tracing::info;

use super::ConfigArgs;

/// Poll the API and keep the dashboard on screen.
#[derive(Parser)]
pub struct WatchCommand {
    #[command(flatten)]
    pub common: ConfigArgs,

    /// Refresh period in milliseconds (overrides config).
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Skip a refresh while the previous one is still running.
    #[arg(long)]
    pub single_flight: bool,

    /// Enable debug logging.
    #[arg(short, long)]
    pub verbose: bool,
}

impl WatchCommand {
    /// Execute the watch command.
    pub async fn execute(self) -> Result<()> {
        let config = self.load_config()?;
        logging::init(&config.logging, self.verbose)?;

        let dashboard = Dashboard::builder().config(config).build()?;
        info!(
            base_url = %dashboard.config().api.base_url,
            interval_ms = dashboard.config().poll.interval_ms,
            "Watching job queue"
        );

        let view = TerminalView::new(dashboard.page(), dashboard.title());
        let view_task = tokio::spawn(view.run(dashboard.poller().shutdown_receiver()));

        dashboard
            .run_until(async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
                }
            })
            .await;

        let _ = view_task.await;

        let stats = dashboard.poller().stats();
        println!(
            "\n  {} stopped after {} refreshes ({} failed)",
            style("queuewatch").bold().cyan(),
            stats.cycles_completed + stats.cycles_failed,
            stats.cycles_failed
        );
        Ok(())
    }

    fn load_config(&self) -> Result<WatchConfig> {
        let mut config = self.common.load()?;

        if let Some(interval_ms) = self.interval_ms {
            config.poll.interval_ms = interval_ms;
        }
        if self.single_flight {
            config.poll.single_flight = true;
        }

        Ok(config)
    }
}
