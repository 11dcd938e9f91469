use anyhow::{Context, Result};
use clap::Parser;
use queuewatch::{logging, Dashboard};
use queuewatch_runtime::terminal::render_snapshot;

use super::ConfigArgs;

/// Run a single refresh and print the result.
#[derive(Parser)]
pub struct OnceCommand {
    #[command(flatten)]
    pub common: ConfigArgs,

    /// Print the page as JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

impl OnceCommand {
    /// Execute the once command.
    pub async fn execute(self) -> Result<()> {
        let config = self.common.load()?;
        logging::init(&config.logging, false)?;

        let dashboard = Dashboard::builder().config(config).build()?;
        dashboard
            .run_once()
            .await
            .context("Dashboard refresh failed")?;

        let snapshot = dashboard.page().snapshot();
        if self.json {
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        } else {
            print!("{}", render_snapshot(&snapshot, &dashboard.title()));
        }

        Ok(())
    }
}
