mod once;
mod watch;

pub use once::OnceCommand;
pub use watch::WatchCommand;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use queuewatch_core::WatchConfig;

/// queuewatch - live dashboard for the media job queue
#[derive(Parser)]
#[command(name = "queuewatch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Poll the API and keep the dashboard on screen.
    Watch(WatchCommand),

    /// Run a single refresh and print the result.
    Once(OnceCommand),
}

impl Cli {
    /// Execute the CLI command.
    pub async fn execute(self) -> Result<()> {
        dotenvy::dotenv().ok();

        match self.command {
            Commands::Watch(cmd) => cmd.execute().await,
            Commands::Once(cmd) => cmd.execute().await,
        }
    }
}

/// Options shared by every command.
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Configuration file path. Defaults apply when the file does not exist.
    #[arg(short, long, default_value = "queuewatch.toml")]
    pub config: String,

    /// Base URL of the job API (overrides config and environment).
    #[arg(long)]
    pub base_url: Option<String>,

    /// Time zone for job timestamps: `local`, `utc` or an IANA name.
    #[arg(long)]
    pub timezone: Option<String>,
}

impl ConfigArgs {
    /// Load the config file, then apply environment and command-line overrides.
    pub fn load(&self) -> Result<WatchConfig> {
        let mut config = WatchConfig::load_or_default(&self.config)
            .with_context(|| format!("Failed to load configuration from {}", self.config))?;

        config.apply_env_overrides();

        if let Some(url) = &self.base_url {
            config.api.base_url = url.clone();
        }
        if let Some(timezone) = &self.timezone {
            config.display.timezone = timezone.clone();
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_watch() {
        let cli = Cli::try_parse_from([
            "queuewatch",
            "watch",
            "--base-url",
            "http://jobs:8000",
            "--interval-ms",
            "1000",
            "--single-flight",
        ]);
        assert!(cli.is_ok());
    }

    #[test]
    fn test_cli_parse_once() {
        let cli = Cli::try_parse_from(["queuewatch", "once", "--json", "--timezone", "utc"]);
        assert!(cli.is_ok());
    }

    #[test]
    fn test_cli_requires_command() {
        assert!(Cli::try_parse_from(["queuewatch"]).is_err());
    }

    #[test]
    fn test_config_args_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("queuewatch.toml");
        std::fs::write(
            &path,
            r#"
                [api]
                base_url = "http://from-file:8000"

                [poll]
                interval_ms = 750
            "#,
        )
        .unwrap();

        let args = ConfigArgs {
            config: path.to_string_lossy().to_string(),
            base_url: Some("http://from-flag:9000".to_string()),
            timezone: Some("utc".to_string()),
        };

        let config = args.load().unwrap();
        assert_eq!(config.api.base_url, "http://from-flag:9000");
        assert_eq!(config.poll.interval_ms, 750);
        assert_eq!(config.display.timezone, "utc");
    }

    #[test]
    fn test_config_args_missing_file_uses_defaults() {
        let args = ConfigArgs {
            config: "/nonexistent/queuewatch.toml".to_string(),
            base_url: Some("http://jobs:8000".to_string()),
            timezone: None,
        };

        let config = args.load().unwrap();
        assert_eq!(config.api.base_url, "http://jobs:8000");
        assert_eq!(config.poll.interval_ms, 3000);
    }
}
