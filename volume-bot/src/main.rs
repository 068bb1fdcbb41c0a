mod config;
mod error;
mod scheduler;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use volume_aggregator::AggregationEngine;
use volume_data_services::feed::gecko_client::GECKO_API_BASE_URL;
use volume_data_services::notify::telegram::TELEGRAM_API_BASE_URL;
use volume_data_services::{
    GeckoTerminalClient, LogNotifier, Notifier, StateStore, TelegramNotifier,
};

use config::BotConfig;

/// Daily pool volume reporter
///
/// Polls a pool's trade history, accumulates today's buy/sell USD volume
/// and posts the totals to a Telegram chat at 00:00 UTC.
#[derive(Parser, Debug)]
#[command(name = "volume-bot", author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Trade feed API base URL
    #[arg(long, global = true, env = "GECKO_API_BASE_URL", default_value = GECKO_API_BASE_URL)]
    api_base_url: String,

    /// Network identifier of the pool
    #[arg(long, global = true, env = "POOL_NETWORK", default_value = "zero-network")]
    network: String,

    /// Pool address
    #[arg(
        long,
        global = true,
        env = "POOL_ADDRESS",
        default_value = "0x6911d086ce4056f8811ace85075927a085289698"
    )]
    pool: String,

    /// Directory holding daily-trades.json and last-tx.txt
    #[arg(long, global = true, env = "STATE_DIR", default_value = ".")]
    state_dir: PathBuf,

    /// Seconds between polling ticks
    #[arg(long, global = true, default_value = "600")]
    tick_interval_secs: u64,

    /// HTTP request timeout in seconds
    #[arg(long, global = true, default_value = "30")]
    http_timeout_secs: u64,

    /// Telegram Bot API base URL
    #[arg(long, global = true, env = "TELEGRAM_API_BASE_URL", default_value = TELEGRAM_API_BASE_URL)]
    telegram_api_base: String,

    /// Telegram bot token
    #[arg(long, global = true, env = "BOT_TOKEN", hide_env_values = true)]
    bot_token: Option<String>,

    /// Telegram chat receiving the daily report
    #[arg(long, global = true, env = "CHAT_ID")]
    chat_id: Option<String>,

    /// Log reports instead of sending them
    #[arg(long, global = true)]
    dry_run: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Poll on a fixed interval and report at every UTC midnight (default)
    Run,
    /// Run a single polling tick and exit
    Tick,
    /// Send the daily report now, reset the totals and exit
    Report,
}

impl Cli {
    fn to_config(&self) -> BotConfig {
        BotConfig {
            api_base_url: self.api_base_url.clone(),
            network: self.network.clone(),
            pool_address: self.pool.clone(),
            state_dir: self.state_dir.clone(),
            tick_interval_secs: self.tick_interval_secs,
            http_timeout_secs: self.http_timeout_secs,
            telegram_api_base: self.telegram_api_base.clone(),
            bot_token: self.bot_token.clone(),
            chat_id: self.chat_id.clone(),
            dry_run: self.dry_run,
        }
    }

    /// Normalized log level; unknown values fall back to info
    fn log_level(&self) -> &'static str {
        match self.log_level.to_lowercase().as_str() {
            "trace" => "trace",
            "debug" => "debug",
            "info" => "info",
            "warn" => "warn",
            "error" => "error",
            _ => "info",
        }
    }
}

fn build_engine(config: &BotConfig) -> Result<AggregationEngine> {
    let store = Arc::new(config.state_store());
    store
        .init()
        .with_context(|| format!("Failed to initialize state in {}", config.state_dir.display()))?;

    let source = Arc::new(
        GeckoTerminalClient::new(config.feed_config()).context("Failed to build trade feed client")?,
    );

    let notifier: Arc<dyn Notifier> = match config.telegram_config() {
        Some(telegram) => Arc::new(
            TelegramNotifier::new(telegram).context("Failed to build Telegram client")?,
        ),
        None => Arc::new(LogNotifier::new()),
    };

    Ok(AggregationEngine::new(source, store, notifier))
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env first so clap's env fallbacks can see it
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging
    let level = cli.log_level();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "volume_bot={0},volume_aggregator={0},volume_data_services={0},volume_core={0}",
                level
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = cli.to_config();
    config.validate()?;

    tracing::info!("🚀 Pool volume bot starting");
    config.log();

    let engine = build_engine(&config)?;

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            scheduler::run_scheduler(Arc::new(engine), config.tick_interval()).await?;
        }
        Command::Tick => {
            let stats = engine.on_tick().await;
            tracing::info!(
                "Tick complete: fetched={}, accepted={}, persisted={}",
                stats.fetched,
                stats.accepted,
                stats.fully_persisted()
            );
        }
        Command::Report => {
            let report = engine.on_daily_boundary().await;
            tracing::info!(
                "Report complete: ${:.2} buys, ${:.2} sells, delivered={}",
                report.totals.buys,
                report.totals.sells,
                report.delivered
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_run() {
        let cli = Cli::try_parse_from(["volume-bot", "--dry-run"]).unwrap();
        assert_eq!(cli.command, None);
        assert!(cli.dry_run);
        assert_eq!(cli.tick_interval_secs, 600);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "volume-bot",
            "tick",
            "--state-dir",
            "/tmp/state",
            "--tick-interval-secs",
            "60",
        ])
        .unwrap();

        assert_eq!(cli.command, Some(Command::Tick));
        let config = cli.to_config();
        assert_eq!(config.state_dir, PathBuf::from("/tmp/state"));
        assert_eq!(config.tick_interval_secs, 60);
    }

    #[test]
    fn test_report_subcommand() {
        let cli = Cli::try_parse_from(["volume-bot", "report", "--dry-run"]).unwrap();
        assert_eq!(cli.command, Some(Command::Report));
        assert!(cli.to_config().validate().is_ok());
    }

    #[test]
    fn test_log_level_normalization() {
        let cli = Cli::try_parse_from(["volume-bot", "--log-level", "DEBUG"]).unwrap();
        assert_eq!(cli.log_level(), "debug");

        let cli = Cli::try_parse_from(["volume-bot", "--log-level", "loud"]).unwrap();
        assert_eq!(cli.log_level(), "info");
    }

    #[test]
    fn test_pool_flags() {
        let cli = Cli::try_parse_from([
            "volume-bot",
            "--network",
            "eth",
            "--pool",
            "0xabc",
            "--api-base-url",
            "http://localhost:1234",
        ])
        .unwrap();

        let feed = cli.to_config().feed_config();
        assert_eq!(feed.trades_url(), "http://localhost:1234/networks/eth/pools/0xabc/trades");
    }
}
