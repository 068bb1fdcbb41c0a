use std::path::PathBuf;
use std::time::Duration;
use volume_data_services::feed::gecko_client::GECKO_API_BASE_URL;
use volume_data_services::notify::telegram::TELEGRAM_API_BASE_URL;
use volume_data_services::{FeedConfig, FileStateStore, TelegramConfig};

use crate::error::ConfigError;

/// Bot configuration. Not `Debug`: it carries the bot token.
#[derive(Clone)]
pub struct BotConfig {
    pub api_base_url: String,
    pub network: String,
    pub pool_address: String,
    pub state_dir: PathBuf,
    pub tick_interval_secs: u64,
    pub http_timeout_secs: u64,
    pub telegram_api_base: String,
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
    pub dry_run: bool,
}

impl Default for BotConfig {
    fn default() -> Self {
        let feed = FeedConfig::default();
        Self {
            api_base_url: GECKO_API_BASE_URL.to_string(),
            network: feed.network,
            pool_address: feed.pool_address,
            state_dir: PathBuf::from("."),
            tick_interval_secs: 600,
            http_timeout_secs: 30,
            telegram_api_base: TELEGRAM_API_BASE_URL.to_string(),
            bot_token: None,
            chat_id: None,
            dry_run: false,
        }
    }
}

impl BotConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "tick_interval_secs must be > 0".to_string(),
            ));
        }

        if self.http_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "http_timeout_secs must be > 0".to_string(),
            ));
        }

        if self.network.trim().is_empty() || self.pool_address.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "network and pool address must not be empty".to_string(),
            ));
        }

        if !self.dry_run {
            if self.bot_token.as_deref().map_or(true, str::is_empty) {
                return Err(ConfigError::MissingCredential("BOT_TOKEN"));
            }
            if self.chat_id.as_deref().map_or(true, str::is_empty) {
                return Err(ConfigError::MissingCredential("CHAT_ID"));
            }
        }

        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs)
    }

    pub fn feed_config(&self) -> FeedConfig {
        FeedConfig {
            base_url: self.api_base_url.clone(),
            network: self.network.clone(),
            pool_address: self.pool_address.clone(),
            timeout: Duration::from_secs(self.http_timeout_secs),
        }
    }

    /// Telegram settings, or None when running dry
    pub fn telegram_config(&self) -> Option<TelegramConfig> {
        if self.dry_run {
            return None;
        }

        let mut config = TelegramConfig::new(self.bot_token.clone()?, self.chat_id.clone()?);
        config.api_base = self.telegram_api_base.clone();
        config.timeout = Duration::from_secs(self.http_timeout_secs);
        Some(config)
    }

    pub fn state_store(&self) -> FileStateStore {
        FileStateStore::in_dir(&self.state_dir)
    }

    /// Log configuration summary
    pub fn log(&self) {
        tracing::info!("Configuration:");
        tracing::info!("  Trades endpoint: {}", self.feed_config().trades_url());
        tracing::info!("  State dir: {}", self.state_dir.display());
        tracing::info!("  Tick interval: {} seconds", self.tick_interval_secs);
        tracing::info!("  HTTP timeout: {} seconds", self.http_timeout_secs);
        tracing::info!(
            "  Notifications: {}",
            if self.dry_run {
                "log only (dry run)".to_string()
            } else {
                format!("telegram chat {}", self.chat_id.as_deref().unwrap_or("?"))
            }
        );
    }
}
