pub mod log_notifier;
pub mod telegram;

use async_trait::async_trait;
use thiserror::Error;

// Re-export commonly used items
pub use log_notifier::LogNotifier;
pub use telegram::{TelegramConfig, TelegramNotifier};

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Channel rejected message: {0}")]
    Api(String),
}

/// Fire-and-forget outbound text channel
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<(), NotifyError>;
}
