pub mod gecko_client;
pub mod types;

use async_trait::async_trait;
use volume_core::Trade;

// Re-export commonly used items
pub use gecko_client::{FeedConfig, FeedError, GeckoTerminalClient};
pub use types::{RecordError, TradeAttributes, TradeRecord, TradesResponse};

/// Source of candidate trades for one pool.
///
/// Implementations return trades in feed order (newest first for the
/// GeckoTerminal endpoint). Callers treat any error as "no trades this tick".
#[async_trait]
pub trait TradeSource: Send + Sync {
    async fn fetch_trades(&self) -> Result<Vec<Trade>, FeedError>;
}
