pub mod feed;
pub mod notify;
pub mod store;

// Re-export commonly used items
pub use feed::{FeedConfig, FeedError, GeckoTerminalClient, TradeSource};
pub use notify::{LogNotifier, Notifier, NotifyError, TelegramConfig, TelegramNotifier};
pub use store::{FileStateStore, StateStore, StoreError};
