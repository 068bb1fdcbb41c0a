pub mod daily_totals;
pub mod trade;

// Re-export common types
pub use daily_totals::DailyTotals;
pub use trade::{Trade, TradeKind};
