pub mod day;
pub mod types;

// Re-export commonly used items
pub use day::{
    format_timestamp, is_same_utc_day, next_utc_midnight, parse_timestamp, reset_if_stale_day,
    start_of_utc_day, TimestampError,
};
pub use types::{DailyTotals, Trade, TradeKind};
