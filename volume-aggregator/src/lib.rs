pub mod engine;

// Re-export commonly used items from engine module
pub use engine::{
    fold_trades, format_daily_report, AggregationEngine, BoundaryReport, FoldOutcome, TickStats,
};
