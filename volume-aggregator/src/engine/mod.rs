/// Incremental daily volume aggregation
pub mod aggregation_engine;
pub mod fold;
pub mod metrics;
pub mod report;

pub use aggregation_engine::AggregationEngine;
pub use fold::{fold_trades, FoldOutcome};
pub use metrics::{BoundaryReport, TickStats};
pub use report::format_daily_report;
