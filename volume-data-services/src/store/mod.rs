pub mod file_store;

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use thiserror::Error;
use volume_core::DailyTotals;

// Re-export commonly used items
pub use file_store::FileStateStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt state in {}: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },

    #[error("Serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Durable home of the aggregation state: the watermark and the daily totals.
///
/// Reads never fail. Missing or unreadable state degrades to the safe
/// defaults (start of the current UTC day, zero totals). Writes must be
/// durable before they return.
pub trait StateStore: Send + Sync {
    /// Create any missing state with defaults, leaving existing state alone
    fn init(&self) -> Result<(), StoreError>;

    /// Persisted watermark, resolved against `now` with the day-rollover rule
    fn read_watermark(&self, now: DateTime<Utc>) -> DateTime<Utc>;

    fn write_watermark(&self, watermark: DateTime<Utc>) -> Result<(), StoreError>;

    fn read_totals(&self) -> DailyTotals;

    fn write_totals(&self, totals: &DailyTotals) -> Result<(), StoreError>;
}
