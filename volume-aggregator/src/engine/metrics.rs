//! Per-invocation outcome records
//!
//! The engine never fails a tick or a boundary; these structs say what
//! actually happened so the driver can log it and tests can assert on it.

use chrono::{DateTime, Utc};
use volume_core::DailyTotals;

/// What one `on_tick` did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickStats {
    /// Fetch failed; the tick was a no-op
    pub fetch_failed: bool,

    /// Usable trades returned by the source
    pub fetched: usize,

    /// Trades dropped for not being on today's UTC date
    pub discarded_other_day: usize,

    /// Trades folded into the totals
    pub accepted: usize,

    /// Scan ended on an already processed trade
    pub stopped_at_watermark: bool,

    /// Volume added this tick
    pub delta: DailyTotals,

    /// Watermark in effect after the tick (None when the fetch failed)
    pub watermark: Option<DateTime<Utc>>,

    pub totals_persisted: bool,

    pub watermark_persisted: bool,
}

impl TickStats {
    /// New totals and watermark are both on disk
    pub fn fully_persisted(&self) -> bool {
        self.totals_persisted && self.watermark_persisted
    }
}

/// What one `on_daily_boundary` did
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryReport {
    /// Snapshot that was reported
    pub totals: DailyTotals,

    pub delivered: bool,

    /// Totals were reset to zero on disk
    pub reset: bool,
}
