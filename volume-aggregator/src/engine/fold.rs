//! Pure fetch-filter-fold step of a tick
//!
//! Takes the candidates exactly as the feed returned them and the current
//! watermark, and produces the totals delta plus the watermark that
//! acknowledges it. No I/O happens here.

use chrono::{DateTime, Utc};
use volume_core::{is_same_utc_day, DailyTotals, Trade};

/// Result of folding one batch of candidates
#[derive(Debug, Clone, PartialEq)]
pub struct FoldOutcome {
    /// Volume to add to the persisted totals
    pub delta: DailyTotals,

    /// `max(watermark, timestamps of accepted trades)`
    pub new_watermark: DateTime<Utc>,

    /// Trades folded into `delta`
    pub accepted: usize,

    /// Candidates dropped because they are not on today's UTC date
    pub discarded_other_day: usize,

    /// Whether the scan ended on a trade at or before the watermark
    pub stopped_at_watermark: bool,
}

impl FoldOutcome {
    fn empty(watermark: DateTime<Utc>) -> Self {
        Self {
            delta: DailyTotals::zero(),
            new_watermark: watermark,
            accepted: 0,
            discarded_other_day: 0,
            stopped_at_watermark: false,
        }
    }

    pub fn has_new_trades(&self) -> bool {
        self.accepted > 0
    }
}

/// Fold today's unseen trades into a delta.
///
/// 1. Candidates whose UTC date differs from `now`'s are discarded.
/// 2. The rest are scanned in feed order (newest first). The scan stops at
///    the first trade with `timestamp <= watermark`; anything after that
///    point is never looked at, even if it would be unseen. The feed is
///    assumed to be strictly time-descending.
/// 3. Every trade before the stop is added to the delta by kind.
pub fn fold_trades(candidates: &[Trade], watermark: DateTime<Utc>, now: DateTime<Utc>) -> FoldOutcome {
    let mut outcome = FoldOutcome::empty(watermark);

    let todays: Vec<&Trade> = candidates
        .iter()
        .filter(|trade| is_same_utc_day(trade.timestamp, now))
        .collect();
    outcome.discarded_other_day = candidates.len() - todays.len();

    for trade in todays {
        if trade.timestamp <= watermark {
            tracing::debug!(
                "Reached already processed trade at {} (watermark {})",
                trade.timestamp,
                watermark
            );
            outcome.stopped_at_watermark = true;
            break;
        }

        outcome.delta.add(trade.kind, trade.volume_usd);
        outcome.new_watermark = outcome.new_watermark.max(trade.timestamp);
        outcome.accepted += 1;
    }

    outcome
}
