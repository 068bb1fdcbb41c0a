use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;
use volume_core::DailyTotals;
use volume_data_services::{Notifier, StateStore, TradeSource};

use super::fold::fold_trades;
use super::metrics::{BoundaryReport, TickStats};
use super::report::format_daily_report;

/// Incremental aggregation engine
///
/// Owns the daily totals and the watermark (through the state store) and
/// exposes the two entry points the driver calls:
///
/// - `on_tick`: fetch candidates, keep today's unseen trades, fold them into
///   the totals and advance the watermark.
/// - `on_daily_boundary`: report the totals once and reset them to zero.
///
/// Nothing here is fatal. Fetch failures make the tick a no-op, store
/// failures are logged and reconciled by the next tick's reads, and a failed
/// report still resets the totals.
///
/// Calls are serialized by an internal lock, so an engine shared between
/// tasks never interleaves the read-mutate-persist cycle of two calls.
pub struct AggregationEngine {
    source: Arc<dyn TradeSource>,
    store: Arc<dyn StateStore>,
    notifier: Arc<dyn Notifier>,
    cycle_lock: Mutex<()>,
}

impl AggregationEngine {
    pub fn new(
        source: Arc<dyn TradeSource>,
        store: Arc<dyn StateStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            source,
            store,
            notifier,
            cycle_lock: Mutex::new(()),
        }
    }

    /// Run one polling cycle against the wall clock
    pub async fn on_tick(&self) -> TickStats {
        self.on_tick_at(Utc::now()).await
    }

    /// Run one polling cycle as if the current time were `now`
    pub async fn on_tick_at(&self, now: DateTime<Utc>) -> TickStats {
        let _guard = self.cycle_lock.lock().await;
        let mut stats = TickStats::default();

        tracing::debug!("Processing trades");

        let candidates = match self.source.fetch_trades().await {
            Ok(trades) => trades,
            Err(e) => {
                tracing::warn!("Error fetching trades, skipping tick: {}", e);
                stats.fetch_failed = true;
                return stats;
            }
        };
        stats.fetched = candidates.len();

        let watermark = self.store.read_watermark(now);
        stats.watermark = Some(watermark);

        let outcome = fold_trades(&candidates, watermark, now);
        stats.discarded_other_day = outcome.discarded_other_day;
        stats.stopped_at_watermark = outcome.stopped_at_watermark;

        if !outcome.has_new_trades() {
            tracing::info!(
                "No new trades (fetched {}, {} not from today, watermark {})",
                stats.fetched,
                stats.discarded_other_day,
                watermark
            );
            return stats;
        }

        let totals = self.store.read_totals().merged(&outcome.delta);

        // Totals first: the watermark may only acknowledge trades already on disk
        if let Err(e) = self.store.write_totals(&totals) {
            tracing::error!(
                "Failed to persist totals, watermark stays at {}: {}",
                watermark,
                e
            );
            return stats;
        }
        stats.totals_persisted = true;
        stats.accepted = outcome.accepted;
        stats.delta = outcome.delta;

        match self.store.write_watermark(outcome.new_watermark) {
            Ok(()) => {
                stats.watermark_persisted = true;
                stats.watermark = Some(outcome.new_watermark);
            }
            Err(e) => {
                // Next tick re-reads the old watermark and may fold this batch again
                tracing::error!(
                    "Failed to persist watermark {}: {}",
                    outcome.new_watermark,
                    e
                );
            }
        }

        tracing::info!(
            "Folded {} new trades: +${:.2} buys, +${:.2} sells (day totals: ${:.2} buys, ${:.2} sells), watermark {}",
            outcome.accepted,
            outcome.delta.buys,
            outcome.delta.sells,
            totals.buys,
            totals.sells,
            outcome.new_watermark
        );

        stats
    }

    /// Report the accumulated totals and reset them to zero.
    ///
    /// Exactly one message is sent per call. The watermark is not touched;
    /// the next tick on the new day resets it through the read rule.
    pub async fn on_daily_boundary(&self) -> BoundaryReport {
        let _guard = self.cycle_lock.lock().await;

        let totals = self.store.read_totals();
        let message = format_daily_report(&totals);

        if totals.is_zero() {
            tracing::info!("No volume recorded since the last report, sending zero totals");
        } else {
            tracing::info!(
                "Sending daily report: ${:.2} buys, ${:.2} sells (${:.2} total)",
                totals.buys,
                totals.sells,
                totals.total()
            );
        }

        let delivered = match self.notifier.send(&message).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to deliver daily report (not retried): {}", e);
                false
            }
        };

        let reset = match self.store.write_totals(&DailyTotals::zero()) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Failed to reset daily totals: {}", e);
                false
            }
        };

        BoundaryReport {
            totals,
            delivered,
            reset,
        }
    }
}
