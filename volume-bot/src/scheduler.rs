//! Process driver: polling ticks and the UTC-midnight boundary
//!
//! Both entry points run inline in one `select!` loop, so a tick and a
//! boundary never overlap. When both are due the boundary goes first, and
//! ticks missed while a slow fetch was in flight are skipped, not queued.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, sleep, MissedTickBehavior};
use volume_aggregator::AggregationEngine;
use volume_core::next_utc_midnight;

/// The two entry points the driver calls
#[async_trait]
pub trait DailyCycle: Send + Sync {
    async fn tick(&self);
    async fn boundary(&self);
}

#[async_trait]
impl DailyCycle for AggregationEngine {
    async fn tick(&self) {
        let stats = self.on_tick().await;
        tracing::debug!("Tick stats: {:?}", stats);
    }

    async fn boundary(&self) {
        let report = self.on_daily_boundary().await;
        tracing::info!(
            "Daily boundary done: ${:.2} total volume, delivered={}, reset={}",
            report.totals.total(),
            report.delivered,
            report.reset
        );
    }
}

/// Run until Ctrl-C. The first tick fires immediately.
pub async fn run_scheduler(engine: Arc<AggregationEngine>, tick_interval: Duration) -> Result<()> {
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
        }
    };

    drive(engine.as_ref(), tick_interval, Utc::now, shutdown).await;
    Ok(())
}

/// The scheduling loop, over any cycle, wall clock and shutdown signal
async fn drive<C, F, S>(cycle: &C, tick_interval: Duration, clock: F, shutdown: S)
where
    C: DailyCycle + ?Sized,
    F: Fn() -> DateTime<Utc>,
    S: Future<Output = ()>,
{
    tracing::info!(
        "⏰ Starting scheduler (tick every {}s, report at 00:00 UTC)",
        tick_interval.as_secs()
    );

    let mut ticker = interval(tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut next_boundary = next_utc_midnight(clock());

    tokio::pin!(shutdown);

    loop {
        let until_boundary = sleep_duration_until(next_boundary, clock());
        tracing::debug!("Next daily boundary at {} (in {:?})", next_boundary, until_boundary);

        tokio::select! {
            biased;

            _ = &mut shutdown => {
                tracing::info!("Shutdown requested, stopping scheduler");
                break;
            }

            _ = sleep(until_boundary) => {
                cycle.boundary().await;
                next_boundary = advance_boundary(next_boundary, clock());
            }

            _ = ticker.tick() => {
                cycle.tick().await;
            }
        }
    }
}

/// Time left until `target`, zero if it already passed
fn sleep_duration_until(target: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    (target - now).to_std().unwrap_or(Duration::ZERO)
}

/// Boundary after the one that just fired.
///
/// Always strictly later than `fired`, so a wall clock that lags the timer
/// cannot make the same midnight fire twice.
fn advance_boundary(fired: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    next_utc_midnight(fired.max(now))
}
