use super::trade::TradeKind;
use serde::{Deserialize, Serialize};

/// Running buy/sell USD volume for the current UTC day.
///
/// Serialized as `{"buys": <number>, "sells": <number>}` so the state file
/// stays human-inspectable.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DailyTotals {
    pub buys: f64,
    pub sells: f64,
}

impl DailyTotals {
    pub fn new(buys: f64, sells: f64) -> Self {
        Self { buys, sells }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    /// Fold one trade's volume into the matching side
    pub fn add(&mut self, kind: TradeKind, volume_usd: f64) {
        match kind {
            TradeKind::Buy => self.buys += volume_usd,
            TradeKind::Sell => self.sells += volume_usd,
        }
    }

    /// Combine with a delta produced by a tick
    pub fn merged(&self, delta: &DailyTotals) -> DailyTotals {
        DailyTotals {
            buys: self.buys + delta.buys,
            sells: self.sells + delta.sells,
        }
    }

    pub fn total(&self) -> f64 {
        self.buys + self.sells
    }

    pub fn is_zero(&self) -> bool {
        self.buys == 0.0 && self.sells == 0.0
    }

    /// Both sides finite and non-negative
    pub fn is_valid(&self) -> bool {
        self.buys.is_finite() && self.sells.is_finite() && self.buys >= 0.0 && self.sells >= 0.0
    }
}
