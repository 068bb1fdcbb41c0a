use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Side of a pool trade as reported by the trade-history feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeKind {
    Buy,
    Sell,
}

impl TradeKind {
    /// Parse the feed's `kind` attribute. Anything other than "buy"/"sell" is rejected.
    pub fn from_feed(kind: &str) -> Option<Self> {
        match kind {
            "buy" => Some(TradeKind::Buy),
            "sell" => Some(TradeKind::Sell),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TradeKind::Buy => "buy",
            TradeKind::Sell => "sell",
        }
    }
}

impl fmt::Display for TradeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single trade observed on the pool.
///
/// Trades are immutable and never persisted individually; only their
/// volume is folded into the daily totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub timestamp: DateTime<Utc>,
    pub kind: TradeKind,
    pub volume_usd: f64,
}

impl Trade {
    pub fn new(timestamp: DateTime<Utc>, kind: TradeKind, volume_usd: f64) -> Self {
        Self {
            timestamp,
            kind,
            volume_usd,
        }
    }

    pub fn buy(timestamp: DateTime<Utc>, volume_usd: f64) -> Self {
        Self::new(timestamp, TradeKind::Buy, volume_usd)
    }

    pub fn sell(timestamp: DateTime<Utc>, volume_usd: f64) -> Self {
        Self::new(timestamp, TradeKind::Sell, volume_usd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_kind_from_feed() {
        assert_eq!(TradeKind::from_feed("buy"), Some(TradeKind::Buy));
        assert_eq!(TradeKind::from_feed("sell"), Some(TradeKind::Sell));
        assert_eq!(TradeKind::from_feed("BUY"), None);
        assert_eq!(TradeKind::from_feed(""), None);
    }

    #[test]
    fn test_kind_serializes_lowercase() {
        let json = serde_json::to_string(&TradeKind::Sell).unwrap();
        assert_eq!(json, "\"sell\"");

        let kind: TradeKind = serde_json::from_str("\"buy\"").unwrap();
        assert_eq!(kind, TradeKind::Buy);
    }

    #[test]
    fn test_trade_constructors() {
        let ts = Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap();
        let trade = Trade::buy(ts, 42.5);
        assert_eq!(trade.kind, TradeKind::Buy);
        assert_eq!(trade.volume_usd, 42.5);
        assert_eq!(Trade::sell(ts, 1.0).kind.to_string(), "sell");
    }
}
