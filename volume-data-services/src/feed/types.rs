//! Wire types for the GeckoTerminal pool trades endpoint
//!
//! Envelope: `{"data": [{"id": "...", "type": "trade", "attributes": {...}}]}`

use serde::Deserialize;
use thiserror::Error;
use volume_core::{parse_timestamp, Trade, TradeKind};

#[derive(Debug, Clone, Deserialize)]
pub struct TradesResponse {
    #[serde(default)]
    pub data: Vec<TradeRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TradeRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub attributes: TradeAttributes,
}

/// Only the attributes the aggregator needs; the feed sends many more
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TradeAttributes {
    pub block_timestamp: Option<String>,
    pub kind: Option<String>,
    pub volume_in_usd: Option<String>,
}

/// Why a single record could not be turned into a [`Trade`]
#[derive(Error, Debug, PartialEq)]
pub enum RecordError {
    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("invalid block_timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("invalid volume_in_usd: {0}")]
    InvalidVolume(String),

    #[error("unknown trade kind: {0}")]
    UnknownKind(String),
}

impl TradeRecord {
    /// Convert a wire record into a domain trade
    pub fn to_trade(&self) -> Result<Trade, RecordError> {
        let attrs = &self.attributes;

        let raw_ts = attrs
            .block_timestamp
            .as_deref()
            .ok_or(RecordError::MissingField("block_timestamp"))?;
        let timestamp =
            parse_timestamp(raw_ts).map_err(|_| RecordError::InvalidTimestamp(raw_ts.to_string()))?;

        let raw_kind = attrs.kind.as_deref().ok_or(RecordError::MissingField("kind"))?;
        let kind = TradeKind::from_feed(raw_kind)
            .ok_or_else(|| RecordError::UnknownKind(raw_kind.to_string()))?;

        let raw_volume = attrs
            .volume_in_usd
            .as_deref()
            .ok_or(RecordError::MissingField("volume_in_usd"))?;
        let volume_usd = raw_volume
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .ok_or_else(|| RecordError::InvalidVolume(raw_volume.to_string()))?;

        Ok(Trade::new(timestamp, kind, volume_usd))
    }
}

impl TradesResponse {
    /// Convert every usable record, preserving feed order.
    ///
    /// Malformed records are logged and skipped; they never fail the batch.
    pub fn into_trades(self) -> Vec<Trade> {
        let mut trades = Vec::with_capacity(self.data.len());

        for record in &self.data {
            match record.to_trade() {
                Ok(trade) => trades.push(trade),
                Err(e) => {
                    tracing::warn!(
                        "Skipping malformed trade record {}: {}",
                        record.id.as_deref().unwrap_or("<no id>"),
                        e
                    );
                }
            }
        }

        trades
    }
}
