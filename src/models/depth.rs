use alloy_primitives::Address;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One rendered bid or ask level on the wire: price as a decimal string,
/// amount as an integer string in 18-decimal base units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: String,
    pub amount: String,
}

impl PriceLevel {
    pub fn new(price: Decimal, amount_base_units: u128) -> Self {
        Self {
            price: price.to_string(),
            amount: amount_base_units.to_string(),
        }
    }
}

/// Outbound depth snapshot for one pair. `sequence_id` is a monotone
/// counter shared across all pairs in a session (not per-pair — see
/// DESIGN.md for why this matches the original source verbatim).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepthSnapshot {
    pub chain_id: u64,
    pub pair_id: String,
    pub token_a: Address,
    pub token_b: Address,
    pub bids: Vec<PriceLevel>,
    pub asks: Vec<PriceLevel>,
    pub sequence_id: u64,
    /// Wall-clock milliseconds. Wire field is named `timestamp` (not
    /// `timestamp_ms`), matching the original source's `_build_depth_snapshot`.
    pub timestamp: u64,
}
