//! Depth Builder (C3): render a pair's configured levels into a bid/ask
//! snapshot around the oracle mid-price. Mirrors the original source's
//! `_build_depth_snapshot` — same fallback to a single synthetic level per
//! side when no explicit level ladder is configured.

use rust_decimal::Decimal;

use crate::models::depth::{DepthSnapshot, PriceLevel};
use crate::models::pair::TradingPair;

const BASE_UNIT_SCALE: u32 = 18;

fn to_base_units(amount: Decimal) -> u128 {
    let scaled = amount * Decimal::from(10u64.pow(BASE_UNIT_SCALE));
    scaled.trunc().to_string().parse().unwrap_or(0)
}

/// Build one depth snapshot for `pair` at the given mid-price and sequence
/// number. `now_ms` is wall-clock milliseconds, passed in so this function
/// stays a pure computation (no hidden clock read) and is trivially testable.
pub fn build_depth(pair: &TradingPair, mid_price: Decimal, sequence_id: u64, now_ms: u64) -> DepthSnapshot {
    let (bids, asks) = if pair.levels.is_empty() {
        let bid_factor = Decimal::ONE - Decimal::from(pair.bid_spread_bps) / Decimal::from(10_000u32);
        let ask_factor = Decimal::ONE + Decimal::from(pair.ask_spread_bps) / Decimal::from(10_000u32);
        let amount_base_units = to_base_units(pair.order_amount);
        (
            vec![PriceLevel::new(mid_price * bid_factor, amount_base_units)],
            vec![PriceLevel::new(mid_price * ask_factor, amount_base_units)],
        )
    } else {
        let mut bids = Vec::with_capacity(pair.levels.len());
        let mut asks = Vec::with_capacity(pair.levels.len());
        for level in &pair.levels {
            let bid_factor = Decimal::ONE - Decimal::from(level.spread_bps) / Decimal::from(10_000u32);
            let ask_factor = Decimal::ONE + Decimal::from(level.spread_bps) / Decimal::from(10_000u32);
            let amount_base_units = to_base_units(level.amount);
            bids.push(PriceLevel::new(mid_price * bid_factor, amount_base_units));
            asks.push(PriceLevel::new(mid_price * ask_factor, amount_base_units));
        }
        (bids, asks)
    };

    let mut bids = bids;
    let mut asks = asks;
    bids.sort_by(|a, b| {
        let pa: Decimal = a.price.parse().unwrap_or_default();
        let pb: Decimal = b.price.parse().unwrap_or_default();
        pb.cmp(&pa)
    });
    asks.sort_by(|a, b| {
        let pa: Decimal = a.price.parse().unwrap_or_default();
        let pb: Decimal = b.price.parse().unwrap_or_default();
        pa.cmp(&pb)
    });

    DepthSnapshot {
        chain_id: pair.chain_id,
        pair_id: pair.pair_id(),
        token_a: pair.base_token,
        token_b: pair.quote_token,
        bids,
        asks,
        sequence_id,
        timestamp: now_ms,
    }
}
