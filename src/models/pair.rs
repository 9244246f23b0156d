use alloy_primitives::Address;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One configured depth level: a spread (in bps from mid) and the quantity
/// quoted at that spread. Used both by the depth builder (C3) and loaded
/// straight from the pairs config file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PairLevel {
    pub spread_bps: u16,
    pub amount: Decimal,
}

/// A configured offering: one base/quote token pair the agent will quote
/// depth for and answer `quote_request`s against. Immutable after
/// registration — the session reads this table but never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingPair {
    pub chain_id: u64,
    pub base_token: Address,
    pub quote_token: Address,
    #[serde(default = "default_spread_bps")]
    pub bid_spread_bps: u16,
    #[serde(default = "default_spread_bps")]
    pub ask_spread_bps: u16,
    #[serde(default = "default_order_amount")]
    pub order_amount: Decimal,
    #[serde(default = "default_min_order_size")]
    pub min_order_size: Decimal,
    #[serde(default = "default_max_order_size")]
    pub max_order_size: Decimal,
    #[serde(default)]
    pub levels: Vec<PairLevel>,
    /// Static USD mid price for this route, loaded into the `PriceOracle`
    /// at startup. Mirrors the original source's per-pair `price` config
    /// key (`main.py`'s `PriceFeed.start`, default `"1.0"`).
    #[serde(default = "default_price")]
    pub price: Decimal,
}

fn default_spread_bps() -> u16 {
    30
}

fn default_price() -> Decimal {
    Decimal::ONE
}

fn default_order_amount() -> Decimal {
    Decimal::ONE
}

fn default_min_order_size() -> Decimal {
    Decimal::new(1, 2) // 0.01
}

fn default_max_order_size() -> Decimal {
    Decimal::new(1000, 0)
}

impl TradingPair {
    /// Registry key: `base-quote`, lowercased so lookups are
    /// case-insensitive on hex presentation (addresses are 20 raw bytes
    /// underneath; casing is presentation-only, per the agent's address
    /// equality rule).
    pub fn pair_id(&self) -> String {
        pair_key(self.base_token, self.quote_token)
    }
}

pub fn pair_key(base: Address, quote: Address) -> String {
    format!("{:#x}-{:#x}", base, quote)
}
