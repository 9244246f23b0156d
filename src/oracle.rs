//! Price Oracle (C8): USD-mid lookups used by the pricing engine to size
//! and sanity-check quotes. Grounded on the original source's `PriceFeed`
//! class — a static reverse-pair-aware table keyed by token address, not a
//! live feed. A later swap to a live source only needs a new `PriceOracle`
//! impl.

use alloy_primitives::Address;
use dashmap::DashMap;
use rust_decimal::Decimal;
use tracing::warn;

/// A source of mid prices, keyed by an ordered token pair.
pub trait PriceOracle: Send + Sync {
    /// Best-effort mid price for `token_in -> token_out`. Implementations
    /// are free to return `None` for a genuinely unpriced route;
    /// `StaticOracle` instead falls back to `1.0` with a logged warning,
    /// matching the original source's `PriceFeed.get_price` — an unpriced
    /// pair still quotes rather than stalling the book.
    fn mid_price(&self, token_in: Address, token_out: Address) -> Option<Decimal>;
}

/// Static in-memory table, populated at startup from the pairs registry.
/// Reverse lookups (`quote/base`) are served as `1 / price` when only the
/// forward direction is registered, mirroring the original `PriceFeed`.
pub struct StaticOracle {
    prices: DashMap<(Address, Address), Decimal>,
}

impl StaticOracle {
    pub fn new() -> Self {
        Self {
            prices: DashMap::new(),
        }
    }

    pub fn with_prices(pairs: impl IntoIterator<Item = (Address, Address, Decimal)>) -> Self {
        let oracle = Self::new();
        for (base, quote, price) in pairs {
            oracle.set(base, quote, price);
        }
        oracle
    }

    pub fn set(&self, base_token: Address, quote_token: Address, price: Decimal) {
        self.prices.insert((base_token, quote_token), price);
    }
}

impl Default for StaticOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceOracle for StaticOracle {
    fn mid_price(&self, token_in: Address, token_out: Address) -> Option<Decimal> {
        if let Some(price) = self.prices.get(&(token_in, token_out)) {
            return Some(*price);
        }
        if let Some(price) = self.prices.get(&(token_out, token_in)) {
            return Some(Decimal::ONE / *price);
        }
        warn!(token_in = %token_in, token_out = %token_out, "no price registered for route, falling back to 1.0");
        Some(Decimal::ONE)
    }
}
