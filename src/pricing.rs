//! Pricing Engine (C2): decide accept/reject for a `quote_request` and
//! compute `amountOut`. Algorithm and rationale are unchanged from the
//! original source's `_calculate_quote` — spread is one multiplicative
//! factor, symmetric in direction; direction only selects which configured
//! spread applies.

use alloy_primitives::{Address, U256};
use rust_decimal::Decimal;

use crate::constants;
use crate::models::pair::TradingPair;
use crate::models::quote::{QuoteRequest, RejectReason};
use crate::oracle::PriceOracle;

const BASE_UNIT_SCALE: u32 = 18;

/// Find the configured pair for a token route, trying both base-quote
/// orientations after normalizing zero-address sides to wrapped native —
/// mirrors `_find_pair`'s pair-id-then-reverse-id lookup in the original
/// source.
pub fn find_pair(pairs: &[TradingPair], chain_id: u64, token_in: Address, token_out: Address) -> Option<&TradingPair> {
    let wrapped = constants::wrapped_native(chain_id);
    let normalize = |token: Address| {
        if token == constants::ZERO_ADDRESS {
            wrapped.unwrap_or(token)
        } else {
            token
        }
    };
    let a = normalize(token_in);
    let b = normalize(token_out);
    pairs.iter().find(|pair| {
        pair.chain_id == chain_id
            && ((pair.base_token == a && pair.quote_token == b)
                || (pair.base_token == b && pair.quote_token == a))
    })
}

fn base_units(amount: Decimal) -> Option<U256> {
    let scaled = amount * Decimal::from(10u64.pow(BASE_UNIT_SCALE));
    let floored = scaled.trunc();
    U256::from_str_radix(&floored.to_string(), 10).ok()
}

/// Quote a single request against its configured pair. Returns the amount
/// the agent will deliver, or the reason it won't quote at all.
pub fn quote(
    request: &QuoteRequest,
    pair: &TradingPair,
    oracle: &dyn PriceOracle,
) -> Result<U256, RejectReason> {
    let min_base = base_units(pair.min_order_size).ok_or(RejectReason::InternalError)?;
    let max_base = base_units(pair.max_order_size).ok_or(RejectReason::InternalError)?;
    if request.amount_in < min_base || request.amount_in > max_base {
        return Err(RejectReason::InsufficientLiquidity);
    }

    let wrapped = constants::wrapped_native(request.chain_id);
    let token_in = if request.token_in == constants::ZERO_ADDRESS {
        wrapped.unwrap_or(request.token_in)
    } else {
        request.token_in
    };

    let spread_bps = if token_in == pair.base_token {
        pair.bid_spread_bps
    } else {
        pair.ask_spread_bps
    };

    let mid_price = oracle
        .mid_price(request.token_in, request.token_out)
        .ok_or(RejectReason::InternalError)?;

    let amount_in_decimal =
        Decimal::from_str_exact(&request.amount_in.to_string()).map_err(|_| RejectReason::InternalError)?;
    let spread_factor =
        Decimal::ONE - Decimal::from(spread_bps) / Decimal::from(10_000u32);

    let amount_out_decimal = amount_in_decimal
        .checked_mul(mid_price)
        .and_then(|v| v.checked_mul(spread_factor))
        .ok_or(RejectReason::InternalError)?;

    let floored = amount_out_decimal.trunc();
    U256::from_str_radix(&floored.to_string(), 10).map_err(|_| RejectReason::InternalError)
}
