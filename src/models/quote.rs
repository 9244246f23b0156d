use alloy_primitives::{Address, U256};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Inbound per-trade ask from the hub. Immutable; a request is single-shot —
/// the session must emit exactly one `quote_response` OR one `quote_reject`
/// for this `quote_id`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QuoteRequest {
    pub quote_id: String,
    pub chain_id: u64,
    pub mm_id: String,
    pub token_in: Address,
    pub token_out: Address,
    #[serde(
        deserialize_with = "de_u256_decimal_str",
        serialize_with = "ser_u256_decimal_str"
    )]
    pub amount_in: U256,
    pub recipient: Address,
    #[serde(
        deserialize_with = "de_u256_decimal_str",
        serialize_with = "ser_u256_decimal_str"
    )]
    pub nonce: U256,
    /// Unix seconds.
    pub deadline: u64,
    #[serde(default = "default_slippage_bps")]
    pub slippage_bps: u16,
}

fn default_slippage_bps() -> u16 {
    50
}

/// Outcome tag carried on a `quote_response` frame. Only `Success` is ever
/// sent today — rejects go out as a separate `quote_reject` frame with a
/// `RejectReason` instead — but the wire protocol models it as its own enum
/// rather than a hardcoded string so a future status can be added without
/// reshaping the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuoteStatus {
    #[serde(rename = "QUOTE_STATUS_SUCCESS")]
    Success,
}

/// Reason a `quote_request` was rejected. Wire values per the hub protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    #[serde(rename = "REJECT_REASON_INSUFFICIENT_LIQUIDITY")]
    InsufficientLiquidity,
    #[serde(rename = "REJECT_REASON_PRICE_MOVED")]
    PriceMoved,
    #[serde(rename = "REJECT_REASON_UNSUPPORTED_PAIR")]
    UnsupportedPair,
    #[serde(rename = "REJECT_REASON_RATE_LIMITED")]
    RateLimited,
    #[serde(rename = "REJECT_REASON_INTERNAL_ERROR")]
    InternalError,
}

pub(crate) fn de_u256_decimal_str<'de, D>(deserializer: D) -> Result<U256, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    U256::from_str_radix(s.trim(), 10).map_err(de::Error::custom)
}

pub(crate) fn ser_u256_decimal_str<S>(value: &U256, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_string())
}
