use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use super::quote::{de_u256_decimal_str, ser_u256_decimal_str};

/// The `MMQuote` struct that gets EIP-712 hashed and signed. Field order
/// here is the canonical order used for both the Solidity struct hash and
/// the outbound wire `order` object — the two must never drift apart.
#[derive(Debug, Clone)]
pub struct MMQuote {
    pub manager: Address,
    pub from: Address,
    pub to: Address,
    pub input_token: Address,
    pub output_token: Address,
    pub amount_in: U256,
    pub amount_out: U256,
    pub deadline: u64,
    pub nonce: U256,
}

/// A signed `MMQuote`, ready to serialize into a `quote_response` frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedOrder {
    pub signer: Address,
    pub manager: Address,
    pub from: Address,
    pub to: Address,
    pub input_token: Address,
    pub output_token: Address,
    #[serde(
        deserialize_with = "de_u256_decimal_str",
        serialize_with = "ser_u256_decimal_str"
    )]
    pub amount_in: U256,
    #[serde(
        deserialize_with = "de_u256_decimal_str",
        serialize_with = "ser_u256_decimal_str"
    )]
    pub amount_out: U256,
    pub deadline: u64,
    #[serde(
        deserialize_with = "de_u256_decimal_str",
        serialize_with = "ser_u256_decimal_str"
    )]
    pub nonce: U256,
    pub extra_data: String,
    pub signature: String,
}
