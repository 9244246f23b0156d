//! Chain-scoped constants: RFQ manager addresses, wrapped-native tokens,
//! and the EIP-712 domain fields shared by every signed quote.

use alloy_primitives::Address;
use std::str::FromStr;

pub const DOMAIN_NAME: &str = "DarkPool Pool";
pub const DOMAIN_VERSION: &str = "1";

/// keccak256(b"") — the hash of an always-empty `extraData` field.
pub const EMPTY_EXTRA_DATA_HASH: &str =
    "0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470";

pub const ZERO_ADDRESS: Address = Address::ZERO;

pub const BSC_CHAIN_ID: u64 = 56;
pub const BASE_CHAIN_ID: u64 = 8453;

fn parse_addr(hex: &str) -> Address {
    Address::from_str(hex).expect("hardcoded address constant must be valid")
}

/// RFQ-manager contract address, per chain. `verifyingContract` in the
/// EIP-712 domain and the `manager` field of every signed `MMQuote`.
pub fn rfq_manager(chain_id: u64) -> Option<Address> {
    match chain_id {
        BSC_CHAIN_ID => Some(parse_addr("0x94020Af3571f253754e5566710A89666d90Df615")),
        BASE_CHAIN_ID => Some(parse_addr("0x7648CE928efa92372E2bb34086421a8a1702bD36")),
        _ => None,
    }
}

/// Wrapped-native token address, per chain. Zero-address requests and pair
/// matching both normalize through this table.
pub fn wrapped_native(chain_id: u64) -> Option<Address> {
    match chain_id {
        BSC_CHAIN_ID => Some(parse_addr("0xbb4CdB9CBd36B01bD1cBaEBF2De08d9173bc095c")),
        BASE_CHAIN_ID => Some(parse_addr("0x4200000000000000000000000000000000000006")),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_chains_resolve() {
        assert!(rfq_manager(BSC_CHAIN_ID).is_some());
        assert!(rfq_manager(BASE_CHAIN_ID).is_some());
        assert!(wrapped_native(BSC_CHAIN_ID).is_some());
    }

    #[test]
    fn unknown_chain_is_none() {
        assert!(rfq_manager(1).is_none());
        assert!(wrapped_native(1).is_none());
    }
}
