//! EIP-712 domain + struct hashing for `MMQuote`, via alloy's `sol!` macro —
//! same approach as the original order signer, generalized from Polymarket's
//! `Order` struct to the hub's `MMQuote` shape.

use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::{sol, Eip712Domain, SolStruct};

use crate::constants::{DOMAIN_NAME, DOMAIN_VERSION, EMPTY_EXTRA_DATA_HASH};
use crate::models::order::MMQuote;

// Field order and Solidity types per the canonical hashing contract:
// address, address, address, address, address, uint256, uint256, uint256,
// uint256, bytes32. Struct name must be "MMQuote" to match the on-chain
// type string the verifying contract hashes against.
sol! {
    #[derive(Debug)]
    struct MMQuoteStruct {
        address manager;
        address from;
        address to;
        address inputToken;
        address outputToken;
        uint256 amountIn;
        uint256 amountOut;
        uint256 deadline;
        uint256 nonce;
        bytes32 extraDataHash;
    }
}

fn extra_data_hash() -> B256 {
    EMPTY_EXTRA_DATA_HASH
        .parse()
        .expect("EMPTY_EXTRA_DATA_HASH constant must be a valid 32-byte hex string")
}

/// The EIP-712 signing digest for one `MMQuote`, ready to pass to a signer's
/// `sign_hash`. Kept separate from signing so the digest can be tested
/// without a key.
pub fn signing_hash(chain_id: u64, manager: Address, quote: &MMQuote) -> B256 {
    let domain = Eip712Domain {
        name: Some(DOMAIN_NAME.into()),
        version: Some(DOMAIN_VERSION.into()),
        chain_id: Some(U256::from(chain_id)),
        verifying_contract: Some(manager),
        salt: None,
    };

    let sol_quote = MMQuoteStruct {
        manager,
        from: quote.from,
        to: quote.to,
        inputToken: quote.input_token,
        outputToken: quote.output_token,
        amountIn: quote.amount_in,
        amountOut: quote.amount_out,
        deadline: U256::from(quote.deadline),
        nonce: quote.nonce,
        extraDataHash: extra_data_hash(),
    };

    sol_quote.eip712_signing_hash(&domain)
}
