//! Typed-Data Signer (C1): wraps an `alloy_signer_local::PrivateKeySigner`
//! and produces a fully-formed `SignedOrder` for one `MMQuote`.
//!
//! The v-byte convention differs from the teacher's Polymarket signer: the
//! official `rs-clob-client` (and this agent's teacher) emit raw y-parity
//! (`v ∈ {0, 1}`) straight from `Signature::as_bytes()`. This hub follows the
//! original `eth_account`-style convention instead (`v ∈ {27, 28}`), so the
//! y-parity byte is normalized by adding 27 before hex-encoding.

pub mod typed_data;

use alloy_primitives::Address;
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use anyhow::Result;
use tracing::warn;

use crate::models::order::{MMQuote, SignedOrder};

pub struct QuoteSigner {
    chain_id: u64,
    signer: PrivateKeySigner,
}

impl QuoteSigner {
    /// Builds from a hex private key (with or without `0x` prefix). An
    /// empty or unparseable key falls back to a random signer — dry-run
    /// mode, matching the teacher's `OrderBuilder::new`.
    pub fn new(chain_id: u64, private_key: &str) -> Self {
        let signer = if private_key.is_empty() {
            warn!("no private key configured, using random signer (dry-run mode)");
            PrivateKeySigner::random()
        } else {
            let key_hex = private_key.strip_prefix("0x").unwrap_or(private_key);
            key_hex.parse::<PrivateKeySigner>().unwrap_or_else(|_| {
                warn!("invalid private key, using random signer (dry-run mode)");
                PrivateKeySigner::random()
            })
        };

        Self { chain_id, signer }
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Sign `quote` and return the fully-formed wire order. Fails only if
    /// the underlying key is unusable (§4.1 contract).
    pub async fn sign(&self, quote: &MMQuote) -> Result<SignedOrder> {
        let digest = typed_data::signing_hash(self.chain_id, quote.manager, quote);
        let signature = self.signer.sign_hash(&digest).await?;

        let mut bytes = signature.as_bytes();
        // alloy emits raw y-parity (0/1) in the last byte; this protocol's
        // verifier expects the legacy 27/28 convention.
        bytes[64] += 27;
        let signature_hex = format!("0x{}", hex::encode(bytes));

        Ok(SignedOrder {
            signer: self.signer.address(),
            manager: quote.manager,
            from: quote.from,
            to: quote.to,
            input_token: quote.input_token,
            output_token: quote.output_token,
            amount_in: quote.amount_in,
            amount_out: quote.amount_out,
            deadline: quote.deadline,
            nonce: quote.nonce,
            extra_data: "0x".to_string(),
            signature: signature_hex,
        })
    }
}
