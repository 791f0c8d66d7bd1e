/*
[INPUT]:  EVM private key (hex string) and target chain
[OUTPUT]: EIP-191 signed messages and checksummed wallet address
[POS]:    Auth layer - EVM wallet credential implementation
[UPDATE]: When signing logic or EVM address formatting changes
*/

use std::fmt;
use std::str::FromStr;

use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;

use crate::auth::AuthProvider;
use crate::http::{Result, SessionError};
use crate::types::Chain;

/// Credential backed by a local EVM private key
pub struct EvmWalletSigner {
    signer: PrivateKeySigner,
    address: String,
    chain: Chain,
}

impl EvmWalletSigner {
    /// Create a signer for Ethereum mainnet from a hex-encoded private key
    ///
    /// Supports both "0x"-prefixed and non-prefixed hex strings.
    pub fn new(private_key_hex: &str) -> Result<Self> {
        Self::for_chain(private_key_hex, Chain::Ethereum)
    }

    pub fn for_chain(private_key_hex: &str, chain: Chain) -> Result<Self> {
        let private_key_hex = private_key_hex.trim();
        let private_key_hex = private_key_hex
            .strip_prefix("0x")
            .unwrap_or(private_key_hex);
        let signer = PrivateKeySigner::from_str(private_key_hex)
            .map_err(|e| SessionError::Config(format!("Invalid EVM private key: {e}")))?;

        let address = signer.address().to_checksum(None);

        Ok(Self {
            signer,
            address,
            chain,
        })
    }
}

impl fmt::Debug for EvmWalletSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvmWalletSigner")
            .field("address", &self.address)
            .field("chain", &self.chain)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl AuthProvider for EvmWalletSigner {
    fn chain(&self) -> Chain {
        self.chain
    }

    fn address(&self) -> &str {
        &self.address
    }

    async fn sign_message(&self, message: &str) -> Result<String> {
        let signature = self
            .signer
            .sign_message(message.as_bytes())
            .await
            .map_err(|e| SessionError::Internal(format!("Failed to sign EVM message: {e}")))?;

        // [r, s, v]
        Ok(format!("0x{}", hex::encode(signature.as_bytes())))
    }
}
