/*
[INPUT]:  Challenge messages to sign and wallet account data
[OUTPUT]: Signatures and CAIP-10 account ids for the identity-link handshake
[POS]:    Auth layer - authentication credential abstraction
[UPDATE]: When adding new wallet types or changing signature format
*/

use async_trait::async_trait;

use crate::http::{Result, SessionError};
use crate::types::Chain;

/// An authentication credential: a wallet address plus the ability to sign with it.
///
/// Implement this for any wallet integration. The trait is async to support
/// hardware wallets and external signers that prompt the user.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Chain the account lives on
    fn chain(&self) -> Chain;

    /// Wallet address
    fn address(&self) -> &str;

    /// CAIP-10 account id, e.g. `eip155:1:0xabc...`
    fn account_id(&self) -> String {
        format!("{}:{}", self.chain().caip2(), self.address().to_ascii_lowercase())
    }

    /// Sign a link challenge; a user refusal surfaces as `SigningRejected`
    async fn sign_message(&self, message: &str) -> Result<String>;
}

/// Mock credential for testing
#[derive(Debug, Clone)]
pub struct MockAuthProvider {
    chain: Chain,
    address: String,
    signature: Option<String>,
}

impl MockAuthProvider {
    /// Create a mock that always answers with a predetermined signature
    pub fn new(chain: Chain, address: &str, signature: &str) -> Self {
        Self {
            chain,
            address: address.to_string(),
            signature: Some(signature.to_string()),
        }
    }

    /// Create a mock whose user declines every signing request
    pub fn declining(chain: Chain, address: &str) -> Self {
        Self {
            chain,
            address: address.to_string(),
            signature: None,
        }
    }
}

#[async_trait]
impl AuthProvider for MockAuthProvider {
    fn chain(&self) -> Chain {
        self.chain
    }

    fn address(&self) -> &str {
        &self.address
    }

    async fn sign_message(&self, _message: &str) -> Result<String> {
        self.signature
            .clone()
            .ok_or_else(|| SessionError::SigningRejected("user declined signing".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_provider() {
        let provider = MockAuthProvider::new(Chain::Ethereum, "0xABCDEF", "0xmock_signature");

        assert_eq!(provider.chain(), Chain::Ethereum);
        assert_eq!(provider.address(), "0xABCDEF");
        assert_eq!(provider.account_id(), "eip155:1:0xabcdef");

        let signature = provider.sign_message("link challenge").await.unwrap();
        assert_eq!(signature, "0xmock_signature");
    }

    #[tokio::test]
    async fn test_declining_provider() {
        let provider = MockAuthProvider::declining(Chain::Polygon, "0x01");
        assert_eq!(provider.account_id(), "eip155:137:0x01");

        let err = provider.sign_message("link challenge").await.unwrap_err();
        assert!(matches!(err, SessionError::SigningRejected(_)));
    }
}
