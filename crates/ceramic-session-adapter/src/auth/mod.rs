/*
[INPUT]:  Wallet credentials, session keys and link service configuration
[OUTPUT]: DID provider capabilities, signed JWS, credential sources
[POS]:    Auth layer - everything between a wallet and a DID provider
[UPDATE]: When auth flow or signature methods change
*/

pub mod evm_wallet;
pub mod jws;
pub mod link;
pub mod persistent_key;
pub mod provider;
pub mod signer;
pub mod source;
pub mod wallet;

pub use evm_wallet::EvmWalletSigner;
pub use jws::{Jws, JwsHeader, challenge_message};
pub use link::{HttpIdentityLink, IdentityLink, LinkChallenge, LinkConfirmation, default_key_dir};
pub use persistent_key::PersistentKeyManager;
pub use provider::{AuthRequest, DidProvider, KeyDidProvider};
pub use signer::Ed25519Signer;
pub use source::{CredentialSource, EnvKeyCredentialSource, FnCredentialSource, credential_source_fn};
pub use wallet::{AuthProvider, MockAuthProvider};
