/*
[INPUT]:  Message bytes and optional secret key bytes
[OUTPUT]: Ed25519 signatures, did:key identifiers and key ids
[POS]:    Auth layer - session key signing for DID authentication
[UPDATE]: When changing signing algorithm or key format
*/

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier};
use rand::rngs::OsRng;

use crate::types::ed25519_multibase;

/// Ed25519 session key, addressable as a `did:key`
#[derive(Debug, Clone)]
pub struct Ed25519Signer {
    signing_key: SigningKey,
}

impl Ed25519Signer {
    /// Generate a new random keypair
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        Self { signing_key }
    }

    /// Create signer from existing secret key bytes (32 bytes)
    pub fn from_secret_key(bytes: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(bytes);
        Self { signing_key }
    }

    /// Sign a message and return the signature
    pub fn sign(&self, message: &[u8]) -> Signature {
        self.signing_key.sign(message)
    }

    /// Public key as base58btc multibase (`z6Mk...`)
    pub fn public_key_multibase(&self) -> String {
        ed25519_multibase(&self.public_key_bytes())
    }

    /// The `did:key` controlled by this key
    pub fn did_key(&self) -> String {
        format!("did:key:{}", self.public_key_multibase())
    }

    /// Key id used in JWS headers: `did:key:z...#z...`
    pub fn kid(&self) -> String {
        let multibase = self.public_key_multibase();
        format!("did:key:{multibase}#{multibase}")
    }

    /// Get the raw public key bytes
    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Get the raw secret key bytes
    pub fn secret_key_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }

    /// Verify a signature against a message
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        self.signing_key
            .verifying_key()
            .verify(message, signature)
            .is_ok()
    }
}
