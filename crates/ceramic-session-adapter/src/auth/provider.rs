/*
[INPUT]:  Authentication challenges (nonce, audience, paths) and payloads to sign
[OUTPUT]: Signed JWS proving control of a DID
[POS]:    Auth layer - DID provider capability produced by the identity link
[UPDATE]: When the authentication challenge format changes
*/

use std::fmt;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::{Ed25519Signer, Jws};
use crate::http::Result;

const AUTH_RESPONSE_TTL_SECS: i64 = 600;

/// Challenge a DID session sends to its provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthRequest {
    pub nonce: String,
    pub aud: String,
    #[serde(default)]
    pub paths: Vec<String>,
}

/// Capability to act as a DID
#[async_trait]
pub trait DidProvider: Send + Sync {
    /// The DID this provider controls
    fn did(&self) -> &str;

    /// Answer an authentication challenge
    async fn authenticate(&self, request: &AuthRequest) -> Result<Jws>;

    /// Sign an arbitrary JSON payload as this DID
    async fn create_jws(&self, payload: &serde_json::Value) -> Result<Jws>;
}

/// Provider for a DID whose authentication key is a local ed25519 session key.
///
/// The DID is either the session key's own `did:key` or an identity the key
/// was linked to.
#[derive(Clone)]
pub struct KeyDidProvider {
    did: String,
    signer: Ed25519Signer,
}

impl KeyDidProvider {
    pub fn new(did: impl Into<String>, signer: Ed25519Signer) -> Self {
        Self {
            did: did.into(),
            signer,
        }
    }

    /// Provider acting as the session key's own `did:key`
    pub fn from_key(signer: Ed25519Signer) -> Self {
        Self::new(signer.did_key(), signer)
    }

    pub fn session_key(&self) -> &Ed25519Signer {
        &self.signer
    }
}

#[async_trait]
impl DidProvider for KeyDidProvider {
    fn did(&self) -> &str {
        &self.did
    }

    async fn authenticate(&self, request: &AuthRequest) -> Result<Jws> {
        let expires_at = Utc::now() + Duration::seconds(AUTH_RESPONSE_TTL_SECS);
        let payload = serde_json::json!({
            "did": self.did,
            "nonce": request.nonce,
            "aud": request.aud,
            "paths": request.paths,
            "exp": expires_at.timestamp(),
        });
        Jws::sign(&self.signer, &payload)
    }

    async fn create_jws(&self, payload: &serde_json::Value) -> Result<Jws> {
        Jws::sign(&self.signer, payload)
    }
}

impl fmt::Debug for KeyDidProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyDidProvider")
            .field("did", &self.did)
            .field("session_key", &self.signer.did_key())
            .finish()
    }
}
