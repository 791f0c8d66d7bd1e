/*
[INPUT]:  JSON payloads, session keys, compact JWS / JWT strings
[OUTPUT]: Signed compact JWS, decoded headers/payloads, signature checks
[POS]:    Auth layer - JOSE encoding for DID authentication and link challenges
[UPDATE]: When adding signature algorithms or changing JOSE encoding
*/

use base64::{
    Engine as _,
    engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD},
};
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};

use crate::auth::Ed25519Signer;
use crate::http::{Result, SessionError};

pub const EDDSA: &str = "EdDSA";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwsHeader {
    pub alg: String,
    pub kid: String,
}

/// Compact JWS split into its base64url segments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Jws {
    protected: String,
    payload: String,
    signature: String,
}

impl Jws {
    /// Sign a JSON payload with a session key (`EdDSA`, kid = signer's `did:key` key id)
    pub fn sign(signer: &Ed25519Signer, payload: &serde_json::Value) -> Result<Self> {
        let header = JwsHeader {
            alg: EDDSA.to_string(),
            kid: signer.kid(),
        };
        let protected = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header)?);
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(payload)?);

        let signing_input = format!("{protected}.{payload}");
        let signature = URL_SAFE_NO_PAD.encode(signer.sign(signing_input.as_bytes()).to_bytes());

        Ok(Self {
            protected,
            payload,
            signature,
        })
    }

    pub fn parse(compact: &str) -> Result<Self> {
        let mut parts = compact.trim().split('.');
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(protected), Some(payload), Some(signature), None)
                if !protected.is_empty() && !signature.is_empty() =>
            {
                Ok(Self {
                    protected: protected.to_string(),
                    payload: payload.to_string(),
                    signature: signature.to_string(),
                })
            }
            _ => Err(SessionError::InvalidSignature(
                "JWS must have three non-empty segments".to_string(),
            )),
        }
    }

    pub fn compact(&self) -> String {
        format!("{}.{}.{}", self.protected, self.payload, self.signature)
    }

    pub fn header(&self) -> Result<JwsHeader> {
        Ok(serde_json::from_slice(&decode_segment(&self.protected)?)?)
    }

    pub fn payload(&self) -> Result<serde_json::Value> {
        Ok(serde_json::from_slice(&decode_segment(&self.payload)?)?)
    }

    /// Check the signature against a raw ed25519 public key
    pub fn verify(&self, public_key: &[u8; 32]) -> Result<()> {
        let header = self.header()?;
        if header.alg != EDDSA {
            return Err(SessionError::InvalidSignature(format!(
                "unsupported JWS alg: {}",
                header.alg
            )));
        }

        let key = VerifyingKey::from_bytes(public_key)
            .map_err(|e| SessionError::InvalidSignature(format!("invalid public key: {e}")))?;
        let signature = Signature::from_slice(&decode_segment(&self.signature)?)
            .map_err(|e| SessionError::InvalidSignature(format!("malformed signature: {e}")))?;

        let signing_input = format!("{}.{}", self.protected, self.payload);
        key.verify(signing_input.as_bytes(), &signature)
            .map_err(|_| SessionError::InvalidSignature(format!("signature mismatch for {}", header.kid)))
    }
}

/// Extract the human-readable `message` claim from a link challenge JWT
pub fn challenge_message(challenge: &str) -> Result<String> {
    let payload_b64 = challenge
        .trim()
        .split('.')
        .nth(1)
        .ok_or_else(|| SessionError::InvalidResponse("challenge is not a valid JWT".to_string()))?;

    let payload: serde_json::Value = serde_json::from_slice(&decode_segment(payload_b64)?)?;
    payload
        .get("message")
        .and_then(|value| value.as_str())
        .map(str::to_string)
        .ok_or_else(|| SessionError::InvalidResponse("challenge JWT missing 'message' claim".to_string()))
}

fn decode_segment(segment: &str) -> Result<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .or_else(|_| URL_SAFE.decode(segment))
        .map_err(|e| SessionError::InvalidResponse(format!("invalid base64url segment: {e}")))
}
