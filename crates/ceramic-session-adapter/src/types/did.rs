/*
[INPUT]:  DID strings, DID documents from resolvers, raw ed25519 public keys
[OUTPUT]: Parsed DIDs, typed DID documents, ed25519 multibase encodings
[POS]:    Data layer - DID identifiers and documents
[UPDATE]: When supporting new key types or DID URL syntax
*/

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::http::{Result, SessionError};

/// Multicodec prefix for ed25519 public keys
pub const ED25519_MULTICODEC: [u8; 2] = [0xed, 0x01];

/// Verification method type for ed25519 keys
pub const ED25519_VERIFICATION_KEY: &str = "Ed25519VerificationKey2020";

/// Parsed DID URL: `did:<method>:<method-id>[?query][#fragment]`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Did {
    method: String,
    method_id: String,
    query: Option<String>,
    fragment: Option<String>,
}

impl Did {
    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn method_id(&self) -> &str {
        &self.method_id
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// The DID without query or fragment
    pub fn base(&self) -> String {
        format!("did:{}:{}", self.method, self.method_id)
    }
}

impl FromStr for Did {
    type Err = SessionError;

    fn from_str(value: &str) -> Result<Self> {
        let value = value.trim();
        let rest = value
            .strip_prefix("did:")
            .ok_or_else(|| SessionError::resolution(value, "missing did: scheme"))?;

        let (body, fragment) = match rest.split_once('#') {
            Some((body, fragment)) if !fragment.is_empty() => (body, Some(fragment.to_string())),
            Some(_) => return Err(SessionError::resolution(value, "empty fragment")),
            None => (rest, None),
        };

        let (body, query) = match body.split_once('?') {
            Some((body, query)) => (body, Some(query.to_string())),
            None => (body, None),
        };

        let (method, method_id) = body
            .split_once(':')
            .ok_or_else(|| SessionError::resolution(value, "missing method-specific id"))?;

        let method_ok = !method.is_empty()
            && method
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
        if !method_ok {
            return Err(SessionError::resolution(value, "invalid method name"));
        }
        if method_id.is_empty() {
            return Err(SessionError::resolution(value, "empty method-specific id"));
        }

        Ok(Self {
            method: method.to_string(),
            method_id: method_id.to_string(),
            query,
            fragment,
        })
    }
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "did:{}:{}", self.method, self.method_id)?;
        if let Some(query) = &self.query {
            write!(f, "?{query}")?;
        }
        if let Some(fragment) = &self.fragment {
            write!(f, "#{fragment}")?;
        }
        Ok(())
    }
}

/// A key listed in a DID document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMethod {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub controller: String,
    pub public_key_multibase: String,
}

/// Resolved DID document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DidDocument {
    pub id: String,
    #[serde(default)]
    pub verification_method: Vec<VerificationMethod>,
    #[serde(default)]
    pub authentication: Vec<String>,
}

impl DidDocument {
    /// Find a verification method by its full id (`did:...#fragment`)
    pub fn find_method(&self, id: &str) -> Option<&VerificationMethod> {
        self.verification_method.iter().find(|vm| vm.id == id)
    }

    /// Whether the method may be used to authenticate as this DID
    pub fn can_authenticate(&self, id: &str) -> bool {
        self.authentication.iter().any(|auth| auth == id)
    }
}

/// Encode an ed25519 public key as a base58btc multibase string (`z6Mk...`)
pub fn ed25519_multibase(public_key: &[u8; 32]) -> String {
    let mut prefixed = Vec::with_capacity(34);
    prefixed.extend_from_slice(&ED25519_MULTICODEC);
    prefixed.extend_from_slice(public_key);
    format!("z{}", bs58::encode(prefixed).into_string())
}

/// Decode a base58btc multibase ed25519 public key
pub fn decode_ed25519_multibase(multibase: &str) -> Result<[u8; 32]> {
    let encoded = multibase.strip_prefix('z').ok_or_else(|| {
        SessionError::InvalidSignature(format!("unsupported multibase encoding: {multibase}"))
    })?;
    let bytes = bs58::decode(encoded)
        .into_vec()
        .map_err(|e| SessionError::InvalidSignature(format!("invalid base58 key: {e}")))?;

    let key = bytes
        .strip_prefix(&ED25519_MULTICODEC)
        .ok_or_else(|| SessionError::InvalidSignature("key is not ed25519".to_string()))?;

    key.try_into().map_err(|_| {
        SessionError::InvalidSignature(format!(
            "invalid ed25519 key length: expected 32 bytes, got {}",
            key.len()
        ))
    })
}
