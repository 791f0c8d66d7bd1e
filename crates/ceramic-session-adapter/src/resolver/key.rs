/*
[INPUT]:  `did:key` identifiers (ed25519)
[OUTPUT]: DID documents derived from the key itself
[POS]:    Resolver layer - static key method, no external calls
[UPDATE]: When supporting more multicodec key types
*/

use std::sync::Arc;

use async_trait::async_trait;

use crate::http::{Result, SessionError};
use crate::resolver::{DidResolver, ResolverRegistry};
use crate::types::{
    Did, DidDocument, ED25519_VERIFICATION_KEY, VerificationMethod, decode_ed25519_multibase,
};

pub const KEY_DID_METHOD: &str = "key";

/// Resolves `did:key` ed25519 identifiers
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyDidResolver;

#[async_trait]
impl DidResolver for KeyDidResolver {
    async fn resolve(&self, did: &Did) -> Result<DidDocument> {
        let multibase = did.method_id();
        decode_ed25519_multibase(multibase)
            .map_err(|e| SessionError::resolution(did.base(), e.to_string()))?;

        let id = did.base();
        let method_id = format!("{id}#{multibase}");
        Ok(DidDocument {
            verification_method: vec![VerificationMethod {
                id: method_id.clone(),
                kind: ED25519_VERIFICATION_KEY.to_string(),
                controller: id.clone(),
                public_key_multibase: multibase.to_string(),
            }],
            authentication: vec![method_id],
            id,
        })
    }
}

pub fn get_resolver() -> ResolverRegistry {
    ResolverRegistry::single(KEY_DID_METHOD, Arc::new(KeyDidResolver))
}
