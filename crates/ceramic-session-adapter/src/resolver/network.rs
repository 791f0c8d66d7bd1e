/*
[INPUT]:  `did:3` identifiers and the network node transport
[OUTPUT]: DID documents built from identity streams stored on the network
[POS]:    Resolver layer - network identity method
[UPDATE]: When the identity document layout on the network changes
*/

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::http::{ApiClient, Result, SessionError};
use crate::resolver::{DidResolver, ResolverRegistry};
use crate::types::{
    Did, DidDocument, ED25519_VERIFICATION_KEY, VerificationMethod, decode_ed25519_multibase,
};

pub const NETWORK_DID_METHOD: &str = "3";

/// Resolves network identities by loading their stream from a node.
///
/// The stream content carries a `publicKeys` map of key name to multibase
/// key; ed25519 keys become authentication methods `did:3:<id>#<name>`.
#[derive(Debug, Clone)]
pub struct NetworkDidResolver {
    api: ApiClient,
}

impl NetworkDidResolver {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl DidResolver for NetworkDidResolver {
    async fn resolve(&self, did: &Did) -> Result<DidDocument> {
        let id = did.base();
        // version queries resolve to the latest state
        let stream_id = did.method_id();
        if !is_stream_id(stream_id) {
            return Err(SessionError::resolution(&id, "method id is not a stream id"));
        }

        let stream = self.api.load_stream(stream_id).await.map_err(|e| match e {
            SessionError::Api { code: 404, .. } => {
                SessionError::resolution(&id, "identity stream not found")
            }
            other => other,
        })?;

        let public_keys = stream
            .state
            .content
            .get("publicKeys")
            .and_then(|keys| keys.as_object())
            .ok_or_else(|| SessionError::resolution(&id, "identity document has no publicKeys"))?;

        let mut verification_method = Vec::new();
        for (name, key) in public_keys {
            let Some(multibase) = key.as_str() else {
                continue;
            };
            if decode_ed25519_multibase(multibase).is_err() {
                debug!(did = %id, key = %name, "skipping non-ed25519 key");
                continue;
            }
            verification_method.push(VerificationMethod {
                id: format!("{id}#{name}"),
                kind: ED25519_VERIFICATION_KEY.to_string(),
                controller: id.clone(),
                public_key_multibase: multibase.to_string(),
            });
        }

        let authentication = verification_method.iter().map(|vm| vm.id.clone()).collect();
        Ok(DidDocument {
            id,
            verification_method,
            authentication,
        })
    }
}

/// Stream ids are base36 multibase strings: ASCII alphanumerics only
fn is_stream_id(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_alphanumeric())
}

pub fn get_resolver(api: ApiClient) -> ResolverRegistry {
    ResolverRegistry::single(NETWORK_DID_METHOD, Arc::new(NetworkDidResolver::new(api)))
}
