/*
[INPUT]:  DID provider capability and a composed resolver registry
[OUTPUT]: Verified DID identity, JWS creation and verification
[POS]:    Session layer - the authenticated identity object bound to the network client
[UPDATE]: When the self-authentication challenge or JWS checks change
*/

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use crate::auth::{AuthRequest, DidProvider, Jws};
use crate::http::{Result, SessionError};
use crate::resolver::ResolverRegistry;
use crate::types::{Did, VerificationMethod, decode_ed25519_multibase};

const AUTH_AUDIENCE: &str = "ceramic-session";

/// A JWS whose signature and signer authority were checked
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedJws {
    /// DID the payload speaks for
    pub issuer: String,
    /// Key that produced the signature
    pub kid: String,
    pub payload: serde_json::Value,
}

/// Authenticated identity: a provider capability plus the resolvers used to check it.
pub struct DidSession {
    provider: Arc<dyn DidProvider>,
    resolver: ResolverRegistry,
    id: Option<String>,
}

impl DidSession {
    pub fn new(provider: Arc<dyn DidProvider>, resolver: ResolverRegistry) -> Self {
        Self {
            provider,
            resolver,
            id: None,
        }
    }

    /// Whether `authenticate` has succeeded
    pub fn authenticated(&self) -> bool {
        self.id.is_some()
    }

    /// The authenticated DID
    pub fn id(&self) -> Result<&str> {
        self.id.as_deref().ok_or(SessionError::NotAuthenticated)
    }

    pub fn resolver(&self) -> &ResolverRegistry {
        &self.resolver
    }

    /// Challenge the provider with a fresh nonce and verify its answer
    /// against the resolved DID document.
    pub async fn authenticate(&mut self) -> Result<String> {
        let request = AuthRequest {
            nonce: Uuid::new_v4().to_string(),
            aud: AUTH_AUDIENCE.to_string(),
            paths: Vec::new(),
        };

        let jws = self.provider.authenticate(&request).await?;
        let verified = self.verify_jws(&jws).await?;

        let nonce = verified.payload.get("nonce").and_then(|v| v.as_str());
        if nonce != Some(request.nonce.as_str()) {
            return Err(SessionError::InvalidSignature(
                "authentication response nonce mismatch".to_string(),
            ));
        }
        if verified.issuer != self.provider.did() {
            return Err(SessionError::InvalidSignature(format!(
                "authentication response issued for {} instead of {}",
                verified.issuer,
                self.provider.did()
            )));
        }

        debug!(did = %verified.issuer, kid = %verified.kid, "DID session authenticated");
        self.id = Some(verified.issuer.clone());
        Ok(verified.issuer)
    }

    /// Sign a payload as the authenticated DID
    pub async fn create_jws(&self, payload: &serde_json::Value) -> Result<Jws> {
        self.id()?;
        self.provider.create_jws(payload).await
    }

    /// Verify a JWS: the signature must match the `kid` key, the key must
    /// not be expired, and when the payload names another `did` the key
    /// must be one of that DID's authentication keys.
    pub async fn verify_jws(&self, jws: &Jws) -> Result<VerifiedJws> {
        let header = jws.header()?;
        let payload = jws.payload()?;

        let kid: Did = header.kid.parse()?;
        if kid.fragment().is_none() {
            return Err(SessionError::InvalidSignature(format!(
                "kid {} does not name a key",
                header.kid
            )));
        }

        let signer_doc = self.resolver.resolve(&kid.base()).await?;
        let signing_key = signer_doc.find_method(&header.kid).ok_or_else(|| {
            SessionError::InvalidSignature(format!("{} not found in signer document", header.kid))
        })?;
        jws.verify(&decode_ed25519_multibase(&signing_key.public_key_multibase)?)?;

        if let Some(exp) = payload.get("exp").and_then(|v| v.as_i64()) {
            if exp < Utc::now().timestamp() {
                return Err(SessionError::InvalidSignature("JWS has expired".to_string()));
            }
        }

        let issuer = payload
            .get("did")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| kid.base());

        if issuer != kid.base() {
            let issuer_doc = self.resolver.resolve(&issuer).await?;
            let authorized = issuer_doc
                .verification_method
                .iter()
                .any(|vm| same_key(vm, signing_key) && issuer_doc.can_authenticate(&vm.id));
            if !authorized {
                return Err(SessionError::InvalidSignature(format!(
                    "{} is not an authentication key of {issuer}",
                    header.kid
                )));
            }
        }

        Ok(VerifiedJws {
            issuer,
            kid: header.kid,
            payload,
        })
    }
}

fn same_key(a: &VerificationMethod, b: &VerificationMethod) -> bool {
    a.public_key_multibase == b.public_key_multibase
}

impl fmt::Debug for DidSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DidSession")
            .field("provider_did", &self.provider.did())
            .field("id", &self.id)
            .field("resolver", &self.resolver)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;

    use crate::auth::{Ed25519Signer, KeyDidProvider};
    use crate::resolver::{DidResolver, KeyDidResolver};
    use crate::types::{DidDocument, ED25519_VERIFICATION_KEY};

    /// Identity document listing a fixed set of keys for `did:test:*`
    struct StaticIdentityResolver {
        keys: Vec<String>,
    }

    #[async_trait]
    impl DidResolver for StaticIdentityResolver {
        async fn resolve(&self, did: &Did) -> Result<DidDocument> {
            let id = did.base();
            let verification_method: Vec<VerificationMethod> = self
                .keys
                .iter()
                .enumerate()
                .map(|(i, key)| VerificationMethod {
                    id: format!("{id}#key-{i}"),
                    kind: ED25519_VERIFICATION_KEY.to_string(),
                    controller: id.clone(),
                    public_key_multibase: key.clone(),
                })
                .collect();
            let authentication = verification_method.iter().map(|vm| vm.id.clone()).collect();
            Ok(DidDocument {
                id,
                verification_method,
                authentication,
            })
        }
    }

    fn registry(identity_keys: Vec<String>) -> ResolverRegistry {
        let mut registry = ResolverRegistry::new();
        registry.register("key", Arc::new(KeyDidResolver));
        registry.register("test", Arc::new(StaticIdentityResolver { keys: identity_keys }));
        registry
    }

    #[tokio::test]
    async fn test_authenticate_did_key_session() {
        let signer = Ed25519Signer::from_secret_key(&[11u8; 32]);
        let provider = Arc::new(KeyDidProvider::from_key(signer.clone()));
        let mut session = DidSession::new(provider, registry(vec![]));

        assert!(matches!(session.id(), Err(SessionError::NotAuthenticated)));
        let did = session.authenticate().await.unwrap();

        assert_eq!(did, signer.did_key());
        assert!(session.authenticated());
        assert_eq!(session.id().unwrap(), signer.did_key());
    }

    #[tokio::test]
    async fn test_authenticate_linked_identity() {
        let signer = Ed25519Signer::from_secret_key(&[12u8; 32]);
        let provider = Arc::new(KeyDidProvider::new("did:test:alice", signer.clone()));
        let mut session =
            DidSession::new(provider, registry(vec![signer.public_key_multibase()]));

        assert_eq!(session.authenticate().await.unwrap(), "did:test:alice");
    }

    #[tokio::test]
    async fn test_unlinked_key_fails_verification() {
        let signer = Ed25519Signer::from_secret_key(&[13u8; 32]);
        let stranger = Ed25519Signer::from_secret_key(&[14u8; 32]);
        let provider = Arc::new(KeyDidProvider::new("did:test:alice", signer));
        let mut session =
            DidSession::new(provider, registry(vec![stranger.public_key_multibase()]));

        let err = session.authenticate().await.unwrap_err();
        assert!(matches!(err, SessionError::InvalidSignature(_)));
        assert!(!session.authenticated());
    }

    #[tokio::test]
    async fn test_create_jws_requires_authentication() {
        let signer = Ed25519Signer::from_secret_key(&[15u8; 32]);
        let provider = Arc::new(KeyDidProvider::from_key(signer));
        let mut session = DidSession::new(provider, registry(vec![]));

        let payload = serde_json::json!({"hello": "world"});
        assert!(matches!(
            session.create_jws(&payload).await,
            Err(SessionError::NotAuthenticated)
        ));

        session.authenticate().await.unwrap();
        let jws = session.create_jws(&payload).await.unwrap();
        let verified = session.verify_jws(&jws).await.unwrap();
        assert_eq!(verified.payload, payload);
        assert_eq!(verified.issuer, session.id().unwrap());
    }

    #[tokio::test]
    async fn test_expired_jws_is_rejected() {
        let signer = Ed25519Signer::from_secret_key(&[16u8; 32]);
        let provider = Arc::new(KeyDidProvider::from_key(signer.clone()));
        let session = DidSession::new(provider, registry(vec![]));

        let jws = Jws::sign(&signer, &serde_json::json!({"exp": 1})).unwrap();
        let err = session.verify_jws(&jws).await.unwrap_err();
        assert!(matches!(err, SessionError::InvalidSignature(_)));
    }
}
