/*
[INPUT]:  DID strings, per-method resolvers, the network client
[OUTPUT]: Resolved DID documents through one composed registry
[POS]:    Resolver layer - DID method dispatch used by DID sessions
[UPDATE]: When adding DID methods or changing merge policy
*/

pub mod key;
pub mod network;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::http::{NetworkClient, Result, SessionError};
use crate::types::{Did, DidDocument};

pub use key::KeyDidResolver;
pub use network::{NETWORK_DID_METHOD, NetworkDidResolver};

/// Resolves DIDs of one method into documents
#[async_trait]
pub trait DidResolver: Send + Sync {
    async fn resolve(&self, did: &Did) -> Result<DidDocument>;
}

/// Mapping from DID method name to resolver.
///
/// Registration is last-wins: a second resolver under the same method name
/// silently shadows the first.
#[derive(Clone, Default)]
pub struct ResolverRegistry {
    resolvers: BTreeMap<String, Arc<dyn DidResolver>>,
}

impl ResolverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding a single method
    pub fn single(method: impl Into<String>, resolver: Arc<dyn DidResolver>) -> Self {
        let mut registry = Self::new();
        registry.register(method, resolver);
        registry
    }

    /// Register a resolver, returning the one it shadows
    pub fn register(
        &mut self,
        method: impl Into<String>,
        resolver: Arc<dyn DidResolver>,
    ) -> Option<Arc<dyn DidResolver>> {
        self.resolvers.insert(method.into(), resolver)
    }

    /// Merge another registry into this one; entries of `other` win on collision
    pub fn merge(mut self, other: ResolverRegistry) -> Self {
        self.resolvers.extend(other.resolvers);
        self
    }

    pub fn get(&self, method: &str) -> Option<&Arc<dyn DidResolver>> {
        self.resolvers.get(method)
    }

    pub fn contains(&self, method: &str) -> bool {
        self.resolvers.contains_key(method)
    }

    /// Registered method names, sorted
    pub fn methods(&self) -> Vec<&str> {
        self.resolvers.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    /// Resolve a DID (fragment ignored) through the resolver of its method
    pub async fn resolve(&self, did: &str) -> Result<DidDocument> {
        let did: Did = did.parse()?;
        let resolver = self
            .resolvers
            .get(did.method())
            .ok_or_else(|| SessionError::UnsupportedDidMethod(did.method().to_string()))?;
        resolver.resolve(&did).await
    }
}

impl fmt::Debug for ResolverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverRegistry")
            .field("methods", &self.methods())
            .finish()
    }
}

/// Registry used by DID sessions: the static `key` method plus the network
/// identity method reading documents through `client`.
pub fn compose_resolvers(client: &NetworkClient) -> ResolverRegistry {
    key::get_resolver().merge(network::get_resolver(client.api().clone()))
}
