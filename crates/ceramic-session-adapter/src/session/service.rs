/*
[INPUT]:  Service configuration, optional credential source, wallet credentials
[OUTPUT]: Verified DID sessions bound to the network client + authentication signal
[POS]:    Session layer - orchestrates the complete authentication handshake
[UPDATE]: When handshake stages or service construction options change
*/

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use futures_util::stream::BoxStream;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::auth::{AuthProvider, CredentialSource, HttpIdentityLink, IdentityLink, default_key_dir};
use crate::http::{ClientConfig, NetworkClient, Result, SessionError};
use crate::resolver::compose_resolvers;
use crate::session::{AuthenticationSignal, DidSession};
use crate::types::Network;

/// Everything needed to construct a session service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub network: Network,
    /// Gateway override; the network default is used when absent
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Identity-link service override
    #[serde(default)]
    pub link_endpoint: Option<String>,
    /// Where per-account session keys are stored
    #[serde(default)]
    pub key_dir: Option<PathBuf>,
    #[serde(default)]
    pub client: ClientConfig,
}

impl ServiceConfig {
    pub fn new(network: Network) -> Self {
        Self {
            network,
            endpoint: None,
            link_endpoint: None,
            key_dir: None,
            client: ClientConfig::default(),
        }
    }
}

/// Stages of one `authenticate` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeStage {
    Idle,
    AcquiringCredential,
    Linking,
    ResolvingIdentity,
    Verifying,
    Bound,
}

impl HandshakeStage {
    /// Stage a handshake error was raised in
    pub fn failed_at(err: &SessionError) -> Self {
        match err {
            SessionError::CredentialAcquisition(_) => HandshakeStage::AcquiringCredential,
            SessionError::LinkHandshake(_) => HandshakeStage::Linking,
            SessionError::SessionVerification(_) => HandshakeStage::Verifying,
            _ => HandshakeStage::Idle,
        }
    }
}

impl fmt::Display for HandshakeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HandshakeStage::Idle => "idle",
            HandshakeStage::AcquiringCredential => "acquiring_credential",
            HandshakeStage::Linking => "linking",
            HandshakeStage::ResolvingIdentity => "resolving_identity",
            HandshakeStage::Verifying => "verifying",
            HandshakeStage::Bound => "bound",
        };
        f.write_str(name)
    }
}

/// Authentication/session service for one network.
///
/// Owns the only write path to the network client's session field and to the
/// authentication signal. Concurrent `authenticate` calls run independently;
/// the last one to reach `Bound` determines the final session.
pub struct SessionService {
    network: Network,
    client: Arc<NetworkClient>,
    identity_link: Arc<dyn IdentityLink>,
    credential_source: Option<Arc<dyn CredentialSource>>,
    authenticated: AuthenticationSignal,
}

impl SessionService {
    /// Service on the network's default gateway and link service
    pub fn new(network: Network) -> Result<Self> {
        Self::from_config(ServiceConfig::new(network))
    }

    pub fn from_config(config: ServiceConfig) -> Result<Self> {
        let endpoint = config.network.effective_endpoint(config.endpoint.as_deref())?;
        let client = NetworkClient::new(endpoint, &config.client)?;

        let link_url = match config.link_endpoint.as_deref() {
            Some(url) => Url::parse(url)?,
            None => Url::parse(config.network.link_service())?,
        };
        let key_dir = config.key_dir.unwrap_or_else(default_key_dir);
        let identity_link = HttpIdentityLink::new(link_url, &config.client, key_dir)?;

        info!(
            network = %config.network,
            endpoint = %client.endpoint(),
            "session service created"
        );

        Ok(Self {
            network: config.network,
            client: Arc::new(client),
            identity_link: Arc::new(identity_link),
            credential_source: None,
            authenticated: AuthenticationSignal::new(),
        })
    }

    /// Source used when `authenticate` is called without a credential
    pub fn with_credential_source(mut self, source: Arc<dyn CredentialSource>) -> Self {
        self.credential_source = Some(source);
        self
    }

    /// Replace the identity-link protocol implementation
    pub fn with_identity_link(mut self, identity_link: Arc<dyn IdentityLink>) -> Self {
        self.identity_link = identity_link;
        self
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn endpoint(&self) -> &Url {
        self.client.endpoint()
    }

    pub fn client(&self) -> &Arc<NetworkClient> {
        &self.client
    }

    pub fn has_credential_source(&self) -> bool {
        self.credential_source.is_some()
    }

    /// Snapshot of the authentication signal
    pub fn is_authenticated(&self) -> bool {
        self.authenticated.current()
    }

    pub fn authentication_signal(&self) -> &AuthenticationSignal {
        &self.authenticated
    }

    /// Authentication state stream, replaying the latest value first
    pub fn subscribe_authenticated(&self) -> BoxStream<'static, bool> {
        self.authenticated.subscribe()
    }

    /// The bound DID session
    pub fn current_session(&self) -> Result<Arc<DidSession>> {
        self.client.session().ok_or(SessionError::NotAuthenticated)
    }

    /// Obtain a credential from the injected source
    pub async fn acquire_credential(&self) -> Result<Arc<dyn AuthProvider>> {
        let source = self.credential_source.as_ref().ok_or_else(|| {
            SessionError::credential(SessionError::Config(
                "no credential supplied and no credential source configured".to_string(),
            ))
        })?;

        let credential = source.acquire().await.map_err(SessionError::credential)?;
        if credential.address().trim().is_empty() {
            return Err(SessionError::credential(SessionError::InvalidResponse(
                "credential source returned an account without an address".to_string(),
            )));
        }
        Ok(credential)
    }

    /// Exchange a credential for a verified DID session and bind it.
    ///
    /// Without a credential the injected source is asked for one. Nothing is
    /// committed unless verification succeeds.
    pub async fn authenticate(
        &self,
        credential: Option<Arc<dyn AuthProvider>>,
    ) -> Result<Arc<DidSession>> {
        let span = info_span!(
            "authenticate",
            attempt = %Uuid::new_v4(),
            network = %self.network,
        );

        async move {
            let result = self.run_handshake(credential).await;
            if let Err(err) = &result {
                warn!(
                    error = %err,
                    stage = %HandshakeStage::failed_at(err),
                    "authentication aborted"
                );
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn run_handshake(
        &self,
        credential: Option<Arc<dyn AuthProvider>>,
    ) -> Result<Arc<DidSession>> {
        let credential = match credential {
            Some(credential) => credential,
            None => {
                debug!(stage = %HandshakeStage::AcquiringCredential, "requesting credential");
                self.acquire_credential().await?
            }
        };

        debug!(
            stage = %HandshakeStage::Linking,
            account_id = %credential.account_id(),
            "linking identity"
        );
        let provider = self
            .identity_link
            .link(self.network, credential)
            .await
            .map_err(SessionError::link)?;

        debug!(stage = %HandshakeStage::ResolvingIdentity, did = provider.did(), "composing resolvers");
        let resolver = compose_resolvers(&self.client);

        debug!(stage = %HandshakeStage::Verifying, "verifying DID session");
        let mut session = DidSession::new(provider, resolver);
        let did = session
            .authenticate()
            .await
            .map_err(SessionError::verification)?;

        let session = Arc::new(session);
        self.bind(session.clone());
        info!(stage = %HandshakeStage::Bound, %did, "DID session bound");
        Ok(session)
    }

    /// Commit: set the client's session field, then publish `true`, without suspending.
    fn bind(&self, session: Arc<DidSession>) {
        self.client
            .bind_session(session, || self.authenticated.publish(true));
    }
}

impl fmt::Debug for SessionService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionService")
            .field("network", &self.network)
            .field("client", &self.client)
            .field("has_credential_source", &self.has_credential_source())
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}
