/*
[INPUT]:  Network identifier, authentication credential, link service endpoint
[OUTPUT]: DID provider capability for the linked identity
[POS]:    Auth layer - identity-link handshake (credential -> DID provider)
[UPDATE]: When link service endpoints or handshake steps change
*/

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, Url};
use serde::Deserialize;
use tracing::{debug, info};

use crate::auth::{AuthProvider, DidProvider, KeyDidProvider, PersistentKeyManager, challenge_message};
use crate::http::{ApiClient, ClientConfig, Result, SessionError};
use crate::types::{Did, Network};

const KEY_DIR_NAME: &str = ".ceramic-session";

/// Exchanges an authentication credential for a DID provider on a given network
#[async_trait]
pub trait IdentityLink: Send + Sync {
    async fn link(
        &self,
        network: Network,
        credential: Arc<dyn AuthProvider>,
    ) -> Result<Arc<dyn DidProvider>>;
}

/// Response of the challenge endpoint
#[derive(Debug, Deserialize)]
pub struct LinkChallenge {
    pub challenge: String,
}

/// Response of the confirm endpoint
#[derive(Debug, Deserialize)]
pub struct LinkConfirmation {
    pub did: String,
}

/// Identity link over a link service HTTP API.
///
/// Each account gets a persistent ed25519 session key; the link service
/// registers that key as an authentication key of the account's identity
/// once the wallet signs the challenge.
#[derive(Debug)]
pub struct HttpIdentityLink {
    api: ApiClient,
    key_manager: PersistentKeyManager,
}

impl HttpIdentityLink {
    /// Link service at an explicit URL, keys under `key_dir`
    pub fn new(base_url: Url, config: &ClientConfig, key_dir: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            api: ApiClient::new(base_url, config)?,
            key_manager: PersistentKeyManager::new(key_dir),
        })
    }

    pub fn key_manager(&self) -> &PersistentKeyManager {
        &self.key_manager
    }

    /// Step 1: request a challenge for the account
    ///
    /// POST /v1/link/challenge?network={network}
    pub async fn request_challenge(
        &self,
        network: Network,
        account_id: &str,
        request_id: &str,
    ) -> Result<LinkChallenge> {
        let body = serde_json::json!({
            "accountId": account_id,
            "requestId": request_id,
        });

        let endpoint = format!("v1/link/challenge?network={network}");
        let builder = self.api.request(Method::POST, &endpoint)?.json(&body);
        self.api.send_json(builder).await
    }

    /// Step 2: submit the wallet signature to bind the session key
    ///
    /// POST /v1/link/confirm?network={network}
    pub async fn confirm(
        &self,
        network: Network,
        account_id: &str,
        signature: &str,
        challenge: &str,
    ) -> Result<LinkConfirmation> {
        let body = serde_json::json!({
            "accountId": account_id,
            "signature": signature,
            "challenge": challenge,
        });

        let endpoint = format!("v1/link/confirm?network={network}");
        let builder = self.api.request(Method::POST, &endpoint)?.json(&body);
        self.api.send_json(builder).await
    }
}

#[async_trait]
impl IdentityLink for HttpIdentityLink {
    /// 1. Load or create the account's session key
    /// 2. Request a challenge
    /// 3. Sign the challenge message with the wallet
    /// 4. Confirm to learn the linked DID
    async fn link(
        &self,
        network: Network,
        credential: Arc<dyn AuthProvider>,
    ) -> Result<Arc<dyn DidProvider>> {
        let account_id = credential.account_id();

        let session_key = self
            .key_manager
            .get_or_create_signer(&account_id)
            .map_err(|e| {
                SessionError::Config(format!(
                    "Failed to load or create session key for {account_id}: {e}"
                ))
            })?;
        let request_id = session_key.did_key();

        let challenge = self
            .request_challenge(network, &account_id, &request_id)
            .await?;
        let message = challenge_message(&challenge.challenge)?;
        debug!(%account_id, %network, "signing link challenge");

        let signature = credential.sign_message(&message).await?;

        let confirmation = self
            .confirm(network, &account_id, &signature, &challenge.challenge)
            .await?;
        let did: Did = confirmation.did.parse().map_err(|_| {
            SessionError::InvalidResponse(format!("link service returned invalid DID: {}", confirmation.did))
        })?;

        info!(%account_id, did = %did, session_key = %request_id, "identity linked");
        Ok(Arc::new(KeyDidProvider::new(did.base(), session_key)))
    }
}

/// Default: `./.ceramic-session/keys` relative to current working directory.
pub fn default_key_dir() -> PathBuf {
    let base_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    base_dir.join(KEY_DIR_NAME).join("keys")
}
