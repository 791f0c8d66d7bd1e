/*
[INPUT]:  Injected credential strategies (closures, environment variables)
[OUTPUT]: Authentication credentials on demand
[POS]:    Auth layer - credential acquisition used when authenticate() gets no credential
[UPDATE]: When adding new ways to obtain wallet credentials
*/

use std::env;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::auth::{AuthProvider, EvmWalletSigner};
use crate::http::{Result, SessionError};
use crate::types::Chain;

/// Source of authentication credentials, injected at service construction
#[async_trait]
pub trait CredentialSource: Send + Sync {
    async fn acquire(&self) -> Result<Arc<dyn AuthProvider>>;
}

/// Credential source backed by an async closure
pub struct FnCredentialSource<F> {
    acquire: F,
}

impl<F, Fut> FnCredentialSource<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<Arc<dyn AuthProvider>>> + Send,
{
    pub fn new(acquire: F) -> Self {
        Self { acquire }
    }
}

#[async_trait]
impl<F, Fut> CredentialSource for FnCredentialSource<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<Arc<dyn AuthProvider>>> + Send,
{
    async fn acquire(&self) -> Result<Arc<dyn AuthProvider>> {
        (self.acquire)().await
    }
}

/// Wrap an async closure as a shared credential source
pub fn credential_source_fn<F, Fut>(acquire: F) -> Arc<dyn CredentialSource>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Arc<dyn AuthProvider>>> + Send + 'static,
{
    Arc::new(FnCredentialSource::new(acquire))
}

/// Reads an EVM private key from an environment variable each time a credential is needed
#[derive(Clone, PartialEq, Eq)]
pub struct EnvKeyCredentialSource {
    var: String,
    chain: Chain,
}

impl EnvKeyCredentialSource {
    pub fn new(var: impl Into<String>, chain: Chain) -> Self {
        Self {
            var: var.into(),
            chain,
        }
    }

    pub fn var(&self) -> &str {
        &self.var
    }
}

impl fmt::Debug for EnvKeyCredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvKeyCredentialSource")
            .field("var", &self.var)
            .field("chain", &self.chain)
            .finish()
    }
}

#[async_trait]
impl CredentialSource for EnvKeyCredentialSource {
    async fn acquire(&self) -> Result<Arc<dyn AuthProvider>> {
        let private_key = env::var(&self.var)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| {
                SessionError::Config(format!("environment variable {} is not set", self.var))
            })?;

        let wallet = EvmWalletSigner::for_chain(&private_key, self.chain)?;
        debug!(var = %self.var, address = wallet.address(), "loaded wallet credential");
        Ok(Arc::new(wallet))
    }
}
