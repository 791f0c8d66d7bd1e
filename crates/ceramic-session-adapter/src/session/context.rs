/*
[INPUT]:  A service configuration or a pre-built session service
[OUTPUT]: One session service reachable by all code running inside a scope
[POS]:    Session layer - explicit provisioning for consumers of the service
[UPDATE]: When changing how consumers locate the session service
*/

use std::future::Future;
use std::sync::Arc;

use crate::auth::CredentialSource;
use crate::http::{Result, SessionError};
use crate::session::{ServiceConfig, SessionService};

tokio::task_local! {
    static CURRENT_SERVICE: Arc<SessionService>;
}

/// Holds exactly one session service and provisions it to a scope.
///
/// Nested scopes shadow outer ones; task-locals are not inherited by
/// `tokio::spawn`ed tasks, so pass the context explicitly across spawns.
#[derive(Debug, Clone)]
pub struct SessionContext {
    service: Arc<SessionService>,
}

impl SessionContext {
    /// Construct a new service for the context
    pub fn from_config(
        config: ServiceConfig,
        credential_source: Option<Arc<dyn CredentialSource>>,
    ) -> Result<Self> {
        let mut service = SessionService::from_config(config)?;
        if let Some(source) = credential_source {
            service = service.with_credential_source(source);
        }
        Ok(Self::from_service(Arc::new(service)))
    }

    /// Provision an existing service instance
    pub fn from_service(service: Arc<SessionService>) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &Arc<SessionService> {
        &self.service
    }

    /// Run a future with this context's service reachable via [`current_service`]
    pub async fn scope<F: Future>(&self, future: F) -> F::Output {
        CURRENT_SERVICE.scope(self.service.clone(), future).await
    }

    /// Synchronous variant of [`SessionContext::scope`]
    pub fn sync_scope<R>(&self, f: impl FnOnce() -> R) -> R {
        CURRENT_SERVICE.sync_scope(self.service.clone(), f)
    }
}

/// The service provisioned by the innermost enclosing scope
pub fn current_service() -> Result<Arc<SessionService>> {
    CURRENT_SERVICE
        .try_with(Arc::clone)
        .map_err(|_| SessionError::MissingProvider)
}
