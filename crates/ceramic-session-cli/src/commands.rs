/*
[INPUT]:  Parsed CLI configuration, network identifiers, DIDs
[OUTPUT]: Resolved endpoints, bound DID sessions, DID documents
[POS]:    Command layer - what each subcommand does, independent of argument parsing
[UPDATE]: When adding subcommands or changing their output
*/

use std::sync::Arc;

use anyhow::Context;
use ceramic_session_adapter::{
    CredentialSource, DidDocument, SessionContext, SessionService, Url, compose_resolvers,
    current_service, resolve_endpoint,
};
use tracing::info;

use crate::config::CliConfig;

/// Endpoint the service would use for `network`
pub fn endpoint(network: &str) -> anyhow::Result<Url> {
    resolve_endpoint(network).with_context(|| format!("resolve endpoint for {network}"))
}

/// Result of the `authenticate` subcommand
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// Configuration validated; no handshake was attempted
    DryRun { endpoint: Url },
    Authenticated { did: String },
}

/// Build the service for `config`, provision it, and run one handshake in its scope
pub async fn authenticate(
    config: CliConfig,
    source: Arc<dyn CredentialSource>,
    dry_run: bool,
) -> anyhow::Result<AuthOutcome> {
    let context = SessionContext::from_config(config.service, Some(source))
        .context("create session service")?;

    if dry_run {
        let endpoint = context.service().endpoint().clone();
        info!(%endpoint, "dry-run requested; configuration validated");
        return Ok(AuthOutcome::DryRun { endpoint });
    }

    context
        .scope(async {
            let service = current_service()?;
            let session = service.authenticate(None).await?;
            Ok::<_, anyhow::Error>(AuthOutcome::Authenticated {
                did: session.id()?.to_string(),
            })
        })
        .await
}

/// Resolve `did` with the registry an authenticated session would use
pub async fn resolve(config: CliConfig, did: &str) -> anyhow::Result<DidDocument> {
    let service = SessionService::from_config(config.service).context("create session service")?;
    let registry = compose_resolvers(service.client());
    info!(did, methods = ?registry.methods(), "resolving DID");
    registry
        .resolve(did)
        .await
        .with_context(|| format!("resolve {did}"))
}
