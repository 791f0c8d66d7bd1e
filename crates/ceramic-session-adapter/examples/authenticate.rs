/*
[INPUT]:  EVM private key from the environment, network name from argv
[OUTPUT]: Linked DID printed to stdout
[POS]:    Examples - session service authentication flow
[UPDATE]: When the authenticate flow changes
*/

use std::sync::Arc;

use ceramic_session_adapter::*;
use futures_util::StreamExt;

/// Example: authenticate against a network
///
/// 1. Resolve the network and create the service
/// 2. Inject a credential source reading `CERAMIC_WALLET_KEY`
/// 3. Watch the authentication signal
/// 4. Authenticate and print the DID
#[tokio::main]
async fn main() -> Result<()> {
    let network: Network = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "testnet-clay".to_string())
        .parse()?;

    let source = EnvKeyCredentialSource::new("CERAMIC_WALLET_KEY", Chain::Ethereum);
    let service = SessionService::new(network)?.with_credential_source(Arc::new(source));
    println!("Network {network} -> {}", service.endpoint());

    let mut updates = service.subscribe_authenticated();
    tokio::spawn(async move {
        while let Some(authenticated) = updates.next().await {
            println!("authenticated: {authenticated}");
        }
    });

    match service.authenticate(None).await {
        Ok(session) => println!("DID: {}", session.id()?),
        Err(err) => {
            eprintln!("Authentication failed: {err}");
            if let Some(cause) = err.cause() {
                eprintln!("  caused by: {cause}");
            }
        }
    }

    Ok(())
}
