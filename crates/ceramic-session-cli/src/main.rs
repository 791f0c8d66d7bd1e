/*
[INPUT]:  CLI arguments, YAML configuration file, OS interrupt signal
[OUTPUT]: Resolved endpoints, linked DIDs and DID documents on stdout
[POS]:    Binary entry point
[UPDATE]: When changing CLI subcommands, startup flow, or interrupt handling
*/

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ceramic_session_cli::{AuthOutcome, CliConfig, commands};

#[derive(Parser, Debug)]
#[command(name = "ceramic-session", version, about = "DID session authentication for Ceramic networks")]
struct Cli {
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info", global = true)]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the node endpoint for a network
    Endpoint {
        #[arg(long, value_name = "NETWORK")]
        network: String,
    },
    /// Link the configured wallet and bind a DID session
    Authenticate {
        #[arg(long = "config", value_name = "PATH")]
        config_path: PathBuf,
        #[arg(long = "dry-run")]
        dry_run: bool,
    },
    /// Resolve a DID document
    Resolve {
        #[arg(long = "config", value_name = "PATH")]
        config_path: PathBuf,
        did: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(&args.log_level)?;

    match args.command {
        Command::Endpoint { network } => {
            let endpoint = commands::endpoint(&network)?;
            println!("{endpoint}");
        }
        Command::Authenticate {
            config_path,
            dry_run,
        } => {
            let config = CliConfig::from_file(&config_path).context("load config")?;
            info!(
                config_path = %config_path.display(),
                network = %config.service.network,
                dry_run,
                "starting authentication"
            );
            let source = config.wallet.credential_source();

            let outcome = tokio::select! {
                outcome = commands::authenticate(config, source, dry_run) => outcome?,
                _ = interrupted() => bail!("authentication interrupted"),
            };
            match outcome {
                AuthOutcome::DryRun { endpoint } => println!("{endpoint}"),
                AuthOutcome::Authenticated { did } => println!("{did}"),
            }
        }
        Command::Resolve { config_path, did } => {
            let config = CliConfig::from_file(&config_path).context("load config")?;
            let document = tokio::select! {
                document = commands::resolve(config, &did) => document?,
                _ = interrupted() => bail!("resolution interrupted"),
            };
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
    }

    Ok(())
}

fn init_tracing(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(())
}

/// Resolves on SIGINT; never resolves when the handler cannot be installed
async fn interrupted() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("received SIGINT"),
        Err(err) => {
            warn!(error = %err, "failed to install SIGINT handler");
            std::future::pending::<()>().await;
        }
    }
}
