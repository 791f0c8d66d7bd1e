/*
[INPUT]:  YAML configuration file
[OUTPUT]: Parsed service and wallet configuration
[POS]:    Configuration layer - CLI setup
[UPDATE]: When adding new configuration options
*/

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use ceramic_session_adapter::{Chain, CredentialSource, EnvKeyCredentialSource, ServiceConfig};
use serde::{Deserialize, Serialize};

/// Top-level configuration for the CLI
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CliConfig {
    /// Network, endpoint overrides, key directory and HTTP timeouts
    #[serde(flatten)]
    pub service: ServiceConfig,
    /// Where the wallet credential comes from
    #[serde(default)]
    pub wallet: WalletConfig,
}

/// Wallet credential configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct WalletConfig {
    /// Chain used for the account id
    #[serde(default)]
    pub chain: Chain,
    /// Environment variable holding the hex private key
    #[serde(default = "default_private_key_env")]
    pub private_key_env: String,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            chain: Chain::default(),
            private_key_env: default_private_key_env(),
        }
    }
}

fn default_private_key_env() -> String {
    "CERAMIC_WALLET_KEY".to_string()
}

impl WalletConfig {
    /// Credential source reading the key at acquisition time
    pub fn credential_source(&self) -> Arc<dyn CredentialSource> {
        Arc::new(EnvKeyCredentialSource::new(
            self.private_key_env.clone(),
            self.chain,
        ))
    }
}

impl CliConfig {
    /// Load configuration from YAML file
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(content).context("parse config")
    }
}
