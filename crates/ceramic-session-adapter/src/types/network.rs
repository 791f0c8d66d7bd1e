/*
[INPUT]:  Network identifier (typed or textual)
[OUTPUT]: Gateway endpoint and link service URLs for the network
[POS]:    Data layer - network endpoint resolution
[UPDATE]: When networks are added or gateway hosts move
*/

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::http::{Result, SessionError};

const MAINNET_ENDPOINT: &str = "https://gateway.ceramic.network";
const TESTNET_CLAY_ENDPOINT: &str = "https://gateway-clay.ceramic.network";
const DEV_UNSTABLE_ENDPOINT: &str = "https://gateway-dev.ceramic.network";

const MAINNET_LINK_SERVICE: &str = "https://app.3idconnect.org";
const TESTNET_CLAY_LINK_SERVICE: &str = "https://app-clay.3idconnect.org";
const DEV_UNSTABLE_LINK_SERVICE: &str = "https://app-dev.3idconnect.org";

/// Network a session service is bound to
///
/// Chosen at construction and fixed for the lifetime of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Network {
    Mainnet,
    TestnetClay,
    DevUnstable,
}

impl Network {
    pub const ALL: [Network; 3] = [Network::Mainnet, Network::TestnetClay, Network::DevUnstable];

    /// Canonical network name
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::TestnetClay => "testnet-clay",
            Network::DevUnstable => "dev-unstable",
        }
    }

    /// Default gateway endpoint for this network
    pub fn endpoint(&self) -> &'static str {
        match self {
            Network::Mainnet => MAINNET_ENDPOINT,
            Network::TestnetClay => TESTNET_CLAY_ENDPOINT,
            Network::DevUnstable => DEV_UNSTABLE_ENDPOINT,
        }
    }

    /// Default identity-link service for this network
    pub fn link_service(&self) -> &'static str {
        match self {
            Network::Mainnet => MAINNET_LINK_SERVICE,
            Network::TestnetClay => TESTNET_CLAY_LINK_SERVICE,
            Network::DevUnstable => DEV_UNSTABLE_LINK_SERVICE,
        }
    }

    /// Effective endpoint: the override when given, the network default otherwise
    pub fn effective_endpoint(&self, endpoint: Option<&str>) -> Result<Url> {
        let raw = endpoint
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(self.endpoint());
        Ok(Url::parse(raw)?)
    }
}

/// Resolve a textual network identifier to its gateway endpoint.
///
/// Fails closed with `UnsupportedNetwork` carrying the offending value.
pub fn resolve_endpoint(network: &str) -> Result<Url> {
    let network: Network = network.parse()?;
    Ok(Url::parse(network.endpoint())?)
}

impl FromStr for Network {
    type Err = SessionError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim() {
            "mainnet" => Ok(Network::Mainnet),
            "testnet-clay" => Ok(Network::TestnetClay),
            "dev-unstable" => Ok(Network::DevUnstable),
            other => Err(SessionError::UnsupportedNetwork(other.to_string())),
        }
    }
}

impl TryFrom<String> for Network {
    type Error = SessionError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Network> for String {
    fn from(network: Network) -> Self {
        network.as_str().to_string()
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
