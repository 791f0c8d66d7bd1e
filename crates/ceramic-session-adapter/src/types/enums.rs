/*
[INPUT]:  Wallet chain identifiers and serde requirements
[OUTPUT]: Typed chain enum with CAIP-2 identifiers
[POS]:    Data layer - chain definitions for wallet credentials
[UPDATE]: When supporting new wallet chains
*/

use serde::{Deserialize, Serialize};

/// Chain a wallet credential signs for (all EIP-155 chains)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    #[default]
    Ethereum,
    Polygon,
    Bsc,
}

impl Chain {
    /// CAIP-2 namespace
    pub fn namespace(&self) -> &'static str {
        "eip155"
    }

    /// EIP-155 chain id
    pub fn chain_id(&self) -> u64 {
        match self {
            Chain::Ethereum => 1,
            Chain::Polygon => 137,
            Chain::Bsc => 56,
        }
    }

    /// CAIP-2 chain identifier, e.g. `eip155:1`
    pub fn caip2(&self) -> String {
        format!("{}:{}", self.namespace(), self.chain_id())
    }
}
