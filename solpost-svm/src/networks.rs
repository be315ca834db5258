//! Named Solana clusters and their default public RPC endpoints.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Solana clusters the service can pay on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Network {
    /// Mainnet beta.
    #[serde(rename = "mainnet-beta")]
    Mainnet,
    /// Devnet (default).
    #[default]
    #[serde(rename = "devnet")]
    Devnet,
}

impl Network {
    /// Canonical cluster name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet-beta",
            Self::Devnet => "devnet",
        }
    }

    /// Default public RPC endpoint for the cluster.
    #[must_use]
    pub const fn default_rpc_url(self) -> &'static str {
        match self {
            Self::Mainnet => "https://api.mainnet-beta.solana.com",
            Self::Devnet => "https://api.devnet.solana.com",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unknown cluster name.
#[derive(Debug, thiserror::Error)]
#[error("unknown network: {0}")]
pub struct UnknownNetwork(pub String);

impl FromStr for Network {
    type Err = UnknownNetwork;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mainnet-beta" | "mainnet" => Ok(Self::Mainnet),
            "devnet" => Ok(Self::Devnet),
            other => Err(UnknownNetwork(other.to_owned())),
        }
    }
}
