use kaspa_addresses::Prefix;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::AppError;

/// Kaspa network a run targets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Network {
    #[serde(rename = "mainnet")]
    Mainnet,
    #[default]
    #[serde(rename = "testnet-10")]
    Testnet10,
    #[serde(rename = "testnet-11")]
    Testnet11,
    #[serde(rename = "simnet")]
    Simnet,
    #[serde(rename = "devnet")]
    Devnet,
}

impl Network {
    /// Network identifier as used by RPC nodes ("testnet-10", ...)
    pub fn id(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet10 => "testnet-10",
            Network::Testnet11 => "testnet-11",
            Network::Simnet => "simnet",
            Network::Devnet => "devnet",
        }
    }

    /// Address prefix; both testnets share `kaspatest`
    pub fn prefix(&self) -> Prefix {
        match self {
            Network::Mainnet => Prefix::Mainnet,
            Network::Testnet10 | Network::Testnet11 => Prefix::Testnet,
            Network::Simnet => Prefix::Simnet,
            Network::Devnet => Prefix::Devnet,
        }
    }

    /// Human-readable address prefix
    pub fn address_prefix(&self) -> String {
        self.prefix().to_string()
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Network {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "testnet-10" | "testnet10" => Ok(Network::Testnet10),
            "testnet-11" | "testnet11" => Ok(Network::Testnet11),
            "simnet" => Ok(Network::Simnet),
            "devnet" => Ok(Network::Devnet),
            other => Err(AppError::Config(format!("unknown network: {}", other))),
        }
    }
}
