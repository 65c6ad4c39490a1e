use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub mod amount;

pub const PROTOCOL_XTZ: &str = "xtz";
pub const PROTOCOL_ETH: &str = "eth";
pub const PROTOCOL_BTC: &str = "btc";

pub const DEFAULT_TEZOS_RPC_URL: &str = "https://tezos-node.prod.gke.papers.tech";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ProtocolConfig {
    pub symbol: &'static str,
    pub name: &'static str,
    pub decimals: u8,
}

pub const TEZOS_CONFIG: ProtocolConfig = ProtocolConfig {
    symbol: PROTOCOL_XTZ,
    name: "Tezos",
    decimals: 6,
};

pub const ETHEREUM_CONFIG: ProtocolConfig = ProtocolConfig {
    symbol: PROTOCOL_ETH,
    name: "Ethereum",
    decimals: 18,
};

pub const BITCOIN_CONFIG: ProtocolConfig = ProtocolConfig {
    symbol: PROTOCOL_BTC,
    name: "Bitcoin",
    decimals: 8,
};

/// Protocol identity of a wallet or transaction.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolSymbol {
    Xtz,
    Eth,
    Btc,
}

impl ProtocolSymbol {
    pub const ALL: [Self; 3] = [Self::Xtz, Self::Eth, Self::Btc];

    pub const fn config(self) -> ProtocolConfig {
        match self {
            Self::Xtz => TEZOS_CONFIG,
            Self::Eth => ETHEREUM_CONFIG,
            Self::Btc => BITCOIN_CONFIG,
        }
    }

    pub fn as_str(self) -> &'static str {
        self.config().symbol
    }

    pub fn name(self) -> &'static str {
        self.config().name
    }
}

impl fmt::Display for ProtocolSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProtocolSymbol {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "xtz" | "tezos" => Ok(Self::Xtz),
            "eth" | "ethereum" => Ok(Self::Eth),
            "btc" | "bitcoin" => Ok(Self::Btc),
            _ => Err(format!(
                "unsupported protocol '{value}'; expected xtz, eth, or btc"
            )),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkType {
    #[default]
    Mainnet,
    Ghostnet,
    Custom,
}

impl NetworkType {
    pub fn is_mainnet(self) -> bool {
        self == Self::Mainnet
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Ghostnet => "ghostnet",
            Self::Custom => "custom",
        }
    }
}

impl FromStr for NetworkType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "mainnet" => Ok(Self::Mainnet),
            "ghostnet" => Ok(Self::Ghostnet),
            "custom" => Ok(Self::Custom),
            _ => Err(format!(
                "unsupported network type '{value}'; expected mainnet, ghostnet, or custom"
            )),
        }
    }
}

/// Target network of a request: network type plus an optional name and node.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Network {
    #[serde(rename = "type")]
    pub network_type: NetworkType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpc_url: Option<String>,
}

impl Network {
    pub fn mainnet() -> Self {
        Self {
            network_type: NetworkType::Mainnet,
            name: None,
            rpc_url: Some(DEFAULT_TEZOS_RPC_URL.to_owned()),
        }
    }

    pub fn of_type(network_type: NetworkType) -> Self {
        Self {
            network_type,
            name: None,
            rpc_url: None,
        }
    }

    pub fn is_mainnet(&self) -> bool {
        self.network_type.is_mainnet()
    }
}
