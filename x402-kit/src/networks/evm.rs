//! EVM networks and assets the service can charge on.

use std::{
    fmt::{Debug, Display},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

pub use alloy_primitives::AddressError;

/// An EVM chain, identified by its x402 v1 network name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EvmNetwork {
    pub name: &'static str,
    pub chain_id: u64,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct EvmAddress(pub alloy_primitives::Address);

impl EvmAddress {
    pub const ZERO: EvmAddress = EvmAddress(alloy_primitives::Address::ZERO);
}

impl From<alloy_primitives::Address> for EvmAddress {
    fn from(addr: alloy_primitives::Address) -> Self {
        EvmAddress(addr)
    }
}

impl FromStr for EvmAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let addr = alloy_primitives::Address::from_str(s.trim())?;
        Ok(EvmAddress(addr))
    }
}

/// Formats with the EIP-55 checksum.
impl Display for EvmAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Debug for EvmAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EvmAddress({})", self.0)
    }
}

impl Serialize for EvmAddress {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EvmAddress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        EvmAddress::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// EIP-712 domain of a token, needed by clients to sign transfer authorizations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Eip712Domain {
    pub name: &'static str,
    pub version: &'static str,
}

/// A token deployed on an EVM network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvmAsset {
    pub address: EvmAddress,
    pub decimals: u8,
    pub name: &'static str,
    pub symbol: &'static str,
    pub eip712_domain: Option<Eip712Domain>,
}

pub mod networks {
    use super::EvmNetwork;

    pub const BASE: EvmNetwork = EvmNetwork {
        name: "base",
        chain_id: 8453,
    };

    pub const BASE_SEPOLIA: EvmNetwork = EvmNetwork {
        name: "base-sepolia",
        chain_id: 84532,
    };
}

pub mod assets {
    use alloy_primitives::address;

    use super::{Eip712Domain, EvmAddress, EvmAsset};

    macro_rules! define_usdc {
        ($const_name:ident, $addr:expr, $domain_name:expr) => {
            pub const $const_name: EvmAsset = EvmAsset {
                address: EvmAddress(address!($addr)),
                decimals: 6,
                name: "USD Coin",
                symbol: "USDC",
                eip712_domain: Some(Eip712Domain {
                    name: $domain_name,
                    version: "2",
                }),
            };
        };
    }

    define_usdc!(
        USDC_BASE,
        "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913",
        "USD Coin"
    );

    define_usdc!(
        USDC_BASE_SEPOLIA,
        "0x036CbD53842c5426634e7929541eC2318f3dCF7e",
        "USDC"
    );
}

/// The networks a seller of this service may be configured for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KnownNetwork {
    Base,
    #[default]
    BaseSepolia,
}

impl KnownNetwork {
    pub const ALL: [KnownNetwork; 2] = [KnownNetwork::Base, KnownNetwork::BaseSepolia];

    pub fn network(&self) -> EvmNetwork {
        match self {
            KnownNetwork::Base => networks::BASE,
            KnownNetwork::BaseSepolia => networks::BASE_SEPOLIA,
        }
    }

    /// The USDC deployment prices are quoted in.
    pub fn usdc(&self) -> EvmAsset {
        match self {
            KnownNetwork::Base => assets::USDC_BASE,
            KnownNetwork::BaseSepolia => assets::USDC_BASE_SEPOLIA,
        }
    }

    pub fn name(&self) -> &'static str {
        self.network().name
    }

    pub fn is_testnet(&self) -> bool {
        matches!(self, KnownNetwork::BaseSepolia)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown network '{0}'; expected one of: base, base-sepolia")]
pub struct UnknownNetwork(pub String);

impl FromStr for KnownNetwork {
    type Err = UnknownNetwork;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KnownNetwork::ALL
            .into_iter()
            .find(|n| n.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownNetwork(s.to_string()))
    }
}

impl Display for KnownNetwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
