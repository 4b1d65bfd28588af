use std::{fmt, str::FromStr};

use alloy::primitives::Address;

use crate::error::EntityIdError;

/// Hedera network the dApp talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Network {
    #[default]
    Testnet,
    Mainnet,
    Previewnet,
}

impl Network {
    /// EVM chain id reported by the JSON-RPC relay.
    pub fn chain_id(&self) -> u64 {
        match self {
            Self::Mainnet => 295,
            Self::Testnet => 296,
            Self::Previewnet => 297,
        }
    }

    pub fn mirror_url(&self) -> &'static str {
        match self {
            Self::Mainnet => "https://mainnet-public.mirrornode.hedera.com/api/v1",
            Self::Testnet => "https://testnet.mirrornode.hedera.com/api/v1",
            Self::Previewnet => "https://previewnet.mirrornode.hedera.com/api/v1",
        }
    }

    pub fn json_rpc_url(&self) -> &'static str {
        match self {
            Self::Mainnet => "https://mainnet.hashio.io/api",
            Self::Testnet => "https://testnet.hashio.io/api",
            Self::Previewnet => "https://previewnet.hashio.io/api",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mainnet => f.write_str("mainnet"),
            Self::Testnet => f.write_str("testnet"),
            Self::Previewnet => f.write_str("previewnet"),
        }
    }
}

impl FromStr for Network {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" | "production" => Ok(Self::Mainnet),
            "testnet" | "test" => Ok(Self::Testnet),
            "previewnet" => Ok(Self::Previewnet),
            other => Err(anyhow::anyhow!("unknown network: {other}")),
        }
    }
}

/// `shard.realm.num` identifier of a Hedera account or contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId {
    pub shard: u32,
    pub realm: u64,
    pub num: u64,
}

impl EntityId {
    pub const fn new(shard: u32, realm: u64, num: u64) -> Self {
        Self { shard, realm, num }
    }

    /// Long-zero EVM address: 4 bytes shard, 8 bytes realm, 8 bytes num, big endian.
    pub fn to_evm_address(&self) -> Address {
        let mut bytes = [0u8; 20];
        bytes[..4].copy_from_slice(&self.shard.to_be_bytes());
        bytes[4..12].copy_from_slice(&self.realm.to_be_bytes());
        bytes[12..].copy_from_slice(&self.num.to_be_bytes());
        Address::from(bytes)
    }

    pub fn from_evm_address(address: &Address) -> Self {
        let bytes = address.as_slice();
        let mut shard = [0u8; 4];
        let mut realm = [0u8; 8];
        let mut num = [0u8; 8];
        shard.copy_from_slice(&bytes[..4]);
        realm.copy_from_slice(&bytes[4..12]);
        num.copy_from_slice(&bytes[12..]);
        Self {
            shard: u32::from_be_bytes(shard),
            realm: u64::from_be_bytes(realm),
            num: u64::from_be_bytes(num),
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.shard, self.realm, self.num)
    }
}

impl FromStr for EntityId {
    type Err = EntityIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('.').collect();
        let [shard, realm, num] = parts.as_slice() else {
            return Err(EntityIdError::Format(s.to_string()));
        };

        let component = |value: &str| {
            value
                .parse::<u64>()
                .map_err(|_| EntityIdError::Component(value.to_string()))
        };
        let shard = u32::try_from(component(*shard)?)
            .map_err(|_| EntityIdError::Component(shard.to_string()))?;

        Ok(Self {
            shard,
            realm: component(*realm)?,
            num: component(*num)?,
        })
    }
}
