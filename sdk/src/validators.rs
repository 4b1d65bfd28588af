use std::{str::FromStr, time::Duration};

use alloy::signers::local::PrivateKeySigner;
use url::Url;

use crate::hedera::{EntityId, Network};

pub fn validate_url(url: &str) -> anyhow::Result<Url> {
    Url::parse(url).map_err(|e| anyhow::anyhow!("invalid URL: {}", e))
}

pub fn validate_wallet_private_key(key: &str) -> anyhow::Result<PrivateKeySigner> {
    PrivateKeySigner::from_str(key).map_err(|e| anyhow::anyhow!("invalid private key: {}", e))
}

pub fn validate_network(network: &str) -> anyhow::Result<Network> {
    Network::from_str(network)
}

pub fn validate_entity_id(id: &str) -> anyhow::Result<EntityId> {
    EntityId::from_str(id).map_err(|e| anyhow::anyhow!("invalid entity id: {}", e))
}

pub fn validate_positive_u64(value: &str) -> anyhow::Result<u64> {
    match value.trim().parse::<u64>() {
        Ok(0) => Err(anyhow::anyhow!("invalid number: must be greater than zero")),
        Ok(parsed) => Ok(parsed),
        Err(e) => Err(anyhow::anyhow!("invalid number `{}`: {}", value, e)),
    }
}

pub fn validate_u32(value: &str) -> anyhow::Result<u32> {
    value
        .trim()
        .parse::<u32>()
        .map_err(|e| anyhow::anyhow!("invalid number `{}`: {}", value, e))
}

pub fn validate_millis(value: &str) -> anyhow::Result<Duration> {
    validate_positive_u64(value).map(Duration::from_millis)
}
