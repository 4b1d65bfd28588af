use std::time::Duration;

use alloy::{primitives::Address, signers::local::PrivateKeySigner};
use url::Url;

use crate::{
    error::ConfigError,
    hedera::{EntityId, Network},
    validators::{
        validate_entity_id, validate_millis, validate_network, validate_positive_u64,
        validate_u32, validate_url, validate_wallet_private_key,
    },
};

pub const DEFAULT_CONTRACT_ID: &str = "0.0.5723470";
pub const DEFAULT_GAS_LIMIT: u64 = 120_000;
pub const DEFAULT_RECEIPT_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(2);
pub const DEFAULT_MAX_TRANSPORT_RETRIES: u32 = 3;

#[derive(Debug, Clone)]
pub struct Config {
    pub network: Network,
    pub contract_id: EntityId,
    pub gas_limit: u64,
    pub mirror_url: Url,
    pub json_rpc_url: Url,
    pub operator_key: Option<PrivateKeySigner>,
    pub receipt_timeout: Duration,
    pub receipt_poll_interval: Duration,
    pub max_transport_retries: u32,
    pub mirror_page_limit: Option<u32>,
}

impl Config {
    /// Long-zero EVM address of the configured contract.
    pub fn contract_address(&self) -> Address {
        self.contract_id.to_evm_address()
    }
}

pub struct ConfigBuilder {
    network: Option<String>,
    contract_id: Option<String>,
    gas_limit: Option<String>,
    mirror_url: Option<String>,
    json_rpc_url: Option<String>,
    operator_key: Option<String>,
    receipt_timeout_ms: Option<String>,
    receipt_poll_interval_ms: Option<String>,
    max_transport_retries: Option<String>,
    mirror_page_limit: Option<String>,
}

impl ConfigBuilder {
    fn empty() -> Self {
        Self {
            network: None,
            contract_id: None,
            gas_limit: None,
            mirror_url: None,
            json_rpc_url: None,
            operator_key: None,
            receipt_timeout_ms: None,
            receipt_poll_interval_ms: None,
            max_transport_retries: None,
            mirror_page_limit: None,
        }
    }

    /// `testnet`, `mainnet` or `previewnet`.
    pub fn network(mut self, network: String) -> Self {
        self.network = Some(network);
        self
    }

    /// Contract id in `shard.realm.num` form.
    pub fn contract_id(mut self, contract_id: String) -> Self {
        self.contract_id = Some(contract_id);
        self
    }

    pub fn gas_limit(mut self, gas_limit: String) -> Self {
        self.gas_limit = Some(gas_limit);
        self
    }

    /// If not provided, the mirror node of the selected network is used.
    pub fn mirror_url(mut self, mirror_url: String) -> Self {
        self.mirror_url = Some(mirror_url);
        self
    }

    /// If not provided, the public JSON-RPC relay of the selected network is used.
    pub fn json_rpc_url(mut self, json_rpc_url: String) -> Self {
        self.json_rpc_url = Some(json_rpc_url);
        self
    }

    /// ECDSA key used by the relay connector. Without one, only reads are possible.
    pub fn operator_key(mut self, operator_key: String) -> Self {
        self.operator_key = Some(operator_key);
        self
    }

    pub fn receipt_timeout_ms(mut self, receipt_timeout_ms: String) -> Self {
        self.receipt_timeout_ms = Some(receipt_timeout_ms);
        self
    }

    pub fn receipt_poll_interval_ms(mut self, receipt_poll_interval_ms: String) -> Self {
        self.receipt_poll_interval_ms = Some(receipt_poll_interval_ms);
        self
    }

    pub fn max_transport_retries(mut self, max_transport_retries: String) -> Self {
        self.max_transport_retries = Some(max_transport_retries);
        self
    }

    pub fn mirror_page_limit(mut self, mirror_page_limit: String) -> Self {
        self.mirror_page_limit = Some(mirror_page_limit);
        self
    }

    pub fn from_env(mut self) -> Self {
        if let Ok(v) = std::env::var("WHITELIST_NETWORK") {
            self = self.network(v);
        }
        if let Ok(v) = std::env::var("WHITELIST_CONTRACT_ID") {
            self = self.contract_id(v);
        }
        if let Ok(v) = std::env::var("WHITELIST_GAS_LIMIT") {
            self = self.gas_limit(v);
        }
        if let Ok(v) = std::env::var("WHITELIST_MIRROR_URL") {
            self = self.mirror_url(v);
        }
        if let Ok(v) = std::env::var("WHITELIST_JSON_RPC_URL") {
            self = self.json_rpc_url(v);
        }
        if let Ok(v) = std::env::var("WHITELIST_OPERATOR_KEY") {
            self = self.operator_key(v);
        }
        if let Ok(v) = std::env::var("WHITELIST_RECEIPT_TIMEOUT_MS") {
            self = self.receipt_timeout_ms(v);
        }
        if let Ok(v) = std::env::var("WHITELIST_RECEIPT_POLL_INTERVAL_MS") {
            self = self.receipt_poll_interval_ms(v);
        }
        if let Ok(v) = std::env::var("WHITELIST_MAX_TRANSPORT_RETRIES") {
            self = self.max_transport_retries(v);
        }
        if let Ok(v) = std::env::var("WHITELIST_MIRROR_PAGE_LIMIT") {
            self = self.mirror_page_limit(v);
        }
        self
    }

    pub fn build(self) -> Result<Config, ConfigError> {
        let network = Self::required(self.network, "network")?;
        let contract_id = Self::required(self.contract_id, "contract_id")?;

        let network =
            validate_network(&network).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;
        let contract_id = validate_entity_id(&contract_id)
            .map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

        let gas_limit = Self::optional(self.gas_limit, validate_positive_u64, "gas_limit")?
            .unwrap_or(DEFAULT_GAS_LIMIT);
        let mirror_url = match Self::optional(self.mirror_url, validate_url, "mirror_url")? {
            Some(url) => url,
            None => validate_url(network.mirror_url())
                .map_err(|e| ConfigError::InvalidValue(e.to_string()))?,
        };
        let json_rpc_url = match Self::optional(self.json_rpc_url, validate_url, "json_rpc_url")? {
            Some(url) => url,
            None => validate_url(network.json_rpc_url())
                .map_err(|e| ConfigError::InvalidValue(e.to_string()))?,
        };
        let operator_key = Self::optional(
            self.operator_key.filter(|key| !key.trim().is_empty()),
            validate_wallet_private_key,
            "operator_key",
        )?;
        let receipt_timeout =
            Self::optional(self.receipt_timeout_ms, validate_millis, "receipt_timeout_ms")?
                .unwrap_or(DEFAULT_RECEIPT_TIMEOUT);
        let receipt_poll_interval = Self::optional(
            self.receipt_poll_interval_ms,
            validate_millis,
            "receipt_poll_interval_ms",
        )?
        .unwrap_or(DEFAULT_RECEIPT_POLL_INTERVAL);
        let max_transport_retries = Self::optional(
            self.max_transport_retries,
            validate_u32,
            "max_transport_retries",
        )?
        .unwrap_or(DEFAULT_MAX_TRANSPORT_RETRIES);
        let mirror_page_limit =
            Self::optional(self.mirror_page_limit, validate_u32, "mirror_page_limit")?;

        Ok(Config {
            network,
            contract_id,
            gas_limit,
            mirror_url,
            json_rpc_url,
            operator_key,
            receipt_timeout,
            receipt_poll_interval,
            max_transport_retries,
            mirror_page_limit,
        })
    }

    fn required(value: Option<String>, field: &str) -> Result<String, ConfigError> {
        value.ok_or_else(|| ConfigError::Missing(field.to_string()))
    }

    fn optional<T>(
        value: Option<String>,
        parser: impl FnOnce(&str) -> anyhow::Result<T>,
        field: &str,
    ) -> Result<Option<T>, ConfigError> {
        match value {
            Some(raw) => parser(&raw)
                .map(Some)
                .map_err(|e| ConfigError::InvalidValue(format!("{field}: {e}"))),
            None => Ok(None),
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::empty()
            .network(Network::Testnet.to_string())
            .contract_id(DEFAULT_CONTRACT_ID.to_string())
    }
}
