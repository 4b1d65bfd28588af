use std::sync::Arc;

use mirror::MirrorClient;

use crate::{
    config::Config,
    connector::{RelayConnector, WalletConnector},
    error::ClientError,
    session::WalletSession,
    verifier::{ConsistencyPolicy, LogSource, WhitelistVerifier},
    watcher::{TransactionWatcher, WatcherConfig},
};

use self::{reader::ContractReader, writer::ContractWriter};

pub mod reader;
pub mod writer;

/// Every component of the whitelist dApp, wired from one [`Config`].
#[derive(Clone)]
pub struct WhitelistDapp {
    pub session: Arc<WalletSession>,
    pub writer: ContractWriter,
    pub reader: ContractReader,
    pub watcher: TransactionWatcher,
    pub verifier: WhitelistVerifier,
    consistency: ConsistencyPolicy,
}

impl WhitelistDapp {
    /// Connects to the JSON-RPC relay and the mirror node named by `cfg`.
    pub async fn new(cfg: Config) -> Result<Self, ClientError> {
        let connector = RelayConnector::new(&cfg).await?;
        let mirror = MirrorClient::new(cfg.mirror_url.as_str(), cfg.mirror_page_limit)?;

        Ok(Self::with_parts(&cfg, Arc::new(connector), Arc::new(mirror)))
    }

    pub fn with_parts(
        cfg: &Config,
        connector: Arc<dyn WalletConnector>,
        logs: Arc<dyn LogSource>,
    ) -> Self {
        let session = Arc::new(WalletSession::new(connector.clone()));
        let contract = cfg.contract_address();

        Self {
            writer: ContractWriter::new(session.clone(), contract, cfg.gas_limit),
            reader: ContractReader::new(connector.clone(), contract, cfg.gas_limit),
            watcher: TransactionWatcher::new(connector, WatcherConfig::from(cfg)),
            verifier: WhitelistVerifier::new(logs, cfg.contract_id.to_string()),
            session,
            consistency: ConsistencyPolicy::Immediate,
        }
    }

    /// Policy applied before reading the mirror node after a successful write.
    pub fn with_consistency(mut self, policy: ConsistencyPolicy) -> Self {
        self.consistency = policy;
        self
    }

    pub fn consistency(&self) -> ConsistencyPolicy {
        self.consistency
    }
}
