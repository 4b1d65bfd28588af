use std::{collections::HashSet, sync::Arc, time::Duration};

use alloy::primitives::Address;
use async_trait::async_trait;
use log::{debug, info, warn};
use mirror::{LogOrder, LogPage, MirrorClient, MirrorError};

use crate::{error::VerifyError, event};

/// Read access to a contract's event history.
#[async_trait]
pub trait LogSource: Send + Sync {
    async fn fetch_logs(&self, contract: &str, order: LogOrder) -> Result<LogPage, MirrorError>;

    /// Highest block the source has indexed, `None` if it has none yet.
    async fn latest_indexed_block(&self) -> Result<Option<u64>, MirrorError>;
}

#[async_trait]
impl LogSource for MirrorClient {
    async fn fetch_logs(&self, contract: &str, order: LogOrder) -> Result<LogPage, MirrorError> {
        MirrorClient::fetch_logs(self, contract, order).await
    }

    async fn latest_indexed_block(&self) -> Result<Option<u64>, MirrorError> {
        MirrorClient::latest_indexed_block(self).await
    }
}

/// Set of accounts that appear in at least one decodable whitelist event.
#[derive(Debug, Clone, Default)]
pub struct MembershipIndex {
    accounts: HashSet<Address>,
    skipped: usize,
}

impl MembershipIndex {
    /// Folds every record of `page`; records that fail to decode are logged and skipped.
    pub fn from_page(page: &LogPage) -> Self {
        let mut index = Self::default();
        for (position, record) in page.records().enumerate() {
            match record.map_err(Into::into).and_then(|r| event::decode_record(&r)) {
                Ok(event) => {
                    index.accounts.insert(event.account_id);
                }
                Err(e) => {
                    warn!("Skipping whitelist log #{position}: {e}");
                    index.skipped += 1;
                }
            }
        }
        index
    }

    pub fn contains(&self, account: &Address) -> bool {
        self.accounts.contains(account)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Number of records that could not be decoded.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn iter(&self) -> impl Iterator<Item = &Address> {
        self.accounts.iter()
    }
}

impl FromIterator<Address> for MembershipIndex {
    fn from_iter<I: IntoIterator<Item = Address>>(iter: I) -> Self {
        Self {
            accounts: iter.into_iter().collect(),
            skipped: 0,
        }
    }
}

impl PartialEq for MembershipIndex {
    fn eq(&self, other: &Self) -> bool {
        self.accounts == other.accounts
    }
}

impl Eq for MembershipIndex {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    pub initial: Duration,
    pub max: Duration,
    pub max_attempts: u32,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            initial: Duration::from_millis(500),
            max: Duration::from_secs(8),
            max_attempts: 8,
        }
    }
}

/// What to wait for before reading the mirror node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsistencyPolicy {
    #[default]
    Immediate,
    FixedDelay(Duration),
    /// Poll until the mirror has indexed `block`.
    UntilBlockIndexed { block: u64, backoff: Backoff },
}

#[derive(Clone)]
pub struct WhitelistVerifier {
    source: Arc<dyn LogSource>,
    contract: String,
}

impl WhitelistVerifier {
    /// `contract` is the id the mirror node knows the contract by (`0.0.N` or EVM address).
    pub fn new(source: Arc<dyn LogSource>, contract: impl Into<String>) -> Self {
        Self {
            source,
            contract: contract.into(),
        }
    }

    pub fn contract(&self) -> &str {
        &self.contract
    }

    pub async fn membership_index(&self) -> Result<MembershipIndex, VerifyError> {
        let page = self
            .source
            .fetch_logs(&self.contract, LogOrder::Asc)
            .await?;
        let index = MembershipIndex::from_page(&page);
        debug!(
            "Indexed {} whitelisted account(s) from {} log(s), {} skipped",
            index.len(),
            page.len(),
            index.skipped()
        );
        Ok(index)
    }

    pub async fn is_whitelisted(&self, account: Address) -> Result<bool, VerifyError> {
        Ok(self.membership_index().await?.contains(&account))
    }

    pub async fn is_whitelisted_consistent(
        &self,
        account: Address,
        policy: ConsistencyPolicy,
    ) -> Result<bool, VerifyError> {
        self.await_consistency(policy).await?;
        self.is_whitelisted(account).await
    }

    pub async fn await_consistency(&self, policy: ConsistencyPolicy) -> Result<(), VerifyError> {
        match policy {
            ConsistencyPolicy::Immediate => Ok(()),
            ConsistencyPolicy::FixedDelay(delay) => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
            ConsistencyPolicy::UntilBlockIndexed { block, backoff } => {
                self.wait_for_block(block, backoff).await
            }
        }
    }

    async fn wait_for_block(&self, block: u64, backoff: Backoff) -> Result<(), VerifyError> {
        let attempts = backoff.max_attempts.max(1);
        let mut delay = backoff.initial;

        for attempt in 1..=attempts {
            match self.source.latest_indexed_block().await {
                Ok(Some(latest)) if latest >= block => {
                    info!("Mirror node reached block {latest} (wanted {block})");
                    return Ok(());
                }
                Ok(latest) => debug!("Mirror node at {latest:?}, waiting for block {block}"),
                Err(e) if e.is_network() => warn!("Mirror block query failed: {e}"),
                Err(e) => return Err(e.into()),
            }

            if attempt < attempts {
                tokio::time::sleep(delay).await;
                delay = (delay * 2).min(backoff.max);
            }
        }

        Err(VerifyError::NotIndexed { block, attempts })
    }
}
