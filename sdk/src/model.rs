use std::{fmt, str::FromStr, time::SystemTime};

use alloy::primitives::{Address, B256, U256};

use crate::error::TransactionFailure;

const WEIBARS_PER_TINYBAR: u64 = 10_000_000_000;
const TINYBARS_PER_HBAR: u64 = 100_000_000;

/// Native balance in weibars, the 18-decimal unit the JSON-RPC relay reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Amount(U256);

impl Amount {
    pub const ZERO: Self = Self(U256::ZERO);

    pub const fn from_weibars(weibars: U256) -> Self {
        Self(weibars)
    }

    pub fn from_tinybars(tinybars: u64) -> Self {
        Self(U256::from(tinybars) * U256::from(WEIBARS_PER_TINYBAR))
    }

    pub const fn weibars(&self) -> U256 {
        self.0
    }

    pub fn tinybars(&self) -> U256 {
        self.0 / U256::from(WEIBARS_PER_TINYBAR)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tinybars = self.tinybars();
        let per_hbar = U256::from(TINYBARS_PER_HBAR);
        let whole = tinybars / per_hbar;
        let fraction: u64 = (tinybars % per_hbar).to();

        if fraction == 0 {
            return write!(f, "{whole} ℏ");
        }
        let fraction = format!("{fraction:08}");
        write!(f, "{whole}.{} ℏ", fraction.trim_end_matches('0'))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectorKind {
    /// Browser extension wallet such as HashPack.
    Extension,
    WalletConnect,
    /// Operator key held locally and signing through the JSON-RPC relay.
    LocalKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Unknown,
    ExtensionMissing,
    Disconnected,
    Connected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub connector_kind: ConnectorKind,
    pub state: SessionState,
    pub is_extension_present: bool,
    pub is_ready: bool,
    pub active_account: Option<Address>,
    pub balance: Option<Amount>,
}

impl SessionSnapshot {
    pub(crate) fn initial(connector_kind: ConnectorKind) -> Self {
        Self {
            connector_kind,
            state: SessionState::Unknown,
            is_extension_present: false,
            is_ready: false,
            active_account: None,
            balance: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state == SessionState::Connected
    }
}

/// Network-assigned identifier of a submitted transaction.
///
/// Usually a transaction hash; connectors may hand out Hedera transaction ids instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransactionRef(String);

impl TransactionRef {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_tx_hash(&self) -> Option<B256> {
        B256::from_str(&self.0).ok()
    }
}

impl From<B256> for TransactionRef {
    fn from(hash: B256) -> Self {
        Self(format!("{hash:#x}"))
    }
}

impl fmt::Display for TransactionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTransaction {
    pub transaction_ref: TransactionRef,
    pub submitted_at: SystemTime,
}

impl PendingTransaction {
    pub fn new(transaction_ref: TransactionRef) -> Self {
        Self {
            transaction_ref,
            submitted_at: SystemTime::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub transaction_ref: TransactionRef,
    pub success: bool,
    pub block_number: Option<u64>,
    pub gas_used: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransactionOutcome {
    Success(TransactionReceipt),
    Failure(TransactionFailure),
}

impl TransactionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}
