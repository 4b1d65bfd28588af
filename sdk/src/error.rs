use std::time::Duration;

use mirror::{MirrorError, RecordError};
use thiserror::Error;

use crate::model::TransactionReceipt;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid config value: {0}")]
    InvalidValue(String),
    #[error("missing config: {0}")]
    Missing(String),
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("client provider error: {0}")]
    Provider(String),

    #[error("client mirror error: {0}")]
    Mirror(#[from] MirrorError),

    #[error("client initialization error: {0}")]
    Initialization(String),
}

#[derive(Debug, Error)]
pub enum EntityIdError {
    #[error("expected `shard.realm.num`, got `{0}`")]
    Format(String),
    #[error("invalid entity id component `{0}`")]
    Component(String),
}

/// Failures reported by a wallet connector implementation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConnectorError {
    #[error("wallet extension unavailable")]
    Unavailable,
    #[error("request rejected by the user")]
    UserRejected,
    #[error("wallet session lost")]
    SessionLost,
    #[error("wallet rejected the request: {0}")]
    Rejected(String),
    #[error("invalid transaction reference: {0}")]
    InvalidTransactionRef(String),
    #[error("connector transport error: {0}")]
    Transport(String),
}

#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("wallet extension is not installed or not ready")]
    ExtensionUnavailable,
    #[error("connection rejected in the wallet")]
    UserRejected,
    #[error(transparent)]
    Connector(ConnectorError),
}

#[derive(Debug, Error)]
pub enum CallSpecError {
    #[error("invalid ABI signature `{signature}`: {reason}")]
    Signature { signature: String, reason: String },
    #[error("arguments do not match `{function}`: {reason}")]
    Arguments { function: String, reason: String },
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("wallet is not connected")]
    NotConnected,
    #[error("submission rejected: {0}")]
    SubmissionRejected(#[source] ConnectorError),
    #[error(transparent)]
    InvalidCall(#[from] CallSpecError),
}

/// Terminal failure of a watched transaction.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TransactionFailure {
    #[error("transaction {} reverted", .receipt.transaction_ref)]
    Reverted { receipt: TransactionReceipt },
    #[error("no receipt within {0:?}")]
    Timeout(Duration),
    #[error("receipt query failed: {0}")]
    Transport(ConnectorError),
    #[error("watcher stopped before reporting an outcome")]
    WatcherDropped,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("expected {expected} bytes of event data, got {actual}")]
    InvalidWidth { expected: usize, actual: usize },
    #[error("address word has non-zero padding")]
    InvalidPadding,
    #[error(transparent)]
    Record(#[from] RecordError),
}

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error(transparent)]
    Mirror(#[from] MirrorError),
    #[error("mirror node has not indexed block {block} after {attempts} attempt(s)")]
    NotIndexed { block: u64, attempts: u32 },
}

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("read call failed: {0}")]
    Transport(#[source] ConnectorError),
    #[error("return data does not match `{function}`: {reason}")]
    AbiMismatch { function: String, reason: String },
    #[error(transparent)]
    InvalidCall(#[from] CallSpecError),
}

#[derive(Debug, Error)]
pub enum AddressInputError {
    #[error("address is empty")]
    Empty,
    #[error("invalid address `{input}`: {reason}")]
    Invalid { input: String, reason: String },
}
