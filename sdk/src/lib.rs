pub mod actions;
pub mod call;
pub mod client;
pub mod config;
pub mod connector;
mod contract;
pub mod error;
pub mod event;
pub mod hedera;
pub mod model;
pub mod session;
mod validators;
pub mod verifier;
pub mod watcher;

pub use alloy::primitives::{Address, U256};
pub use mirror::{LogOrder, LogPage, LogRecord, MirrorClient, MirrorError};

pub use actions::{Notification, NotificationLevel, parse_address_input};
pub use call::{ContractCallSpec, DecodedValue};
pub use client::{WhitelistDapp, reader::ContractReader, writer::ContractWriter};
pub use config::{Config, ConfigBuilder};
pub use connector::{ConnectorEvent, RelayConnector, WalletConnector};
pub use event::WhitelistEvent;
pub use hedera::{EntityId, Network};
pub use model::{
    Amount, ConnectorKind, PendingTransaction, SessionSnapshot, SessionState, TransactionOutcome,
    TransactionReceipt, TransactionRef,
};
pub use session::WalletSession;
pub use verifier::{Backoff, ConsistencyPolicy, LogSource, MembershipIndex, WhitelistVerifier};
pub use watcher::{TransactionWatcher, WatchHandle, WatcherConfig};
