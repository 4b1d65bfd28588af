use std::time::Duration;

use alloy::primitives::{Address, Bytes};
use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::{
    call::ContractCallSpec,
    error::ConnectorError,
    model::{Amount, ConnectorKind, TransactionReceipt, TransactionRef},
};

mod relay;

pub use relay::RelayConnector;

/// Signals a connector raises on its own, outside of any request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectorEvent {
    Ready,
    ExtensionMissing,
    /// The wallet was locked or the pairing dropped.
    SessionLost,
    AccountChanged(Address),
}

/// Capability the dApp needs from a wallet.
///
/// Components only ever see an `Arc<dyn WalletConnector>`; the concrete
/// connector is picked when the client is configured.
#[async_trait]
pub trait WalletConnector: Send + Sync {
    fn kind(&self) -> ConnectorKind;

    fn is_extension_present(&self) -> bool;

    async fn is_ready(&self) -> bool;

    async fn connect(&self) -> Result<Address, ConnectorError>;

    async fn disconnect(&self) -> Result<(), ConnectorError>;

    async fn get_balance(&self, account: Address) -> Result<Amount, ConnectorError>;

    /// Signs and broadcasts `call`, returning as soon as the network accepted it.
    async fn sign_and_send(&self, call: &ContractCallSpec) -> Result<TransactionRef, ConnectorError>;

    async fn read_only_call(&self, call: &ContractCallSpec) -> Result<Bytes, ConnectorError>;

    /// `Ok(None)` while the transaction has no receipt yet.
    async fn transaction_receipt(
        &self,
        tx: &TransactionRef,
    ) -> Result<Option<TransactionReceipt>, ConnectorError>;

    /// How long a receipt may take before the transaction counts as timed out.
    fn receipt_timeout(&self) -> Duration;

    fn subscribe_events(&self) -> broadcast::Receiver<ConnectorEvent>;
}
