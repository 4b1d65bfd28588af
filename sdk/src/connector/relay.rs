use std::{
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};

use alloy::{
    network::{ReceiptResponse as _, TransactionBuilder},
    primitives::{Address, Bytes},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::TransactionRequest,
    signers::local::PrivateKeySigner,
};
use async_trait::async_trait;
use log::{debug, info, warn};
use tokio::sync::broadcast;

use crate::{
    call::ContractCallSpec,
    config::Config,
    connector::{ConnectorEvent, WalletConnector},
    error::{ClientError, ConnectorError},
    hedera::Network,
    model::{Amount, ConnectorKind, TransactionReceipt, TransactionRef},
};

const EVENT_CAPACITY: usize = 16;

/// Connector that signs with a locally held operator key and talks to the
/// network through the Hedera JSON-RPC relay.
///
/// Without a key it still serves read-only calls and receipts, but reports
/// the wallet extension as missing.
///
/// Raises `Ready` the first time `is_ready` confirms the relay is on the
/// configured network, and `SessionLost` when it stops doing so while
/// connected. Rejected submissions are reported as errors, not events.
pub struct RelayConnector {
    network: Network,
    provider: DynProvider,
    signer: Option<PrivateKeySigner>,
    connected: AtomicBool,
    ready: AtomicBool,
    receipt_timeout: Duration,
    events: broadcast::Sender<ConnectorEvent>,
}

impl RelayConnector {
    pub async fn new(cfg: &Config) -> Result<Self, ClientError> {
        let rpc_url = cfg.json_rpc_url.to_string();
        let provider = match cfg.operator_key.clone() {
            Some(signer) => ProviderBuilder::new()
                .wallet(signer)
                .connect(&rpc_url)
                .await
                .map_err(|e| ClientError::Provider(e.to_string()))?
                .erased(),
            None => ProviderBuilder::new()
                .connect(&rpc_url)
                .await
                .map_err(|e| ClientError::Provider(e.to_string()))?
                .erased(),
        };
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Ok(Self {
            network: cfg.network,
            provider,
            signer: cfg.operator_key.clone(),
            connected: AtomicBool::new(false),
            ready: AtomicBool::new(false),
            receipt_timeout: cfg.receipt_timeout,
            events,
        })
    }

    fn set_ready(&self, ready: bool) {
        let was_ready = self.ready.swap(ready, Ordering::AcqRel);
        if ready && !was_ready {
            let _ = self.events.send(ConnectorEvent::Ready);
        } else if !ready && was_ready && self.connected.swap(false, Ordering::AcqRel) {
            let _ = self.events.send(ConnectorEvent::SessionLost);
        }
    }

    fn ensure_connected(&self) -> Result<(), ConnectorError> {
        if self.connected.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(ConnectorError::SessionLost)
        }
    }
}

fn transport(e: impl std::fmt::Display) -> ConnectorError {
    ConnectorError::Transport(e.to_string())
}

#[async_trait]
impl WalletConnector for RelayConnector {
    fn kind(&self) -> ConnectorKind {
        ConnectorKind::LocalKey
    }

    fn is_extension_present(&self) -> bool {
        self.signer.is_some()
    }

    async fn is_ready(&self) -> bool {
        let ready = match self.provider.get_chain_id().await {
            Ok(chain_id) if chain_id == self.network.chain_id() => true,
            Ok(chain_id) => {
                warn!(
                    "Relay reports chain id {chain_id}, expected {} for {}",
                    self.network.chain_id(),
                    self.network
                );
                false
            }
            Err(e) => {
                warn!("Relay not reachable: {e}");
                false
            }
        };
        self.set_ready(ready);
        ready
    }

    async fn connect(&self) -> Result<Address, ConnectorError> {
        let signer = self.signer.as_ref().ok_or(ConnectorError::Unavailable)?;
        self.connected.store(true, Ordering::Release);
        info!("Operator key {} connected on {}", signer.address(), self.network);
        Ok(signer.address())
    }

    async fn disconnect(&self) -> Result<(), ConnectorError> {
        self.connected.store(false, Ordering::Release);
        Ok(())
    }

    async fn get_balance(&self, account: Address) -> Result<Amount, ConnectorError> {
        self.provider
            .get_balance(account)
            .await
            .map(Amount::from_weibars)
            .map_err(transport)
    }

    async fn sign_and_send(&self, call: &ContractCallSpec) -> Result<TransactionRef, ConnectorError> {
        self.ensure_connected()?;

        let tx = TransactionRequest::default()
            .with_to(call.contract_address())
            .with_input(call.calldata().clone())
            .with_gas_limit(call.gas_limit());
        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| ConnectorError::Rejected(e.to_string()))?;

        let tx_ref = TransactionRef::from(*pending.tx_hash());
        debug!("Broadcast `{}` as {tx_ref}", call.function_name());
        Ok(tx_ref)
    }

    async fn read_only_call(&self, call: &ContractCallSpec) -> Result<Bytes, ConnectorError> {
        let tx = TransactionRequest::default()
            .with_to(call.contract_address())
            .with_input(call.calldata().clone())
            .with_gas_limit(call.gas_limit());
        self.provider.call(tx).await.map_err(transport)
    }

    async fn transaction_receipt(
        &self,
        tx: &TransactionRef,
    ) -> Result<Option<TransactionReceipt>, ConnectorError> {
        let hash = tx
            .to_tx_hash()
            .ok_or_else(|| ConnectorError::InvalidTransactionRef(tx.to_string()))?;
        let receipt = self
            .provider
            .get_transaction_receipt(hash)
            .await
            .map_err(transport)?;

        Ok(receipt.map(|receipt| TransactionReceipt {
            transaction_ref: tx.clone(),
            success: receipt.status(),
            block_number: receipt.block_number,
            gas_used: Some(receipt.gas_used),
        }))
    }

    fn receipt_timeout(&self) -> Duration {
        self.receipt_timeout
    }

    fn subscribe_events(&self) -> broadcast::Receiver<ConnectorEvent> {
        self.events.subscribe()
    }
}
