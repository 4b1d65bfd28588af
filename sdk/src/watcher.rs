use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
    time::Duration,
};

use log::{debug, info, warn};
use tokio::{sync::oneshot, task::JoinHandle};

use crate::{
    config::Config,
    connector::WalletConnector,
    error::{ConnectorError, TransactionFailure},
    model::{PendingTransaction, TransactionOutcome, TransactionReceipt, TransactionRef},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatcherConfig {
    pub poll_interval: Duration,
    /// Consecutive failed receipt queries tolerated before giving up.
    pub max_transport_retries: u32,
}

impl From<&Config> for WatcherConfig {
    fn from(cfg: &Config) -> Self {
        Self {
            poll_interval: cfg.receipt_poll_interval,
            max_transport_retries: cfg.max_transport_retries,
        }
    }
}

/// Turns a pending transaction into exactly one terminal outcome.
#[derive(Clone)]
pub struct TransactionWatcher {
    connector: Arc<dyn WalletConnector>,
    config: WatcherConfig,
}

impl TransactionWatcher {
    pub fn new(connector: Arc<dyn WalletConnector>, config: WatcherConfig) -> Self {
        Self { connector, config }
    }

    /// Starts watching in the background.
    ///
    /// Dropping the returned handle does not stop the watch.
    pub fn watch(&self, pending: PendingTransaction) -> WatchHandle {
        let (tx, rx) = oneshot::channel();
        let transaction_ref = pending.transaction_ref.clone();
        let watcher = self.clone();

        tokio::spawn(async move {
            let outcome = watcher.resolve(&pending.transaction_ref).await;
            if tx.send(outcome).is_err() {
                debug!(
                    "Outcome for {} settled after its handle was dropped",
                    pending.transaction_ref
                );
            }
        });

        WatchHandle {
            transaction_ref,
            rx,
        }
    }

    /// Callback form of [`watch`](Self::watch): exactly one of the two callbacks runs.
    pub fn watch_with<S, F>(
        &self,
        pending: PendingTransaction,
        on_success: S,
        on_failure: F,
    ) -> JoinHandle<()>
    where
        S: FnOnce(TransactionReceipt) + Send + 'static,
        F: FnOnce(TransactionFailure) + Send + 'static,
    {
        let handle = self.watch(pending);
        tokio::spawn(async move {
            match handle.await {
                TransactionOutcome::Success(receipt) => on_success(receipt),
                TransactionOutcome::Failure(failure) => on_failure(failure),
            }
        })
    }

    async fn resolve(&self, tx: &TransactionRef) -> TransactionOutcome {
        let timeout = self.connector.receipt_timeout();
        let outcome = match tokio::time::timeout(timeout, self.poll_receipt(tx)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!("No receipt for {tx} within {timeout:?}");
                TransactionOutcome::Failure(TransactionFailure::Timeout(timeout))
            }
        };

        match &outcome {
            TransactionOutcome::Success(receipt) => {
                info!("Transaction {tx} succeeded in block {:?}", receipt.block_number)
            }
            TransactionOutcome::Failure(failure) => warn!("Transaction {tx} failed: {failure}"),
        }
        outcome
    }

    async fn poll_receipt(&self, tx: &TransactionRef) -> TransactionOutcome {
        let mut failures = 0u32;

        loop {
            match self.connector.transaction_receipt(tx).await {
                Ok(Some(receipt)) if receipt.success => {
                    return TransactionOutcome::Success(receipt);
                }
                Ok(Some(receipt)) => {
                    return TransactionOutcome::Failure(TransactionFailure::Reverted { receipt });
                }
                Ok(None) => {
                    failures = 0;
                    debug!("Receipt for {tx} not available yet");
                }
                Err(e @ ConnectorError::InvalidTransactionRef(_)) => {
                    return TransactionOutcome::Failure(TransactionFailure::Transport(e));
                }
                Err(e) => {
                    failures += 1;
                    if failures > self.config.max_transport_retries {
                        return TransactionOutcome::Failure(TransactionFailure::Transport(e));
                    }
                    warn!(
                        "Receipt query for {tx} failed ({failures}/{}): {e}",
                        self.config.max_transport_retries
                    );
                }
            }

            tokio::time::sleep(self.config.poll_interval).await;
        }
    }
}

/// Resolves to the outcome of one watched transaction.
#[derive(Debug)]
pub struct WatchHandle {
    transaction_ref: TransactionRef,
    rx: oneshot::Receiver<TransactionOutcome>,
}

impl WatchHandle {
    pub fn transaction_ref(&self) -> &TransactionRef {
        &self.transaction_ref
    }
}

impl Future for WatchHandle {
    type Output = TransactionOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(|result| {
            result.unwrap_or(TransactionOutcome::Failure(TransactionFailure::WatcherDropped))
        })
    }
}
