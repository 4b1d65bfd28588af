use std::sync::Arc;

use alloy::primitives::Address;
use log::{info, warn};

use crate::{
    call::ContractCallSpec,
    error::{ConnectorError, SubmitError},
    model::PendingTransaction,
    session::WalletSession,
};

/// Submits state-changing calls through the connected wallet.
#[derive(Clone)]
pub struct ContractWriter {
    session: Arc<WalletSession>,
    contract: Address,
    gas_limit: u64,
}

impl ContractWriter {
    pub(crate) fn new(session: Arc<WalletSession>, contract: Address, gas_limit: u64) -> Self {
        Self {
            session,
            contract,
            gas_limit,
        }
    }

    pub fn contract(&self) -> Address {
        self.contract
    }

    /// Broadcasts `call` once and returns as soon as the network accepted it.
    pub async fn submit(&self, call: &ContractCallSpec) -> Result<PendingTransaction, SubmitError> {
        if !self.session.is_connected() {
            return Err(SubmitError::NotConnected);
        }

        match self.session.connector().sign_and_send(call).await {
            Ok(tx) => {
                info!("Submitted {} as {tx}", call.function_name());
                Ok(PendingTransaction::new(tx))
            }
            Err(e) => {
                if e == ConnectorError::SessionLost {
                    self.session.mark_session_lost();
                }
                warn!("Submission of {} rejected: {e}", call.function_name());
                Err(SubmitError::SubmissionRejected(e))
            }
        }
    }

    /// `whitelist(account)` on the configured contract.
    pub async fn whitelist(&self, account: Address) -> Result<PendingTransaction, SubmitError> {
        let call = ContractCallSpec::whitelist(self.contract, account, self.gas_limit)?;
        self.submit(&call).await
    }
}
