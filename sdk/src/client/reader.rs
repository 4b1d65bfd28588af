use std::sync::Arc;

use alloy::primitives::Address;
use log::debug;

use crate::{
    call::{ContractCallSpec, DecodedValue},
    connector::WalletConnector,
    error::{CallSpecError, ReadError},
};

/// View calls; these never need a connected session.
#[derive(Clone)]
pub struct ContractReader {
    connector: Arc<dyn WalletConnector>,
    contract: Address,
    gas_limit: u64,
}

impl ContractReader {
    pub(crate) fn new(connector: Arc<dyn WalletConnector>, contract: Address, gas_limit: u64) -> Self {
        Self {
            connector,
            contract,
            gas_limit,
        }
    }

    pub async fn read(&self, call: &ContractCallSpec) -> Result<DecodedValue, ReadError> {
        let output = self
            .connector
            .read_only_call(call)
            .await
            .map_err(ReadError::Transport)?;
        debug!("{} returned {} byte(s)", call.function_name(), output.len());

        call.decode_output(&output).map_err(|e| match e {
            CallSpecError::Arguments { function, reason }
            | CallSpecError::Signature {
                signature: function,
                reason,
            } => ReadError::AbiMismatch { function, reason },
        })
    }

    /// `message() returns (string)` on the configured contract.
    pub async fn message(&self) -> Result<String, ReadError> {
        let call = ContractCallSpec::message(self.contract, self.gas_limit)?;
        let value = self.read(&call).await?;
        value
            .as_string()
            .map(str::to_owned)
            .ok_or_else(|| ReadError::AbiMismatch {
                function: call.function_name().to_owned(),
                reason: "expected a single string".to_owned(),
            })
    }
}
