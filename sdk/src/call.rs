use alloy::{
    dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt},
    json_abi::Function,
    primitives::{Address, Bytes},
};

use crate::{
    contract::{MESSAGE_SIGNATURE, WHITELIST_SIGNATURE},
    error::CallSpecError,
};

/// Immutable description of one contract call.
///
/// The signature is parsed and the arguments are encoded up front, so a
/// constructed spec always has valid calldata.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractCallSpec {
    contract_address: Address,
    function: Function,
    arguments: Vec<DynSolValue>,
    abi_signature: String,
    gas_limit: u64,
    calldata: Bytes,
}

impl ContractCallSpec {
    pub fn new(
        contract_address: Address,
        abi_signature: impl Into<String>,
        arguments: Vec<DynSolValue>,
        gas_limit: u64,
    ) -> Result<Self, CallSpecError> {
        let abi_signature = abi_signature.into();
        let function = Function::parse(&abi_signature).map_err(|e| CallSpecError::Signature {
            signature: abi_signature.clone(),
            reason: e.to_string(),
        })?;
        let calldata = function
            .abi_encode_input(&arguments)
            .map_err(|e| CallSpecError::Arguments {
                function: function.name.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            contract_address,
            function,
            arguments,
            abi_signature,
            gas_limit,
            calldata: calldata.into(),
        })
    }

    /// `whitelist(address accountId)`
    pub fn whitelist(
        contract_address: Address,
        account: Address,
        gas_limit: u64,
    ) -> Result<Self, CallSpecError> {
        Self::new(
            contract_address,
            WHITELIST_SIGNATURE,
            vec![DynSolValue::Address(account)],
            gas_limit,
        )
    }

    /// `message() view returns (string)`
    pub fn message(contract_address: Address, gas_limit: u64) -> Result<Self, CallSpecError> {
        Self::new(contract_address, MESSAGE_SIGNATURE, Vec::new(), gas_limit)
    }

    pub fn contract_address(&self) -> Address {
        self.contract_address
    }

    pub fn function_name(&self) -> &str {
        &self.function.name
    }

    pub fn arguments(&self) -> &[DynSolValue] {
        &self.arguments
    }

    pub fn abi_signature(&self) -> &str {
        &self.abi_signature
    }

    pub fn gas_limit(&self) -> u64 {
        self.gas_limit
    }

    pub fn selector(&self) -> [u8; 4] {
        self.function.selector().0
    }

    /// Selector followed by the ABI-encoded arguments.
    pub fn calldata(&self) -> &Bytes {
        &self.calldata
    }

    pub fn decode_output(&self, data: &[u8]) -> Result<DecodedValue, CallSpecError> {
        self.function
            .abi_decode_output(data)
            .map(DecodedValue)
            .map_err(|e| CallSpecError::Arguments {
                function: self.function.name.clone(),
                reason: e.to_string(),
            })
    }
}

/// Values returned by a view call, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedValue(Vec<DynSolValue>);

impl DecodedValue {
    pub fn values(&self) -> &[DynSolValue] {
        &self.0
    }

    pub fn into_values(self) -> Vec<DynSolValue> {
        self.0
    }

    /// The single `string` output, if that is what the function returns.
    pub fn as_string(&self) -> Option<&str> {
        match self.0.as_slice() {
            [value] => value.as_str(),
            _ => None,
        }
    }
}
