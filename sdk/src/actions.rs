//! User actions of the dApp, each ending in exactly one [`Notification`].

use std::{fmt, str::FromStr};

use alloy::primitives::Address;
use log::{error, warn};

use crate::{
    client::WhitelistDapp,
    error::{AddressInputError, ConnectError},
    hedera::EntityId,
    model::{SessionState, TransactionOutcome},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.level == NotificationLevel::Success
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Parses what the user typed into the address field.
///
/// Accepts a `0x`-prefixed EVM address or a Hedera `shard.realm.num` id.
pub fn parse_address_input(input: &str) -> Result<Address, AddressInputError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(AddressInputError::Empty);
    }

    let invalid = |reason: String| AddressInputError::Invalid {
        input: input.to_owned(),
        reason,
    };
    if input.starts_with("0x") || input.starts_with("0X") {
        Address::from_str(input).map_err(|e| invalid(e.to_string()))
    } else if input.contains('.') {
        EntityId::from_str(input)
            .map(|id| id.to_evm_address())
            .map_err(|e| invalid(e.to_string()))
    } else {
        Err(invalid("expected 0x address or shard.realm.num".to_owned()))
    }
}

impl WhitelistDapp {
    pub async fn connect_wallet(&self) -> Notification {
        match self.session.connect().await {
            Ok(account) => Notification::success(format!("Connected as {account}")),
            Err(ConnectError::ExtensionUnavailable) => {
                Notification::error("Extension not found. Please install it")
            }
            Err(e) => {
                error!("Wallet connection failed: {e}");
                Notification::error("Connection failed. Please try again.")
            }
        }
    }

    pub async fn disconnect_wallet(&self) -> Notification {
        self.session.disconnect().await;
        Notification::success("Disconnected")
    }

    /// Never touches the network.
    pub fn balance_label(&self) -> String {
        format!("Balance: {}", self.session.current_balance())
    }

    pub async fn check_whitelisted(&self, address_input: &str) -> Notification {
        let failed = || Notification::error("An error occurred while checking whitelist.");

        let account = match parse_address_input(address_input) {
            Ok(account) => account,
            Err(e) => {
                warn!("Rejected address input: {e}");
                return failed();
            }
        };
        let shown = address_input.trim();

        match self
            .verifier
            .is_whitelisted_consistent(account, self.consistency())
            .await
        {
            Ok(true) => Notification::success(format!("{shown} is whitelisted.")),
            Ok(false) => Notification::success(format!("{shown} is not whitelisted.")),
            Err(e) => {
                error!("Whitelist check for {account} failed: {e}");
                failed()
            }
        }
    }

    /// Submits `whitelist(address)` and waits for the transaction to settle.
    pub async fn add_to_whitelist(&self, address_input: &str) -> Notification {
        let failed = || Notification::error("An error occurred while adding to whitelist.");

        let state = match self.session.state() {
            SessionState::Unknown => self.session.refresh_readiness().await,
            state => state,
        };
        match state {
            SessionState::ExtensionMissing => return Notification::error("Please install Hashpack"),
            SessionState::Connected => {}
            _ => return Notification::error("Please connect to your wallet first."),
        }

        let account = match parse_address_input(address_input) {
            Ok(account) => account,
            Err(e) => {
                warn!("Rejected address input: {e}");
                return failed();
            }
        };
        let pending = match self.writer.whitelist(account).await {
            Ok(pending) => pending,
            Err(e) => {
                error!("Whitelist submission for {account} failed: {e}");
                return failed();
            }
        };

        match self.watcher.watch(pending).await {
            TransactionOutcome::Success(_) => Notification::success("Successfully added to whitelist!"),
            TransactionOutcome::Failure(failure) => Notification::error(format!("Error: {failure}")),
        }
    }

    pub async fn check_message(&self) -> Notification {
        match self.reader.message().await {
            Ok(message) => Notification::success(message),
            Err(e) => {
                error!("Reading the contract message failed: {e}");
                Notification::error("An error occurred while checking the message.")
            }
        }
    }
}
