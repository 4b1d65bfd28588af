//! Codec for the contract's single event, `WhitelistAccount(address accountId)`.
//!
//! The event has no indexed fields, so everything after the signature topic
//! is ignored and decoding only reads the log data.

use alloy::{
    primitives::{Address, Bytes},
    sol_types::SolEvent,
};
use log::debug;
use mirror::LogRecord;

use crate::{contract::Whitelist::WhitelistAccount, error::DecodeError};

/// One ABI word holding a left-padded address.
pub const EVENT_DATA_WIDTH: usize = 32;
const ADDRESS_PADDING: usize = EVENT_DATA_WIDTH - 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WhitelistEvent {
    pub account_id: Address,
}

pub fn decode(data: &[u8], topics: &[Bytes]) -> Result<WhitelistEvent, DecodeError> {
    let indexed = topics.get(1..).unwrap_or_default();
    if !indexed.is_empty() {
        debug!("ignoring {} topic(s) past the event signature", indexed.len());
    }

    if data.len() != EVENT_DATA_WIDTH {
        return Err(DecodeError::InvalidWidth {
            expected: EVENT_DATA_WIDTH,
            actual: data.len(),
        });
    }
    let (padding, address) = data.split_at(ADDRESS_PADDING);
    if padding.iter().any(|byte| *byte != 0) {
        return Err(DecodeError::InvalidPadding);
    }

    Ok(WhitelistEvent {
        account_id: Address::from_slice(address),
    })
}

pub fn decode_record(record: &LogRecord) -> Result<WhitelistEvent, DecodeError> {
    decode(&record.data, &record.topics)
}

/// Canonical log for `event`: signature topic plus the ABI-encoded account.
pub fn encode(event: &WhitelistEvent) -> LogRecord {
    let data = WhitelistAccount {
        accountId: event.account_id,
    }
    .encode_data();
    let signature = Bytes::copy_from_slice(WhitelistAccount::SIGNATURE_HASH.as_slice());
    LogRecord::new(data, vec![signature])
}
