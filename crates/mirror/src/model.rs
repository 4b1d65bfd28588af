use std::fmt;

use alloy_primitives::{Bytes, hex};
use serde::Deserialize;
use serde_json::Value;

use crate::error::RecordError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogOrder {
    #[default]
    Asc,
    Desc,
}

impl LogOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for LogOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw contract log as served by the mirror node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub data: Bytes,
    pub topics: Vec<Bytes>,
    pub block_number: Option<u64>,
    pub transaction_hash: Option<String>,
    pub index: Option<u64>,
    pub timestamp: Option<String>,
}

impl LogRecord {
    pub fn new(data: impl Into<Bytes>, topics: Vec<Bytes>) -> Self {
        Self {
            data: data.into(),
            topics,
            block_number: None,
            transaction_hash: None,
            index: None,
            timestamp: None,
        }
    }

    pub fn topic0(&self) -> Option<&Bytes> {
        self.topics.first()
    }
}

#[derive(Debug, Deserialize)]
struct RawLog {
    data: Option<String>,
    #[serde(default)]
    topics: Vec<String>,
    block_number: Option<u64>,
    transaction_hash: Option<String>,
    index: Option<u64>,
    timestamp: Option<String>,
}

impl TryFrom<&Value> for LogRecord {
    type Error = RecordError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        let raw = RawLog::deserialize(value).map_err(|e| RecordError::Shape(e.to_string()))?;

        let data = match raw.data.as_deref() {
            Some(data) => decode_hex("data", data)?,
            None => Bytes::new(),
        };
        let topics = raw
            .topics
            .iter()
            .map(|topic| decode_hex("topics", topic))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            data,
            topics,
            block_number: raw.block_number,
            transaction_hash: raw.transaction_hash,
            index: raw.index,
            timestamp: raw.timestamp,
        })
    }
}

fn decode_hex(field: &'static str, value: &str) -> Result<Bytes, RecordError> {
    hex::decode(value)
        .map(Bytes::from)
        .map_err(|e| RecordError::InvalidHex {
            field,
            reason: e.to_string(),
        })
}

/// One response page of `/contracts/{id}/results/logs`.
///
/// Entries are kept as returned and converted on iteration, so a single
/// malformed entry only affects its own item.
#[derive(Debug, Clone, PartialEq)]
pub struct LogPage {
    entries: Vec<Value>,
    next: Option<String>,
}

impl LogPage {
    pub fn new(entries: Vec<Value>, next: Option<String>) -> Self {
        Self { entries, next }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Link to the following page, if the mirror node reported one. Never followed.
    pub fn next_link(&self) -> Option<&str> {
        self.next.as_deref()
    }

    pub fn records(&self) -> impl Iterator<Item = Result<LogRecord, RecordError>> + '_ {
        self.entries.iter().map(LogRecord::try_from)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct BlocksResponse {
    #[serde(default)]
    pub blocks: Vec<BlockSummary>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BlockSummary {
    pub number: u64,
}
