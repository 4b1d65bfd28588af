use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("invalid mirror URL: {0}")]
    InvalidUrl(String),

    #[error("mirror network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("mirror node responded with {status}: {body}")]
    UnexpectedStatus { status: StatusCode, body: String },

    #[error("malformed mirror response: {0}")]
    MalformedResponse(String),
}

impl MirrorError {
    /// Transport failures and non-2xx responses both count as network errors.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_) | Self::UnexpectedStatus { .. })
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Network(e) => e.status(),
            Self::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// A single entry of the `logs` array that could not be turned into a [`LogRecord`].
///
/// [`LogRecord`]: crate::model::LogRecord
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("log entry has unexpected shape: {0}")]
    Shape(String),

    #[error("log field `{field}` is not valid hex: {reason}")]
    InvalidHex { field: &'static str, reason: String },
}
