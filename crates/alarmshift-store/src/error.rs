//! Error types for the alarm API and snapshot backends.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AlarmApiError {
    /// Request-rate ceiling hit; safe to retry later.
    #[error("throttled: {0}")]
    Throttled(String),

    /// The alarm or a resource it references does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The write was rejected because a field is malformed.
    #[error("validation error: {0}")]
    Validation(String),

    #[error("alarm api io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed alarm document: {0}")]
    Decode(#[from] serde_json::Error),
}

impl AlarmApiError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Throttled(_))
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed snapshot document: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("snapshot {key} is {size} bytes, over the {limit} byte limit")]
    ValueTooLarge {
        key: String,
        size: usize,
        limit: usize,
    },
}
