use alarmshift_core::{PayloadError, RuleFileError};
use alarmshift_store::{AlarmApiError, ListError, StoreError};
use thiserror::Error;

/// Failure while handling one alarm. Caught at the item boundary and
/// recorded in the report; never aborts a run.
#[derive(Debug, Error)]
pub enum ItemError {
    #[error("write failed: {0}")]
    Write(#[source] AlarmApiError),

    /// The write was applied; only the read-back failed.
    #[error("written; re-read failed: {0}")]
    Reread(#[source] ListError),

    #[error("snapshot failed: {0}")]
    Snapshot(#[from] StoreError),

    #[error("invalid payload: {0}")]
    Payload(#[from] PayloadError),
}

impl ItemError {
    /// True when a retry on a later run is likely to succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Write(e) | Self::Reread(ListError::Page(e)) => e.is_transient(),
            _ => false,
        }
    }
}

/// Problems detected before any alarm is touched.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no snapshot destination configured")]
    MissingSnapshotDestination,

    #[error("invalid setting {name}: {detail}")]
    Invalid { name: &'static str, detail: String },

    #[error("rule file: {0}")]
    Rules(#[from] RuleFileError),
}
