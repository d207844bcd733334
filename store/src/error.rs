use sea_orm::DbErr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// Raw timestamp does not look like epoch milliseconds.
    #[error("Invalid timestamp {raw:?}: {reason}")]
    InvalidTimestamp { raw: String, reason: String },

    /// A trading pair insert hit the uniqueness constraint and the re-read
    /// still found nothing.
    #[error("Trading pair conflict for {exchange} {base}/{quote} ({interval})")]
    DuplicatePairConflict {
        exchange: String,
        base: String,
        quote: String,
        interval: String,
    },

    #[error("Storage unavailable: {source}")]
    StorageUnavailable {
        #[from]
        source: DbErr,
    },

    #[error("Operation cancelled: {reason}")]
    OperationCancelled { reason: String },
}

impl StoreError {
    pub(crate) fn invalid_timestamp(raw: impl Into<String>, reason: impl Into<String>) -> Self {
        StoreError::InvalidTimestamp {
            raw: raw.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn cancelled(reason: impl Into<String>) -> Self {
        StoreError::OperationCancelled {
            reason: reason.into(),
        }
    }

    pub(crate) fn session_closed() -> Self {
        StoreError::StorageUnavailable {
            source: DbErr::Custom("session closed".to_string()),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, StoreError::OperationCancelled { .. })
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
