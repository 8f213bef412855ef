//! Error types for record store backends.

/// Errors that can occur when working with a record store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested record was not found.
    #[error("record not found: {0}")]
    RecordNotFound(String),

    /// A record with the same id already exists.
    #[error("record already exists: {0}")]
    DuplicateRecord(String),

    /// The store is not available.
    #[error("store unavailable: {reason}")]
    Unavailable { reason: String },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A timeout occurred while waiting for an operation.
    #[error("operation timed out after {millis}ms")]
    Timeout { millis: u64 },

    /// Failed to serialize or deserialize a record.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Invalid store configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl StoreError {
    /// Creates a not-found error for the given id.
    pub fn not_found(id: impl ToString) -> Self {
        Self::RecordNotFound(id.to_string())
    }

    /// Creates a duplicate-record error for the given id.
    pub fn duplicate(id: impl ToString) -> Self {
        Self::DuplicateRecord(id.to_string())
    }

    /// Creates an unavailable error.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// Returns true if this error means the record does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::RecordNotFound(_))
    }

    /// Returns true if this is a transient error that might succeed on retry.
    ///
    /// Retrying is the store client's concern; the cache coordinator
    /// never retries, it only propagates.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable { .. } | Self::Timeout { .. })
    }
}
