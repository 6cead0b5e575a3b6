//! Storage error model.

use thiserror::Error;

use crate::id::ProductId;

/// Result type used by record stores.
pub type StoreResult<T> = Result<T, StoreError>;

/// Failure to read, write or initialize the product record store.
///
/// Every variant is a storage failure from the caller's point of view; the
/// split only exists to keep log output actionable.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backing medium could not be opened or reached.
    #[error("record store unavailable: {0}")]
    Unavailable(String),

    /// A statement against the backing medium failed.
    #[error("record store query failed: {0}")]
    Query(String),

    /// A persisted row could not be turned back into a product.
    #[error("product {id} could not be decoded: {reason}")]
    Decode { id: ProductId, reason: String },

    /// The persisted schema was written by a newer build. Rows are left as-is.
    #[error("record store schema version {stored} is newer than supported version {supported}")]
    SchemaTooNew { stored: u32, supported: u32 },
}

impl StoreError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    pub fn decode(id: ProductId, reason: impl Into<String>) -> Self {
        Self::Decode {
            id,
            reason: reason.into(),
        }
    }

    pub fn schema_too_new(stored: u32, supported: u32) -> Self {
        Self::SchemaTooNew { stored, supported }
    }
}
