//! Crate error taxonomy.
//!
//! Every public verb surfaces one of these variants. The engine never
//! retries; create and delete are idempotent at the index layer, so a
//! caller retry after a transient store failure is safe.

use crate::store::StoreError;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the document store.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The caller passed an unusable argument (nil id, query by id where
    /// forbidden, value kind not matching the index declaration, ...).
    #[error("bad input: {reason}")]
    BadInput { reason: String },

    /// The record type's declared attributes are inconsistent.
    #[error("bad schema: {reason}")]
    BadSchema { reason: String },

    /// A uniqueness pre-check found the value already taken.
    #[error("unique index {index} already has value {value}")]
    UniqueConflict { index: String, value: String },

    /// The encoded index value exceeds the key ceiling.
    #[error("encoded value for index {index} is {len} bytes, over the ceiling")]
    ValueTooLong { index: String, len: usize },

    /// Record or index absent, or soft-deleted in a filtering read.
    #[error("not found: {key}")]
    NotFound { key: String },

    /// A unique value prefix held more than one entry.
    #[error("unique index {index} holds multiple entries for value {value}")]
    AmbiguousIndex { index: String, value: String },

    /// A query targeted a field with no matching index descriptor.
    #[error("no index covers field {field}")]
    UnknownIndex { field: String },

    /// An index object key failed to decode.
    #[error("index key decode failed: {reason}")]
    Decode { reason: String },

    /// A single part of a chunked transfer failed; the whole operation
    /// fails and any multipart upload is aborted best-effort.
    #[error("transfer part {part} failed: {reason}")]
    PartFailed { part: usize, reason: String },

    /// Propagated from the object store.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Record body could not be encoded or decoded as JSON.
    #[error("record serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn bad_input(reason: impl Into<String>) -> Self {
        Self::BadInput {
            reason: reason.into(),
        }
    }

    pub(crate) fn bad_schema(reason: impl Into<String>) -> Self {
        Self::BadSchema {
            reason: reason.into(),
        }
    }

    pub(crate) fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    pub(crate) fn decode(reason: impl Into<String>) -> Self {
        Self::Decode {
            reason: reason.into(),
        }
    }

    pub(crate) fn part_failed(part: usize, reason: impl ToString) -> Self {
        Self::PartFailed {
            part,
            reason: reason.to_string(),
        }
    }

    /// Maps a store-level not-found onto the engine's [`Error::NotFound`]
    /// for the given logical key; other store errors pass through.
    pub(crate) fn from_store(err: StoreError, key: &str) -> Self {
        match err {
            StoreError::NotFound { .. } => Self::not_found(key),
            other => Self::Store(other),
        }
    }

    /// True when the error denotes an absent record or index.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
