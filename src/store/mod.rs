//! Object-store capability set.
//!
//! The engine talks to storage exclusively through [`ObjectStore`]: a flat
//! key/value namespace with prefix listing, per-object tagging, byte-range
//! reads, and multipart uploads. Adapters for real remote stores implement
//! this trait; [`MemoryObjectStore`] is the bundled in-process
//! implementation used for testing and embedded use.

mod memory;

use std::collections::HashMap;
use std::ops::Range;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub use memory::MemoryObjectStore;

/// Errors produced by store implementations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StoreError {
    /// The addressed object does not exist.
    #[error("object not found: {key}")]
    NotFound { key: String },

    /// The addressed multipart upload does not exist.
    #[error("multipart upload not found: {upload_id}")]
    UploadNotFound { upload_id: String },

    /// A byte range fell outside the object.
    #[error("invalid byte range {start}..{end} for object of {size} bytes")]
    InvalidRange { start: u64, end: u64, size: u64 },

    /// A multipart completion referenced missing or mismatched parts.
    #[error("bad multipart upload: {reason}")]
    BadUpload { reason: String },

    /// Escape hatch for adapter-specific failures.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Metadata for a stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectInfo {
    /// Full object key.
    pub key: String,
    /// Size in bytes.
    pub size: u64,
    /// Content etag as returned by the last write.
    pub etag: String,
    /// Last modification time.
    pub modified_at: DateTime<Utc>,
}

/// Parameters for a prefix listing.
#[derive(Debug, Clone, Default)]
pub struct ListRequest {
    /// Only keys starting with this prefix are returned.
    pub prefix: String,
    /// When set, keys containing the delimiter past the prefix are folded
    /// into common prefixes instead of being listed.
    pub delimiter: Option<String>,
    /// Resume strictly after this key.
    pub continuation_token: Option<String>,
    /// Page size cap.
    pub max_keys: Option<usize>,
}

/// One page of a prefix listing.
#[derive(Debug, Clone, Default)]
pub struct ListResponse {
    /// Matching keys, in lexicographic order.
    pub keys: Vec<String>,
    /// Folded subtrees when a delimiter was given.
    pub common_prefixes: Vec<String>,
    /// Present when more keys follow; pass back as the continuation token.
    pub next_token: Option<String>,
}

/// One finished part of a multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedPart {
    /// 1-based part number.
    pub part_number: u32,
    /// Etag returned by the part upload.
    pub etag: String,
}

/// Object tags, a small string map.
pub type TagSet = HashMap<String, String>;

/// The storage capabilities the engine requires from its host.
///
/// Implementations must be thread-safe; the chunked I/O engine issues
/// concurrent calls against a shared instance. Reads return `None` for
/// absent objects rather than erroring; `delete_object` reports absence
/// through its boolean so callers can treat deletes as idempotent.
#[async_trait]
pub trait ObjectStore: Send + Sync + 'static {
    /// Returns object metadata, or `None` when the key is absent.
    async fn head_object(&self, key: &str) -> Result<Option<ObjectInfo>, StoreError>;

    /// Reads an object, optionally restricted to a byte range. The end of
    /// a range is clamped to the object size.
    async fn get_object(
        &self,
        key: &str,
        range: Option<Range<u64>>,
    ) -> Result<Option<Vec<u8>>, StoreError>;

    /// Writes an object, replacing any previous body and tags at the key.
    /// Returns the content etag.
    async fn put_object(&self, key: &str, body: Vec<u8>) -> Result<String, StoreError>;

    /// Deletes an object. Returns whether it existed.
    async fn delete_object(&self, key: &str) -> Result<bool, StoreError>;

    /// Lists keys under a prefix with optional delimiter folding and
    /// continuation-token pagination.
    async fn list_objects(&self, request: ListRequest) -> Result<ListResponse, StoreError>;

    /// Starts a multipart upload for the key; returns the upload id.
    async fn create_multipart_upload(&self, key: &str) -> Result<String, StoreError>;

    /// Uploads one part; returns the part etag.
    async fn upload_part(
        &self,
        key: &str,
        upload_id: &str,
        part_number: u32,
        body: Vec<u8>,
    ) -> Result<String, StoreError>;

    /// Commits a multipart upload from its parts, given in ascending part
    /// order. Returns the content etag of the assembled object.
    async fn complete_multipart_upload(
        &self,
        key: &str,
        upload_id: &str,
        parts: Vec<CompletedPart>,
    ) -> Result<String, StoreError>;

    /// Abandons a multipart upload, discarding staged parts.
    async fn abort_multipart_upload(&self, key: &str, upload_id: &str)
        -> Result<(), StoreError>;

    /// Replaces the tag set of an object.
    async fn put_object_tagging(&self, key: &str, tags: TagSet) -> Result<(), StoreError>;

    /// Returns the tag set of an object, or `None` when the key is absent.
    async fn get_object_tagging(&self, key: &str) -> Result<Option<TagSet>, StoreError>;

    /// Removes every tag from an object.
    async fn delete_object_tagging(&self, key: &str) -> Result<(), StoreError>;
}
