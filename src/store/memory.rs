//! In-memory object store.
//!
//! A DashMap-backed implementation of the full capability set, including
//! byte-range reads, tagging, and multipart staging. Non-persistent;
//! intended for tests, development, and embedded use.

use std::collections::BTreeMap;
use std::ops::Range;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use sha2::{Digest, Sha256};

use super::{
    CompletedPart, ListRequest, ListResponse, ObjectInfo, ObjectStore, StoreError, TagSet,
};
use crate::types::ObjectId;

fn content_etag(body: &[u8]) -> String {
    format!("{:x}", Sha256::digest(body))
}

#[derive(Clone)]
struct StoredObject {
    body: Vec<u8>,
    etag: String,
    modified_at: chrono::DateTime<Utc>,
    tags: TagSet,
}

struct StagedPart {
    etag: String,
    body: Vec<u8>,
}

struct PendingUpload {
    key: String,
    parts: BTreeMap<u32, StagedPart>,
}

/// In-memory [`ObjectStore`] using DashMap for concurrent access.
///
/// All data is lost when the value is dropped. `Clone` is intentionally
/// not implemented; share the store behind an `Arc`.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: DashMap<String, StoredObject>,
    uploads: DashMap<String, PendingUpload>,
}

impl MemoryObjectStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// True when no objects are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Number of multipart uploads started but neither completed nor
    /// aborted.
    #[must_use]
    pub fn pending_uploads(&self) -> usize {
        self.uploads.len()
    }

    /// Removes all objects and staged uploads.
    pub fn clear(&self) {
        self.objects.clear();
        self.uploads.clear();
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn head_object(&self, key: &str) -> Result<Option<ObjectInfo>, StoreError> {
        Ok(self.objects.get(key).map(|entry| ObjectInfo {
            key: key.to_string(),
            size: entry.body.len() as u64,
            etag: entry.etag.clone(),
            modified_at: entry.modified_at,
        }))
    }

    async fn get_object(
        &self,
        key: &str,
        range: Option<Range<u64>>,
    ) -> Result<Option<Vec<u8>>, StoreError> {
        let Some(entry) = self.objects.get(key) else {
            return Ok(None);
        };
        let body = &entry.body;
        match range {
            None => Ok(Some(body.clone())),
            Some(range) => {
                let size = body.len() as u64;
                let end = range.end.min(size);
                if range.start > end {
                    return Err(StoreError::InvalidRange {
                        start: range.start,
                        end: range.end,
                        size,
                    });
                }
                Ok(Some(body[range.start as usize..end as usize].to_vec()))
            }
        }
    }

    async fn put_object(&self, key: &str, body: Vec<u8>) -> Result<String, StoreError> {
        let etag = content_etag(&body);
        self.objects.insert(
            key.to_string(),
            StoredObject {
                body,
                etag: etag.clone(),
                modified_at: Utc::now(),
                tags: TagSet::new(),
            },
        );
        Ok(etag)
    }

    async fn delete_object(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.objects.remove(key).is_some())
    }

    async fn list_objects(&self, request: ListRequest) -> Result<ListResponse, StoreError> {
        let mut matching: Vec<String> = self
            .objects
            .iter()
            .map(|entry| entry.key().clone())
            .filter(|key| key.starts_with(&request.prefix))
            .filter(|key| match &request.continuation_token {
                Some(token) => key.as_str() > token.as_str(),
                None => true,
            })
            .collect();
        matching.sort();

        let mut keys = Vec::new();
        let mut prefixes: Vec<String> = Vec::new();
        let mut next_token = None;
        let max = request.max_keys.unwrap_or(usize::MAX);

        for key in matching {
            if let Some(delimiter) = &request.delimiter {
                if let Some(pos) = key[request.prefix.len()..].find(delimiter.as_str()) {
                    let folded = key[..request.prefix.len() + pos + delimiter.len()].to_string();
                    if prefixes.last() != Some(&folded) {
                        prefixes.push(folded);
                    }
                    continue;
                }
            }
            if keys.len() == max {
                next_token = keys.last().cloned();
                break;
            }
            keys.push(key);
        }

        Ok(ListResponse {
            keys,
            common_prefixes: prefixes,
            next_token,
        })
    }

    async fn create_multipart_upload(&self, key: &str) -> Result<String, StoreError> {
        let upload_id = ObjectId::generate().to_string();
        self.uploads.insert(
            upload_id.clone(),
            PendingUpload {
                key: key.to_string(),
                parts: BTreeMap::new(),
            },
        );
        Ok(upload_id)
    }

    async fn upload_part(
        &self,
        _key: &str,
        upload_id: &str,
        part_number: u32,
        body: Vec<u8>,
    ) -> Result<String, StoreError> {
        let mut upload =
            self.uploads
                .get_mut(upload_id)
                .ok_or_else(|| StoreError::UploadNotFound {
                    upload_id: upload_id.to_string(),
                })?;
        let etag = content_etag(&body);
        upload.parts.insert(
            part_number,
            StagedPart {
                etag: etag.clone(),
                body,
            },
        );
        Ok(etag)
    }

    async fn complete_multipart_upload(
        &self,
        key: &str,
        upload_id: &str,
        parts: Vec<CompletedPart>,
    ) -> Result<String, StoreError> {
        let (_, upload) =
            self.uploads
                .remove(upload_id)
                .ok_or_else(|| StoreError::UploadNotFound {
                    upload_id: upload_id.to_string(),
                })?;
        if upload.key != key {
            return Err(StoreError::BadUpload {
                reason: format!("upload {upload_id} targets {}, not {key}", upload.key),
            });
        }

        let mut body = Vec::new();
        for completed in &parts {
            let staged =
                upload
                    .parts
                    .get(&completed.part_number)
                    .ok_or_else(|| StoreError::BadUpload {
                        reason: format!("part {} was never uploaded", completed.part_number),
                    })?;
            if staged.etag != completed.etag {
                return Err(StoreError::BadUpload {
                    reason: format!("part {} etag mismatch", completed.part_number),
                });
            }
            body.extend_from_slice(&staged.body);
        }

        self.put_object(key, body).await
    }

    async fn abort_multipart_upload(
        &self,
        _key: &str,
        upload_id: &str,
    ) -> Result<(), StoreError> {
        self.uploads.remove(upload_id);
        Ok(())
    }

    async fn put_object_tagging(&self, key: &str, tags: TagSet) -> Result<(), StoreError> {
        let mut entry = self
            .objects
            .get_mut(key)
            .ok_or_else(|| StoreError::NotFound {
                key: key.to_string(),
            })?;
        entry.tags = tags;
        Ok(())
    }

    async fn get_object_tagging(&self, key: &str) -> Result<Option<TagSet>, StoreError> {
        Ok(self.objects.get(key).map(|entry| entry.tags.clone()))
    }

    async fn delete_object_tagging(&self, key: &str) -> Result<(), StoreError> {
        let mut entry = self
            .objects
            .get_mut(key)
            .ok_or_else(|| StoreError::NotFound {
                key: key.to_string(),
            })?;
        entry.tags.clear();
        Ok(())
    }
}
