//! Chunked parallel I/O for large payloads.
//!
//! Both directions derive a part size from the payload size with a
//! logarithmic curve, clamp it to direction-specific bounds, and fan one
//! tokio task out per part. Reads reassemble byte ranges in part order;
//! writes stage parts into a multipart upload whose completion is the
//! commit point. Any part failure fails the whole transfer, cancels the
//! remaining tasks, and (for writes) aborts the multipart upload.
//! Dropping a transfer future mid-flight cancels its part tasks and
//! abandons its upload the same way.

use std::sync::Arc;

use tokio::task::{JoinError, JoinHandle};
use tracing::debug;

use crate::client::Client;
use crate::error::{Error, Result};
use crate::store::{CompletedPart, ObjectStore, StoreError};

/// Smallest byte-range read issued by a chunked get.
pub const MIN_GET_PART: u64 = 500;
/// Largest byte-range read issued by a chunked get.
pub const MAX_GET_PART: u64 = 1024 * 1024;
/// Smallest part staged by a chunked put.
pub const MIN_PUT_PART: u64 = 5 * 1024 * 1024;
/// Largest part staged by a chunked put.
pub const MAX_PUT_PART: u64 = 100 * 1024 * 1024;

/// Derives the part size for a payload: `min · log2(size/min + 1)`,
/// clamped to `[min, max]`.
#[must_use]
pub fn part_size(size: u64, min: u64, max: u64) -> u64 {
    let scaled = (size as f64 / min as f64 + 1.0).log2();
    let part = (min as f64 * scaled).floor() as u64;
    part.clamp(min, max)
}

/// Spawned part tasks. Whatever is still running is aborted on drop, so
/// an early return or a cancelled caller never leaves parts in flight.
struct PartTasks<T>(Vec<JoinHandle<T>>);

impl<T> PartTasks<T> {
    fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    fn push(&mut self, handle: JoinHandle<T>) {
        self.0.push(handle);
    }

    fn len(&self) -> usize {
        self.0.len()
    }

    async fn join(&mut self, index: usize) -> std::result::Result<T, JoinError> {
        (&mut self.0[index]).await
    }
}

impl<T> Drop for PartTasks<T> {
    fn drop(&mut self) {
        for handle in &self.0 {
            handle.abort();
        }
    }
}

/// Abandons the multipart upload if the owning future is dropped before
/// the transfer settles. The failure and completion paths abort or
/// commit explicitly and disarm the guard first.
struct UploadGuard {
    store: Arc<dyn ObjectStore>,
    key: String,
    upload_id: String,
    armed: bool,
}

impl UploadGuard {
    fn new(store: Arc<dyn ObjectStore>, key: &str, upload_id: &str) -> Self {
        Self {
            store,
            key: key.to_string(),
            upload_id: upload_id.to_string(),
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for UploadGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let store = Arc::clone(&self.store);
        let key = std::mem::take(&mut self.key);
        let upload_id = std::mem::take(&mut self.upload_id);
        tokio::spawn(async move {
            if let Err(err) = store.abort_multipart_upload(&key, &upload_id).await {
                debug!(key, upload_id, error = %err, "multipart abort failed");
            }
        });
    }
}

impl Client {
    /// Reads an object through concurrent byte-range requests.
    ///
    /// The result is byte-identical to a single sequential get. Fails
    /// with [`Error::NotFound`] for absent keys and
    /// [`Error::PartFailed`] when any range read fails; partial bytes
    /// are discarded.
    pub async fn get_chunked(&self, key: &str) -> Result<Vec<u8>> {
        let info = self
            .store
            .head_object(key)
            .await?
            .ok_or_else(|| Error::not_found(key))?;
        let size = info.size;
        if size == 0 {
            return Ok(Vec::new());
        }

        let part = part_size(size, MIN_GET_PART, MAX_GET_PART);
        let parts = size.div_ceil(part);
        debug!(key, size, part, parts, "chunked get");

        let mut tasks = PartTasks::with_capacity(parts as usize);
        for number in 0..parts {
            let store = Arc::clone(&self.store);
            let key = key.to_string();
            let start = number * part;
            let end = (start + part).min(size);
            tasks.push(tokio::spawn(async move {
                store
                    .get_object(&key, Some(start..end))
                    .await?
                    .ok_or(StoreError::NotFound { key })
            }));
        }

        let mut body = Vec::with_capacity(size as usize);
        for number in 0..tasks.len() {
            // Joining in part order keeps assembly ordered no matter
            // when each task completes.
            match tasks.join(number).await {
                Ok(Ok(bytes)) => body.extend_from_slice(&bytes),
                Ok(Err(err)) => return Err(Error::part_failed(number, err)),
                Err(err) => return Err(Error::part_failed(number, err)),
            }
        }
        Ok(body)
    }

    /// Writes an object through a multipart upload with concurrent part
    /// uploads. Returns the etag of the committed object; completion is
    /// the commit point, and a failed transfer aborts the upload.
    pub async fn put_chunked(&self, key: &str, body: Vec<u8>) -> Result<String> {
        let size = body.len() as u64;
        let part = part_size(size, MIN_PUT_PART, MAX_PUT_PART);
        let parts = size.div_ceil(part).max(1);
        debug!(key, size, part, parts, "chunked put");

        let upload_id = self.store.create_multipart_upload(key).await?;
        let mut guard = UploadGuard::new(Arc::clone(&self.store), key, &upload_id);
        let body = Arc::new(body);

        let mut tasks = PartTasks::with_capacity(parts as usize);
        for number in 0..parts {
            let store = Arc::clone(&self.store);
            let body = Arc::clone(&body);
            let key = key.to_string();
            let upload_id = upload_id.clone();
            let start = (number * part) as usize;
            let end = ((number + 1) * part).min(size) as usize;
            tasks.push(tokio::spawn(async move {
                let part_number = number as u32 + 1;
                let etag = store
                    .upload_part(&key, &upload_id, part_number, body[start..end].to_vec())
                    .await?;
                Ok::<_, StoreError>(CompletedPart { part_number, etag })
            }));
        }

        let mut completed = Vec::with_capacity(parts as usize);
        for number in 0..tasks.len() {
            let staged = match tasks.join(number).await {
                Ok(Ok(staged)) => staged,
                Ok(Err(err)) => {
                    return Err(self
                        .fail_upload(&mut guard, Error::part_failed(number, err))
                        .await)
                }
                Err(err) => {
                    return Err(self
                        .fail_upload(&mut guard, Error::part_failed(number, err))
                        .await)
                }
            };
            completed.push(staged);
        }

        completed.sort_by_key(|staged| staged.part_number);
        match self
            .store
            .complete_multipart_upload(key, &upload_id, completed)
            .await
        {
            Ok(etag) => {
                guard.disarm();
                Ok(etag)
            }
            Err(err) => Err(self.fail_upload(&mut guard, err.into()).await),
        }
    }

    /// Aborts the upload right away so the failure is observable as soon
    /// as the caller sees the error; the original failure stays the
    /// surfaced one.
    async fn fail_upload(&self, guard: &mut UploadGuard, failure: Error) -> Error {
        guard.disarm();
        if let Err(err) = self
            .store
            .abort_multipart_upload(&guard.key, &guard.upload_id)
            .await
        {
            debug!(
                key = %guard.key,
                upload_id = %guard.upload_id,
                error = %err,
                "multipart abort failed"
            );
        }
        failure
    }
}
