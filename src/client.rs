//! The store client: configuration plus a handle to the object store.

use std::sync::Arc;

use tracing::info;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::store::{MemoryObjectStore, ObjectStore};
use crate::transfer::{MAX_GET_PART, MIN_PUT_PART};

/// Handle to one document store.
///
/// Cheap to clone; all clones share the same store connection and
/// configuration. The public verbs (`create`, `update`, `delete`,
/// `restore`, `purge`, `find_one`, `find_many`, `find_all`) live in
/// per-verb impl blocks under `ops`.
#[derive(Clone)]
pub struct Client {
    pub(crate) store: Arc<dyn ObjectStore>,
    pub(crate) config: Config,
}

impl Client {
    /// Builds a client over any [`ObjectStore`] implementation.
    pub fn new(store: Arc<dyn ObjectStore>, config: Config) -> Self {
        info!(
            bucket = %config.bucket,
            region = %config.region,
            soft_deletes = config.soft_deletes,
            "client ready"
        );
        Self { store, config }
    }

    /// Builds a client over a fresh in-memory store. Ideal for tests and
    /// embedded use; all data is lost when the last clone drops.
    pub fn memory(config: Config) -> Self {
        Self::new(Arc::new(MemoryObjectStore::new()), config)
    }

    /// The underlying object store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    /// The client configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Reads a whole object, switching to chunked parallel reads for
    /// large bodies. Absent keys surface as [`Error::NotFound`].
    pub(crate) async fn read_object(&self, key: &str) -> Result<Vec<u8>> {
        let info = self
            .store
            .head_object(key)
            .await?
            .ok_or_else(|| Error::not_found(key))?;
        if info.size > MAX_GET_PART {
            return self.get_chunked(key).await;
        }
        self.store
            .get_object(key, None)
            .await?
            .ok_or_else(|| Error::not_found(key))
    }

    /// Writes a whole object, switching to a multipart upload for large
    /// bodies. Returns the content etag.
    pub(crate) async fn write_object(&self, key: &str, body: Vec<u8>) -> Result<String> {
        if body.len() as u64 > MIN_PUT_PART {
            return self.put_chunked(key, body).await;
        }
        Ok(self.store.put_object(key, body).await?)
    }

    /// Checks whether an object carries the deletion tag. An absent
    /// object (or absent tag set) counts as live.
    pub(crate) async fn is_soft_deleted(&self, key: &str) -> Result<bool> {
        let tags = self.store.get_object_tagging(key).await?;
        Ok(tags.is_some_and(|tags| tags.contains_key(crate::index::DELETED_AT_TAG)))
    }
}
