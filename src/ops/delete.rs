//! Delete: soft (tag) or hard (remove) depending on the client mode.

use tracing::debug;

use crate::client::Client;
use crate::error::{Error, Result};
use crate::index::DELETED_AT_TAG;
use crate::keys;
use crate::schema::{Document, Schema};
use crate::store::TagSet;
use crate::types::{ObjectId, Timestamp};

impl Client {
    /// Deletes a record.
    ///
    /// With soft deletes enabled, the record object and each of its
    /// index objects receive a `DeletedAt` tag; the objects remain and
    /// reads filter them out until [`Client::restore`]. Otherwise the
    /// record and its index entries are removed. Returns the record id.
    ///
    /// # Errors
    ///
    /// [`crate::Error::BadInput`] for a nil id;
    /// [`crate::Error::NotFound`] in soft mode when the record object is
    /// absent.
    pub async fn delete<T: Document>(&self, record: &mut T) -> Result<ObjectId> {
        if self.config.soft_deletes {
            self.soft_delete(record).await
        } else {
            self.hard_delete(record).await
        }
    }

    async fn soft_delete<T: Document>(&self, record: &mut T) -> Result<ObjectId> {
        let id = record.managed().id;
        if id.is_nil() {
            return Err(Error::bad_input("record has no id"));
        }
        let schema = Schema::of(record)?;
        let key = keys::record_key(&schema.collection, id);
        let at = Timestamp::now();

        let mut tags = TagSet::new();
        tags.insert(DELETED_AT_TAG.to_string(), at.key_string());
        self.store
            .put_object_tagging(&key, tags)
            .await
            .map_err(|err| Error::from_store(err, &key))?;

        self.soft_delete_indexes(&schema, id, at).await?;
        record.managed_mut().mark_deleted(at);
        debug!(key = %key, "soft-deleted record");
        Ok(id)
    }

    pub(crate) async fn hard_delete<T: Document>(&self, record: &T) -> Result<ObjectId> {
        let id = record.managed().id;
        if id.is_nil() {
            return Err(Error::bad_input("record has no id"));
        }
        let schema = Schema::of(record)?;

        if !schema.indexes.is_empty() {
            self.delete_indexes(&schema, id).await?;
        }

        let key = keys::record_key(&schema.collection, id);
        if !self.store.delete_object(&key).await? {
            debug!(key = %key, "record already gone");
        }
        Ok(id)
    }
}
