//! Index manager: keeps index objects synchronized with record objects.
//!
//! Every mutation works per index descriptor over a schema snapshot. The
//! store offers no multi-key transactions, so create orders index writes
//! before the record write, and an update swaps each changed index
//! (delete old, write new) before the record body lands. Readers must
//! treat an index entry pointing at a missing record as not found;
//! deletes are idempotent so caller retries are safe.

use tracing::debug;

use crate::client::Client;
use crate::error::{Error, Result};
use crate::keys;
use crate::schema::{IndexKind, Schema};
use crate::store::{ListRequest, StoreError, TagSet};
use crate::types::{ObjectId, Timestamp};

/// Tag marking an object as soft-deleted; the value is unix seconds.
pub(crate) const DELETED_AT_TAG: &str = "DeletedAt";

impl Client {
    /// Pre-checks every unique index with a non-empty value before a
    /// create. Any existing entry under a value prefix means the value
    /// is taken.
    pub(crate) async fn check_uniqueness(&self, schema: &Schema) -> Result<()> {
        self.check_unique_values(schema, false).await
    }

    /// Pre-checks only the unique indexes whose value changed, on their
    /// new values; the unchanged ones would collide with the record's
    /// own entries.
    pub(crate) async fn check_uniqueness_changed(&self, schema: &Schema) -> Result<()> {
        self.check_unique_values(schema, true).await
    }

    async fn check_unique_values(&self, schema: &Schema, changed_only: bool) -> Result<()> {
        for field in &schema.indexes {
            if field.kind != IndexKind::Unique || field.value.is_empty() {
                continue;
            }
            if changed_only && !field.changed() {
                continue;
            }

            let prefix =
                keys::index_prefix(&schema.collection, field.kind, &field.name, &field.value)?;
            let page = self
                .store
                .list_objects(ListRequest {
                    // The trailing slash anchors the value; without it the
                    // prefix could match a longer encoded value.
                    prefix: format!("{prefix}/"),
                    max_keys: Some(1),
                    ..Default::default()
                })
                .await?;

            if !page.keys.is_empty() {
                return Err(Error::UniqueConflict {
                    index: field.name.clone(),
                    value: field.value.clone(),
                });
            }
        }
        Ok(())
    }

    /// Writes one empty index object per descriptor. Callers run
    /// [`Client::check_uniqueness`] first; re-writing an existing path is
    /// harmless.
    pub(crate) async fn create_indexes(&self, schema: &Schema, id: ObjectId) -> Result<()> {
        for field in &schema.indexes {
            let prefix =
                keys::index_prefix(&schema.collection, field.kind, &field.name, &field.value)?;
            let key = keys::index_key(&prefix, id);
            debug!(
                collection = %schema.collection,
                index = %field.name,
                kind = %field.kind,
                "create index entry"
            );
            self.store.put_object(&key, Vec::new()).await?;
        }
        Ok(())
    }

    /// Swaps each changed descriptor: delete the entry under the old
    /// value, write the entry under the new one. Unchanged descriptors
    /// are untouched. Each swap runs to completion before the next index
    /// is touched.
    pub(crate) async fn update_indexes(&self, schema: &Schema, id: ObjectId) -> Result<()> {
        for field in &schema.indexes {
            let Some(previous) = &field.previous else {
                continue;
            };
            debug!(
                collection = %schema.collection,
                index = %field.name,
                old = %previous,
                new = %field.value,
                "swap index entry"
            );

            let old_prefix =
                keys::index_prefix(&schema.collection, field.kind, &field.name, previous)?;
            self.store
                .delete_object(&keys::index_key(&old_prefix, id))
                .await?;

            let new_prefix =
                keys::index_prefix(&schema.collection, field.kind, &field.name, &field.value)?;
            self.store
                .put_object(&keys::index_key(&new_prefix, id), Vec::new())
                .await?;
        }
        Ok(())
    }

    /// Deletes the index entry for every descriptor's current value.
    /// Missing entries are skipped; the operation is idempotent.
    pub(crate) async fn delete_indexes(&self, schema: &Schema, id: ObjectId) -> Result<()> {
        for field in &schema.indexes {
            let prefix =
                keys::index_prefix(&schema.collection, field.kind, &field.name, &field.value)?;
            let key = keys::index_key(&prefix, id);
            if !self.store.delete_object(&key).await? {
                debug!(key = %key, "index entry already gone");
            }
        }
        Ok(())
    }

    /// Unconditional removal of every index entry; the index half of a
    /// purge.
    pub(crate) async fn purge_indexes(&self, schema: &Schema, id: ObjectId) -> Result<()> {
        self.delete_indexes(schema, id).await
    }

    /// Tags every index entry with the deletion instant. Entries missing
    /// from the store (a partially failed earlier write) are skipped.
    pub(crate) async fn soft_delete_indexes(
        &self,
        schema: &Schema,
        id: ObjectId,
        at: Timestamp,
    ) -> Result<()> {
        let mut tags = TagSet::new();
        tags.insert(DELETED_AT_TAG.to_string(), at.key_string());

        for field in &schema.indexes {
            let prefix =
                keys::index_prefix(&schema.collection, field.kind, &field.name, &field.value)?;
            let key = keys::index_key(&prefix, id);
            match self.store.put_object_tagging(&key, tags.clone()).await {
                Ok(()) => {}
                Err(StoreError::NotFound { .. }) => {
                    debug!(key = %key, "index entry missing during soft delete");
                }
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }

    /// Strips the deletion tag from every index entry. Missing entries
    /// are skipped.
    pub(crate) async fn restore_indexes(&self, schema: &Schema, id: ObjectId) -> Result<()> {
        for field in &schema.indexes {
            let prefix =
                keys::index_prefix(&schema.collection, field.kind, &field.name, &field.value)?;
            let key = keys::index_key(&prefix, id);
            match self.store.delete_object_tagging(&key).await {
                Ok(()) => {}
                Err(StoreError::NotFound { .. }) => {
                    debug!(key = %key, "index entry missing during restore");
                }
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }
}
