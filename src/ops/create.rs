//! Create: persist a new record and its index family.

use tracing::debug;

use crate::client::Client;
use crate::error::Result;
use crate::keys;
use crate::schema::{Document, Schema};

impl Client {
    /// Persists a new record.
    ///
    /// Assigns the managed attributes (fresh id, both write timestamps,
    /// cleared deletion), pre-checks every unique index, writes the index
    /// objects, then writes the record body. Returns the record object's
    /// content etag.
    ///
    /// Index objects land before the record so a reader resolving an
    /// index never observes a record without its entries; the store is
    /// not transactional, so a crash between the two leaves orphan
    /// entries that the next successful write of the same paths repairs.
    ///
    /// # Errors
    ///
    /// [`crate::Error::UniqueConflict`] when a unique value is taken,
    /// [`crate::Error::BadSchema`] for inconsistent attribute
    /// declarations, [`crate::Error::ValueTooLong`] when an encoded index
    /// value exceeds the key ceiling.
    pub async fn create<T: Document>(&self, record: &mut T) -> Result<String> {
        record.managed_mut().touch_create();
        let schema = Schema::of(record)?;
        let id = record.managed().id;

        if !schema.indexes.is_empty() {
            self.check_uniqueness(&schema).await?;
            self.create_indexes(&schema, id).await?;
        }

        let body = serde_json::to_vec(record)?;
        let key = keys::record_key(&schema.collection, id);
        let etag = self.write_object(&key, body).await?;
        debug!(key = %key, etag = %etag, "created record");
        Ok(etag)
    }
}
