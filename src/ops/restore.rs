//! Restore: bring a soft-deleted record back to live.

use tracing::debug;

use crate::client::Client;
use crate::error::{Error, Result};
use crate::keys;
use crate::schema::{Document, Schema};

use crate::types::ObjectId;

impl Client {
    /// Strips the `DeletedAt` tag from the record object and every index
    /// object, making the record visible to reads again. Returns the
    /// record id.
    ///
    /// # Errors
    ///
    /// [`crate::Error::NotFound`] when the record object is absent;
    /// [`crate::Error::BadInput`] for a nil id.
    pub async fn restore<T: Document>(&self, record: &mut T) -> Result<ObjectId> {
        let id = record.managed().id;
        if id.is_nil() {
            return Err(Error::bad_input("record has no id"));
        }
        let schema = Schema::of(record)?;
        let key = keys::record_key(&schema.collection, id);

        self.store
            .delete_object_tagging(&key)
            .await
            .map_err(|err| Error::from_store(err, &key))?;
        self.restore_indexes(&schema, id).await?;

        record.managed_mut().clear_deleted();
        debug!(key = %key, "restored record");
        Ok(id)
    }
}
