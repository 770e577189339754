//! Update: rewrite a record, swapping any index whose value changed.

use tracing::debug;

use crate::client::Client;
use crate::error::{Error, Result};
use crate::keys;
use crate::schema::{Document, Schema};

impl Client {
    /// Rewrites an existing record.
    ///
    /// Loads the stored body, compares every indexed attribute against
    /// the in-memory record, and for each changed index deletes the
    /// entry under the old value and writes one under the new value
    /// (after re-checking uniqueness on the new values). Finally stamps
    /// `updated_at` and writes the body. Returns the new content etag.
    ///
    /// Two concurrent updates of the same record are last-writer-wins on
    /// the body; their index swaps are not coordinated.
    ///
    /// # Errors
    ///
    /// [`crate::Error::NotFound`] when the record was never created,
    /// [`crate::Error::BadInput`] for a nil id,
    /// [`crate::Error::UniqueConflict`] when a changed unique value is
    /// taken.
    pub async fn update<T: Document>(&self, record: &mut T) -> Result<String> {
        let id = record.managed().id;
        if id.is_nil() {
            return Err(Error::bad_input("record has no id; create it first"));
        }

        let mut schema = Schema::of(record)?;
        let key = keys::record_key(&schema.collection, id);
        let body = self.read_object(&key).await?;
        let stored: T = serde_json::from_slice(&body)?;

        if schema.compare_index_fields(&stored) {
            self.check_uniqueness_changed(&schema).await?;
            self.update_indexes(&schema, id).await?;
        }

        // Rewriting the object resets its tag set at the store layer;
        // carry the existing tags (a DeletedAt marker in particular)
        // across the write so update never doubles as a restore.
        let tags = self
            .store
            .get_object_tagging(&key)
            .await?
            .unwrap_or_default();

        record.managed_mut().touch_update();
        let body = serde_json::to_vec(record)?;
        let etag = self.write_object(&key, body).await?;
        if !tags.is_empty() {
            self.store.put_object_tagging(&key, tags).await?;
        }
        debug!(key = %key, etag = %etag, "updated record");
        Ok(etag)
    }
}
