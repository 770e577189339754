//! Purge: irreversible removal regardless of the soft-delete mode.

use crate::client::Client;
use crate::error::Result;
use crate::schema::Document;
use crate::types::ObjectId;

impl Client {
    /// Permanently removes a record and its index entries, bypassing the
    /// soft-delete mode. Missing objects are skipped, so purging an
    /// already-purged record succeeds. Returns the record id.
    pub async fn purge<T: Document>(&self, record: &T) -> Result<ObjectId> {
        self.hard_delete(record).await
    }
}
