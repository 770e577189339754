//! FindAll: paginated listing of a whole collection.

use tracing::debug;

use crate::client::Client;
use crate::error::Result;
use crate::query::{Page, Query};
use crate::schema::{Document, Schema};
use crate::store::ListRequest;

impl Client {
    /// Lists a collection page by page, fetching each record object.
    ///
    /// The listing runs under `{collection}/` with `/` as delimiter, so
    /// the index subtree folds away as a common prefix. Pagination
    /// threads the store's continuation token: pass a page's
    /// `next_token` back via [`Query::after`] for the next page.
    /// Soft-deleted records are filtered out in soft-delete mode.
    pub async fn find_all<T: Document>(&self, query: &Query) -> Result<Page<T>> {
        let schema = Schema::describe::<T>()?;
        let prefix = format!("{}/", schema.collection);

        let page = self
            .store
            .list_objects(ListRequest {
                prefix,
                delimiter: Some("/".to_string()),
                continuation_token: query.token.clone(),
                max_keys: Some(query.effective_limit()),
            })
            .await?;

        let mut items = Vec::with_capacity(page.keys.len());
        for key in &page.keys {
            if self.config.soft_deletes && self.is_soft_deleted(key).await? {
                continue;
            }
            match self.read_object(key).await {
                Ok(body) => items.push(serde_json::from_slice(&body)?),
                Err(err) if err.is_not_found() => {
                    debug!(key = %key, "object vanished during listing");
                }
                Err(err) => return Err(err),
            }
        }

        Ok(Page::new(items, page.next_token))
    }
}
