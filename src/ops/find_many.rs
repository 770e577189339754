//! FindMany: comparison queries as prefix scans over one index subtree.

use tracing::debug;

use crate::client::Client;
use crate::error::{Error, Result};
use crate::keys;
use crate::query::{Filter, Page, Query};
use crate::schema::{Document, Schema};
use crate::store::ListRequest;
use crate::types::ObjectId;

impl Client {
    /// Returns the records whose value on the queried field satisfies
    /// the filter, up to `limit` per page.
    ///
    /// The scan walks the field's whole index subtree page by page,
    /// decoding each entry's value from its key and evaluating the
    /// filter on the typed value, so numeric and timestamp comparisons
    /// are numeric regardless of key ordering. When more matches remain
    /// past the page, `next_token` resumes the scan after the last
    /// delivered entry.
    ///
    /// Soft-deleted entries are filtered out in soft-delete mode. An
    /// index entry whose record object is missing is treated as not
    /// found and skipped.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownIndex`] when the field carries no index,
    /// [`Error::BadInput`] for id lookups (use [`Client::find_one`]) or
    /// a value kind not matching the index declaration.
    pub async fn find_many<T: Document>(&self, query: &Query) -> Result<Page<T>> {
        if query.field == "id" {
            return Err(Error::bad_input("cannot scan by id; use find_one"));
        }

        let schema = Schema::describe::<T>()?;
        let field = schema
            .index(&query.field)
            .ok_or_else(|| Error::UnknownIndex {
                field: query.field.clone(),
            })?;
        if query.value.kind() != field.scalar {
            return Err(Error::bad_input(format!(
                "index {} expects {} values, got {}",
                field.name,
                field.scalar,
                query.value.kind()
            )));
        }
        if let Filter::Between { upper } = &query.filter {
            if upper.kind() != field.scalar {
                return Err(Error::bad_input(format!(
                    "between bound for index {} must be {}",
                    field.name, field.scalar
                )));
            }
        }

        let limit = query.effective_limit();
        let prefix = keys::query_prefix(&schema.collection, field.kind, &field.name);
        let mut token = query.token.clone();
        let mut matches: Vec<(String, ObjectId)> = Vec::new();
        let mut next_token = None;

        'scan: loop {
            let page = self
                .store
                .list_objects(ListRequest {
                    prefix: prefix.clone(),
                    continuation_token: token.take(),
                    ..Default::default()
                })
                .await?;

            for key in page.keys {
                let (value, id) = keys::decode_index_key(&key, field.scalar)?;
                if !query.filter.matches(&value, &query.value) {
                    continue;
                }
                if self.config.soft_deletes && self.is_soft_deleted(&key).await? {
                    continue;
                }
                if matches.len() == limit {
                    // One extra match proves another page exists; resume
                    // strictly after the last delivered entry.
                    next_token = matches.last().map(|(key, _)| key.clone());
                    break 'scan;
                }
                matches.push((key, id));
            }

            match page.next_token {
                Some(more) => token = Some(more),
                None => break,
            }
        }

        debug!(
            collection = %schema.collection,
            index = %query.field,
            matched = matches.len(),
            "index scan complete"
        );

        let mut items = Vec::with_capacity(matches.len());
        for (_, id) in matches {
            let record_key = keys::record_key(&schema.collection, id);
            match self.read_object(&record_key).await {
                Ok(body) => items.push(serde_json::from_slice(&body)?),
                Err(err) if err.is_not_found() => {
                    // Stale index entry; the record never landed or was
                    // removed underneath it.
                    debug!(key = %record_key, "index entry without record");
                }
                Err(err) => return Err(err),
            }
        }

        Ok(Page::new(items, next_token))
    }
}
