//! FindOne: fetch exactly one record by id or by a unique index value.

use crate::client::Client;
use crate::error::{Error, Result};
use crate::keys;
use crate::query::Query;
use crate::schema::{Document, IndexKind, Schema};
use crate::store::ListRequest;
use crate::types::{ObjectId, Scalar};

impl Client {
    /// Fetches the single record matching the query.
    ///
    /// With `field == "id"` the record object is fetched directly.
    /// Otherwise the field must carry a unique index: its value prefix
    /// is listed, the single entry's id suffix resolves the record.
    ///
    /// In soft-delete mode the record's tags are checked first and a
    /// `DeletedAt` tag reads as absent.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] for no match (or a soft-deleted one),
    /// [`Error::AmbiguousIndex`] when a unique prefix holds several
    /// entries, [`Error::UnknownIndex`] when the field has no unique
    /// index.
    pub async fn find_one<T: Document>(&self, query: &Query) -> Result<T> {
        let schema = Schema::describe::<T>()?;

        let key = if query.field == "id" {
            let id = parse_id(&query.value)?;
            keys::record_key(&schema.collection, id)
        } else {
            let field = schema
                .index(&query.field)
                .filter(|field| field.kind == IndexKind::Unique)
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

            let prefix = keys::index_prefix(
                &schema.collection,
                IndexKind::Unique,
                &query.field,
                &query.value.key_string(),
            )?;
            let page = self
                .store
                .list_objects(ListRequest {
                    prefix: format!("{prefix}/"),
                    max_keys: Some(2),
                    ..Default::default()
                })
                .await?;

            match page.keys.len() {
                0 => return Err(Error::not_found(prefix)),
                1 => {}
                _ => {
                    return Err(Error::AmbiguousIndex {
                        index: query.field.clone(),
                        value: query.value.key_string(),
                    })
                }
            }
            let (_, id) = keys::decode_index_key(&page.keys[0], field.scalar)?;
            keys::record_key(&schema.collection, id)
        };

        if self.config.soft_deletes && self.is_soft_deleted(&key).await? {
            return Err(Error::not_found(key));
        }

        let body = self.read_object(&key).await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

fn parse_id(value: &Scalar) -> Result<ObjectId> {
    let Scalar::String(text) = value else {
        return Err(Error::bad_input("id lookups take the canonical id string"));
    };
    text.parse()
        .map_err(|_| Error::bad_input(format!("invalid id: {text}")))
}
