//! Key codec: the reversible mapping between index facts and object keys.
//!
//! Record objects live at `{collection}/{id}`. Index objects live at
//! `{collection}/indexes/{kind}/{name}/{value}/{id}` where the value
//! component is the canonical value string in url-safe base64. The
//! url-safe alphabet keeps `/` out of the value component, so the six
//! path segments stay unambiguous and value prefixes never bleed into
//! neighboring values.

use base64::engine::general_purpose::URL_SAFE as B64;
use base64::Engine as _;

use crate::error::{Error, Result};
use crate::schema::IndexKind;
use crate::types::{ObjectId, Scalar, ScalarKind};

/// Ceiling on the encoded value component of an index key, in bytes.
pub const MAX_ENCODED_VALUE: usize = 1024;

const INDEX_SEGMENT: &str = "indexes";

/// Key of a record object.
#[must_use]
pub fn record_key(collection: &str, id: ObjectId) -> String {
    format!("{collection}/{id}")
}

/// Key prefix covering one value of one index. Fails with
/// [`Error::ValueTooLong`] when the encoded value exceeds the ceiling.
pub fn index_prefix(
    collection: &str,
    kind: IndexKind,
    name: &str,
    value: &str,
) -> Result<String> {
    let encoded = B64.encode(value);
    if encoded.len() > MAX_ENCODED_VALUE {
        return Err(Error::ValueTooLong {
            index: name.to_string(),
            len: encoded.len(),
        });
    }
    Ok(format!(
        "{collection}/{INDEX_SEGMENT}/{kind}/{name}/{encoded}"
    ))
}

/// Key of one index object under a value prefix.
#[must_use]
pub fn index_key(prefix: &str, id: ObjectId) -> String {
    format!("{prefix}/{id}")
}

/// Key prefix covering every value of one index; the scan root for
/// comparison queries.
#[must_use]
pub fn query_prefix(collection: &str, kind: IndexKind, name: &str) -> String {
    format!("{collection}/{INDEX_SEGMENT}/{kind}/{name}/")
}

/// Decodes an index object key back into its typed value and record id.
pub fn decode_index_key(key: &str, kind: ScalarKind) -> Result<(Scalar, ObjectId)> {
    let segments: Vec<&str> = key.split('/').collect();
    let [_, marker, _, _, encoded, id] = segments[..] else {
        return Err(Error::decode(format!(
            "expected 6 path segments, got {} in {key}",
            segments.len()
        )));
    };
    if marker != INDEX_SEGMENT {
        return Err(Error::decode(format!("not an index key: {key}")));
    }

    let raw = B64
        .decode(encoded)
        .map_err(|err| Error::decode(format!("bad base64 in {key}: {err}")))?;
    let text = String::from_utf8(raw)
        .map_err(|_| Error::decode(format!("value in {key} is not utf-8")))?;
    let value = kind
        .parse(&text)
        .ok_or_else(|| Error::decode(format!("value {text:?} does not parse as {kind}")))?;
    let id = id
        .parse()
        .map_err(|_| Error::decode(format!("bad record id in {key}")))?;

    Ok((value, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Timestamp;

    #[test]
    fn record_keys_are_flat() {
        let id = ObjectId::generate();
        assert_eq!(record_key("users", id), format!("users/{id}"));
    }

    #[test]
    fn encode_decode_roundtrips_every_kind() {
        let id = ObjectId::generate();
        let values = [
            Scalar::Int(-7),
            Scalar::Uint(30),
            Scalar::Float(2.5),
            Scalar::String("john@x.com".into()),
            Scalar::Timestamp(Timestamp::from_unix(1_700_000_000).unwrap()),
        ];
        for value in values {
            let prefix =
                index_prefix("users", IndexKind::Ranged, "field", &value.key_string()).unwrap();
            let key = index_key(&prefix, id);
            let (decoded, decoded_id) = decode_index_key(&key, value.kind()).unwrap();
            assert_eq!(decoded, value);
            assert_eq!(decoded_id, id);
        }
    }

    #[test]
    fn prefix_layout_matches_the_namespace() {
        let prefix = index_prefix("users", IndexKind::Unique, "email", "john@x.com").unwrap();
        assert!(prefix.starts_with("users/indexes/unique/email/"));
        assert!(query_prefix("users", IndexKind::Unique, "email")
            .strip_suffix('/')
            .is_some_and(|root| prefix.starts_with(root)));
    }

    #[test]
    fn value_component_never_contains_a_slash() {
        // '/' sits in the standard base64 alphabet; the url-safe alphabet
        // keeps the segment count stable for arbitrary values.
        let prefix = index_prefix("users", IndexKind::Shared, "bio", "a/b?c>d").unwrap();
        assert_eq!(prefix.matches('/').count(), 4);
    }

    #[test]
    fn oversized_values_are_rejected() {
        let value = "x".repeat(MAX_ENCODED_VALUE);
        let err = index_prefix("users", IndexKind::Unique, "email", &value).unwrap_err();
        assert!(matches!(err, Error::ValueTooLong { index, .. } if index == "email"));
    }

    #[test]
    fn decode_rejects_malformed_keys() {
        let id = ObjectId::generate();
        assert!(decode_index_key("users/abc", ScalarKind::String).is_err());
        assert!(decode_index_key(
            &format!("users/indexes/unique/email/!!!not-base64!!!/{id}"),
            ScalarKind::String
        )
        .is_err());
        let prefix = index_prefix("users", IndexKind::Ranged, "age", "not-a-number").unwrap();
        assert!(decode_index_key(&index_key(&prefix, id), ScalarKind::Uint).is_err());
        let prefix = index_prefix("users", IndexKind::Unique, "email", "a@b").unwrap();
        assert!(decode_index_key(&format!("{prefix}/not-an-id"), ScalarKind::String).is_err());
    }
}
