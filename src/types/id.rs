//! Lexicographically sortable record identifiers.
//!
//! An [`ObjectId`] is a 128-bit ULID: a 48-bit millisecond timestamp
//! followed by 80 bits of cryptographic randomness. The canonical string
//! form is 26 characters of Crockford base32 and sorts in creation order.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use ulid::Ulid;

/// Errors produced when parsing an [`ObjectId`].
#[derive(Debug, thiserror::Error)]
pub enum IdError {
    /// The input was not a valid 26-character Crockford base32 string.
    #[error("invalid object id string")]
    InvalidString,

    /// The input byte slice was not exactly 16 bytes.
    #[error("invalid object id length: {len} bytes")]
    InvalidLength { len: usize },
}

/// Unique identifier assigned to a record on create.
///
/// Ids are immutable once assigned. The nil id (all zero bits) marks a
/// record that has never been stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ObjectId(Ulid);

impl ObjectId {
    /// Length of the canonical string form.
    pub const ENCODED_LEN: usize = 26;

    /// Length of the binary form.
    pub const BYTE_LEN: usize = 16;

    /// Generates a new id from the current wall clock and fresh randomness.
    #[must_use]
    pub fn generate() -> Self {
        Self(Ulid::new())
    }

    /// The all-zero id.
    #[must_use]
    pub const fn nil() -> Self {
        Self(Ulid::nil())
    }

    /// Returns true for the all-zero id.
    #[must_use]
    pub const fn is_nil(&self) -> bool {
        self.0.is_nil()
    }

    /// Millisecond timestamp component of the id.
    #[must_use]
    pub const fn timestamp_ms(&self) -> u64 {
        self.0.timestamp_ms()
    }

    /// Reconstructs an id from its binary form.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; Self::BYTE_LEN]) -> Self {
        Self(Ulid::from_bytes(bytes))
    }

    /// Binary form of the id.
    #[must_use]
    pub const fn to_bytes(&self) -> [u8; Self::BYTE_LEN] {
        self.0.to_bytes()
    }

    /// Reconstructs an id from a byte slice, checking the length.
    pub fn try_from_bytes(bytes: &[u8]) -> Result<Self, IdError> {
        let array: [u8; Self::BYTE_LEN] = bytes
            .try_into()
            .map_err(|_| IdError::InvalidLength { len: bytes.len() })?;
        Ok(Self::from_bytes(array))
    }

    /// Builds an id from an explicit timestamp and random component.
    #[must_use]
    pub const fn from_parts(timestamp_ms: u64, random: u128) -> Self {
        Self(Ulid::from_parts(timestamp_ms, random))
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::nil()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ObjectId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ulid::from_string(s)
            .map(Self)
            .map_err(|_| IdError::InvalidString)
    }
}

impl Serialize for ObjectId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        text.parse()
            .map_err(|_| serde::de::Error::custom("invalid object id string"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_roundtrip() {
        let id = ObjectId::generate();
        let text = id.to_string();
        assert_eq!(text.len(), ObjectId::ENCODED_LEN);
        assert_eq!(text.parse::<ObjectId>().unwrap(), id);
    }

    #[test]
    fn bytes_roundtrip() {
        let id = ObjectId::generate();
        assert_eq!(ObjectId::try_from_bytes(&id.to_bytes()).unwrap(), id);
    }

    #[test]
    fn rejects_bad_input() {
        assert!("not-an-id".parse::<ObjectId>().is_err());
        assert!(ObjectId::try_from_bytes(&[0u8; 7]).is_err());
    }

    #[test]
    fn string_order_follows_timestamp_order() {
        let a = ObjectId::from_parts(1_000, 42);
        let b = ObjectId::from_parts(2_000, 1);
        assert!(a < b);
        assert!(a.to_string() < b.to_string());
    }

    #[test]
    fn nil_is_recognized() {
        assert!(ObjectId::nil().is_nil());
        assert!(!ObjectId::generate().is_nil());
        assert_eq!(ObjectId::default(), ObjectId::nil());
    }

    #[test]
    fn serde_uses_canonical_string() {
        let id = ObjectId::generate();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
        let back: ObjectId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
