//! Wall-clock timestamps with second precision.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A wall-clock instant, truncated to whole seconds.
///
/// The JSON form is an integer of unix seconds; the key form is the same
/// integer as decimal digits, so lexicographic comparison of encoded keys
/// matches numeric comparison for non-negative times. Instants before the
/// epoch encode with a leading minus sign and do not sort correctly in
/// key form.
///
/// The zero instant (the epoch) is called *nil* and marks an unset slot,
/// most importantly a live record's `deleted_at`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// The current wall clock, truncated to seconds.
    #[must_use]
    pub fn now() -> Self {
        Self::from_unix(Utc::now().timestamp()).unwrap_or_else(Self::nil)
    }

    /// The zero instant.
    #[must_use]
    pub fn nil() -> Self {
        Self(DateTime::UNIX_EPOCH)
    }

    /// Returns true for the zero instant.
    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.timestamp() == 0
    }

    /// Builds a timestamp from unix seconds. Returns `None` when the
    /// value is outside the representable range.
    #[must_use]
    pub fn from_unix(secs: i64) -> Option<Self> {
        DateTime::from_timestamp(secs, 0).map(Self)
    }

    /// Unix seconds since the epoch.
    #[must_use]
    pub fn unix(&self) -> i64 {
        self.0.timestamp()
    }

    /// Canonical form used inside index keys and object tags.
    #[must_use]
    pub fn key_string(&self) -> String {
        self.unix().to_string()
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::nil()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self::from_unix(value.timestamp()).unwrap_or_else(Self::nil)
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(self.unix())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = i64::deserialize(deserializer)?;
        Self::from_unix(secs)
            .ok_or_else(|| serde::de::Error::custom("timestamp out of range"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nil_is_the_epoch() {
        assert!(Timestamp::nil().is_nil());
        assert_eq!(Timestamp::nil().unix(), 0);
        assert_eq!(Timestamp::default(), Timestamp::nil());
    }

    #[test]
    fn now_is_not_nil() {
        assert!(!Timestamp::now().is_nil());
    }

    #[test]
    fn unix_roundtrip() {
        let ts = Timestamp::from_unix(1_700_000_000).unwrap();
        assert_eq!(ts.unix(), 1_700_000_000);
        assert_eq!(ts.key_string(), "1700000000");
    }

    #[test]
    fn serde_uses_integer_seconds() {
        let ts = Timestamp::from_unix(1_700_000_000).unwrap();
        let json = serde_json::to_string(&ts).unwrap();
        assert_eq!(json, "1700000000");
        let back: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ts);
    }

    #[test]
    fn key_form_sorts_numerically_for_nonnegative_times() {
        let early = Timestamp::from_unix(999).unwrap();
        let late = Timestamp::from_unix(1_000).unwrap();
        assert!(early < late);
        // Equal digit counts compare correctly; callers padding keys is
        // unnecessary because unix seconds stay 10 digits until year 2286.
        let a = Timestamp::from_unix(1_700_000_001).unwrap();
        let b = Timestamp::from_unix(1_700_000_002).unwrap();
        assert!(a.key_string() < b.key_string());
    }
}
