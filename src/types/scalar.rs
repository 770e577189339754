//! Typed index values and their canonical string forms.

use std::cmp::Ordering;
use std::fmt;

use super::Timestamp;

/// The scalar categories an indexed attribute may declare.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// Signed integer. Negative values do not sort lexicographically in
    /// key form; ranged comparisons decode before comparing.
    Int,
    /// Unsigned integer.
    Uint,
    /// Floating point. Key form is the shortest roundtrip decimal;
    /// ordering is always evaluated on the decoded value.
    Float,
    /// UTF-8 string.
    String,
    /// Unix-second timestamp.
    Timestamp,
}

impl ScalarKind {
    /// Parses a canonical value string back into a typed scalar.
    #[must_use]
    pub fn parse(&self, text: &str) -> Option<Scalar> {
        match self {
            Self::Int => text.parse().ok().map(Scalar::Int),
            Self::Uint => text.parse().ok().map(Scalar::Uint),
            Self::Float => text.parse().ok().map(Scalar::Float),
            Self::String => Some(Scalar::String(text.to_string())),
            Self::Timestamp => {
                let secs: i64 = text.parse().ok()?;
                Timestamp::from_unix(secs).map(Scalar::Timestamp)
            }
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Int => "int",
            Self::Uint => "uint",
            Self::Float => "float",
            Self::String => "string",
            Self::Timestamp => "timestamp",
        };
        f.write_str(name)
    }
}

/// A typed attribute value, as carried by index descriptors and queries.
#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
    Int(i64),
    Uint(u64),
    Float(f64),
    String(String),
    Timestamp(Timestamp),
}

impl Scalar {
    /// The category this value belongs to.
    #[must_use]
    pub fn kind(&self) -> ScalarKind {
        match self {
            Self::Int(_) => ScalarKind::Int,
            Self::Uint(_) => ScalarKind::Uint,
            Self::Float(_) => ScalarKind::Float,
            Self::String(_) => ScalarKind::String,
            Self::Timestamp(_) => ScalarKind::Timestamp,
        }
    }

    /// Canonical string form used inside index keys.
    #[must_use]
    pub fn key_string(&self) -> String {
        match self {
            Self::Int(v) => v.to_string(),
            Self::Uint(v) => v.to_string(),
            Self::Float(v) => v.to_string(),
            Self::String(v) => v.clone(),
            Self::Timestamp(v) => v.key_string(),
        }
    }

    /// Compares two values of the same kind. Returns `None` for
    /// mismatched kinds or incomparable floats.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            (Self::Uint(a), Self::Uint(b)) => Some(a.cmp(b)),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(b),
            (Self::String(a), Self::String(b)) => Some(a.cmp(b)),
            (Self::Timestamp(a), Self::Timestamp(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key_string())
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Self::Int(v.into())
    }
}

impl From<u64> for Scalar {
    fn from(v: u64) -> Self {
        Self::Uint(v)
    }
}

impl From<u32> for Scalar {
    fn from(v: u32) -> Self {
        Self::Uint(v.into())
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<Timestamp> for Scalar {
    fn from(v: Timestamp) -> Self {
        Self::Timestamp(v)
    }
}
