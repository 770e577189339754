//! Query descriptions for the find verbs.

use std::cmp::Ordering;

use crate::types::Scalar;

/// Page size used when a query does not set one.
pub const DEFAULT_LIMIT: usize = 100;

/// Comparison applied to decoded index values during a scan.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Filter {
    /// Exact match.
    #[default]
    Equals,
    /// Strictly greater than the query value.
    GreaterThan,
    /// Strictly less than the query value.
    LessThan,
    /// Strictly between the query value and `upper`, both exclusive.
    Between { upper: Scalar },
}

impl Filter {
    /// Evaluates the filter for one decoded index value. Values of a
    /// different kind than the query value never match.
    pub(crate) fn matches(&self, candidate: &Scalar, value: &Scalar) -> bool {
        match self {
            Self::Equals => candidate.compare(value) == Some(Ordering::Equal),
            Self::GreaterThan => candidate.compare(value) == Some(Ordering::Greater),
            Self::LessThan => candidate.compare(value) == Some(Ordering::Less),
            Self::Between { upper } => {
                candidate.compare(value) == Some(Ordering::Greater)
                    && candidate.compare(upper) == Some(Ordering::Less)
            }
        }
    }
}

/// A lookup against one indexed field.
///
/// ```ignore
/// // All users older than 20, two per page.
/// let query = Query::by("age", 20u32)
///     .filter(Filter::GreaterThan)
///     .limit(2);
/// let page: Page<User> = client.find_many(&query).await?;
/// ```
#[derive(Debug, Clone)]
pub struct Query {
    /// Serialization name of the targeted field, or `"id"` for direct
    /// record lookup in `find_one`.
    pub field: String,
    /// The comparison value.
    pub value: Scalar,
    /// Comparison applied during scans; `find_one` ignores it.
    pub filter: Filter,
    /// Page size; 0 means [`DEFAULT_LIMIT`].
    pub limit: usize,
    /// Resumption cursor from a previous page.
    pub token: Option<String>,
}

impl Query {
    /// A query matching `field == value`.
    pub fn by(field: impl Into<String>, value: impl Into<Scalar>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            filter: Filter::default(),
            limit: 0,
            token: None,
        }
    }

    /// A query with no field constraint, for `find_all`.
    #[must_use]
    pub fn all() -> Self {
        Self::by("", "")
    }

    /// Replaces the comparison filter.
    #[must_use]
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    /// Caps the number of records per page.
    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Resumes after a previous page's `next_token`.
    #[must_use]
    pub fn after(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub(crate) fn effective_limit(&self) -> usize {
        if self.limit == 0 {
            DEFAULT_LIMIT
        } else {
            self.limit
        }
    }
}

/// One page of find results.
#[derive(Debug, Clone)]
pub struct Page<T> {
    /// The matching records, at most `limit` of them.
    pub items: Vec<T>,
    /// Present when more matches remain; pass to [`Query::after`] to
    /// resume.
    pub next_token: Option<String>,
}

impl<T> Page<T> {
    pub(crate) fn new(items: Vec<T>, next_token: Option<String>) -> Self {
        Self { items, next_token }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equals_matches_same_kind_only() {
        assert!(Filter::Equals.matches(&Scalar::Uint(30), &Scalar::Uint(30)));
        assert!(!Filter::Equals.matches(&Scalar::Uint(30), &Scalar::Int(30)));
    }

    #[test]
    fn comparisons_are_strict() {
        let value = Scalar::Uint(20);
        assert!(Filter::GreaterThan.matches(&Scalar::Uint(30), &value));
        assert!(!Filter::GreaterThan.matches(&Scalar::Uint(20), &value));
        assert!(Filter::LessThan.matches(&Scalar::Uint(10), &value));
        assert!(!Filter::LessThan.matches(&Scalar::Uint(20), &value));
    }

    #[test]
    fn between_excludes_both_bounds() {
        let filter = Filter::Between {
            upper: Scalar::Uint(40),
        };
        let lower = Scalar::Uint(10);
        assert!(filter.matches(&Scalar::Uint(20), &lower));
        assert!(filter.matches(&Scalar::Uint(39), &lower));
        assert!(!filter.matches(&Scalar::Uint(10), &lower));
        assert!(!filter.matches(&Scalar::Uint(40), &lower));
    }

    #[test]
    fn zero_limit_falls_back_to_default() {
        assert_eq!(Query::by("age", 1u32).effective_limit(), DEFAULT_LIMIT);
        assert_eq!(Query::by("age", 1u32).limit(7).effective_limit(), 7);
    }
}
