//! Schema cache: per-call reflection of a record type into collection
//! name, managed slots, and index descriptors.

mod document;
mod naming;

use std::collections::HashSet;
use std::fmt;

use tracing::debug;

pub use document::{Attribute, Document, Managed};

use crate::error::{Error, Result};
use crate::types::ScalarKind;

/// How an index treats multiple records per value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexKind {
    /// At most one live record per value.
    Unique,
    /// Many records per value.
    Shared,
    /// Many records per value, ordered for comparison queries.
    Ranged,
}

impl IndexKind {
    /// Path segment used in index object keys.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unique => "unique",
            Self::Shared => "shared",
            Self::Ranged => "ranged",
        }
    }
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One index descriptor derived from an annotated attribute.
#[derive(Debug, Clone)]
pub struct IndexField {
    /// Serialization name of the attribute.
    pub name: String,
    /// Index kind from the annotation set.
    pub kind: IndexKind,
    /// Declared scalar category.
    pub scalar: ScalarKind,
    /// Canonical string of the in-memory value; empty when the schema was
    /// built without a record instance.
    pub value: String,
    /// Canonical string of the stored value when it differs from
    /// `value`; absent while unchanged.
    pub previous: Option<String>,
}

impl IndexField {
    /// True once an update comparison found the stored value differing.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.previous.is_some()
    }
}

/// The reflected shape of a record type, built once per operation.
#[derive(Debug, Clone)]
pub struct Schema {
    /// Derived collection name.
    pub collection: String,
    /// Index descriptors in declaration order.
    pub indexes: Vec<IndexField>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Role {
    Id,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(Debug, Default)]
struct TagValues {
    index: bool,
    unique: bool,
    ranged: bool,
    role: Option<Role>,
}

fn parse_tags(tags: &str) -> TagValues {
    let mut parsed = TagValues::default();
    for token in tags.split(',') {
        match token.trim() {
            "index" => parsed.index = true,
            "unique" => parsed.unique = true,
            "ranged" => parsed.ranged = true,
            "id" => parsed.role = Some(Role::Id),
            "created_at" => parsed.role = Some(Role::CreatedAt),
            "updated_at" => parsed.role = Some(Role::UpdatedAt),
            "deleted_at" => parsed.role = Some(Role::DeletedAt),
            // Unknown annotations are ignored.
            _ => {}
        }
    }
    parsed
}

impl Schema {
    /// Reflects a record type without values; used by read paths that
    /// only need the collection name and index declarations.
    pub fn describe<T: Document>() -> Result<Self> {
        Self::build::<T>(None)
    }

    /// Reflects a record instance, stringifying the current value of
    /// every indexed attribute; used by write paths.
    pub fn of<T: Document>(record: &T) -> Result<Self> {
        Self::build::<T>(Some(record))
    }

    fn build<T: Document>(record: Option<&T>) -> Result<Self> {
        let collection = naming::collection_name(T::type_name());
        debug!(
            type_name = T::type_name(),
            collection = %collection,
            "derived collection"
        );

        let mut indexes = Vec::new();
        let mut seen_names: HashSet<&str> = HashSet::new();
        let mut seen_roles: HashSet<Role> = HashSet::new();

        for attr in T::attributes() {
            let tags = parse_tags(attr.tags);

            if let Some(role) = tags.role {
                if tags.index {
                    return Err(Error::bad_schema(format!(
                        "attribute {} carries both a managed role and an index annotation",
                        attr.name
                    )));
                }
                if !seen_roles.insert(role) {
                    return Err(Error::bad_schema(format!(
                        "managed role declared twice, second time on {}",
                        attr.name
                    )));
                }
                let expected = match role {
                    Role::Id => ScalarKind::String,
                    Role::CreatedAt | Role::UpdatedAt | Role::DeletedAt => ScalarKind::Timestamp,
                };
                if attr.kind != expected {
                    return Err(Error::bad_schema(format!(
                        "managed attribute {} must be declared as {expected}",
                        attr.name
                    )));
                }
                continue;
            }

            if !tags.index {
                // `unique`/`ranged` without `index` are inert.
                continue;
            }
            if tags.unique && tags.ranged {
                return Err(Error::bad_schema(format!(
                    "index {} cannot be both unique and ranged",
                    attr.name
                )));
            }
            if !seen_names.insert(attr.name) {
                return Err(Error::bad_schema(format!(
                    "index {} declared twice",
                    attr.name
                )));
            }

            let kind = if tags.unique {
                IndexKind::Unique
            } else if tags.ranged {
                IndexKind::Ranged
            } else {
                IndexKind::Shared
            };

            let value = match record {
                None => String::new(),
                Some(record) => {
                    let value = record.attribute(attr.name).ok_or_else(|| {
                        Error::bad_schema(format!(
                            "indexed attribute {} is not readable",
                            attr.name
                        ))
                    })?;
                    if value.kind() != attr.kind {
                        return Err(Error::bad_schema(format!(
                            "indexed attribute {} is declared {} but holds {}",
                            attr.name,
                            attr.kind,
                            value.kind()
                        )));
                    }
                    value.key_string()
                }
            };

            indexes.push(IndexField {
                name: attr.name.to_string(),
                kind,
                scalar: attr.kind,
                value,
                previous: None,
            });
        }

        Ok(Self {
            collection,
            indexes,
        })
    }

    /// Looks up the index descriptor for a field name.
    #[must_use]
    pub fn index(&self, field: &str) -> Option<&IndexField> {
        self.indexes.iter().find(|index| index.name == field)
    }

    /// Compares every index descriptor against the stored record,
    /// filling `previous` for those whose value changed. Returns whether
    /// anything changed.
    pub fn compare_index_fields<T: Document>(&mut self, stored: &T) -> bool {
        let mut changed = false;
        for field in &mut self.indexes {
            let stored_value = stored
                .attribute(&field.name)
                .map(|value| value.key_string())
                .unwrap_or_default();
            if stored_value != field.value {
                field.previous = Some(stored_value);
                changed = true;
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::*;
    use crate::types::Scalar;

    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    struct Gadget {
        #[serde(flatten)]
        meta: Managed,
        serial: String,
        owner: String,
        weight: u64,
    }

    impl Document for Gadget {
        fn type_name() -> &'static str {
            "Gadget"
        }

        fn attributes() -> &'static [Attribute] {
            const ATTRS: &[Attribute] = &[
                Attribute::new("serial", "index,unique", ScalarKind::String),
                Attribute::new("owner", "index", ScalarKind::String),
                Attribute::new("weight", "ranged, index", ScalarKind::Uint),
            ];
            ATTRS
        }

        fn managed(&self) -> &Managed {
            &self.meta
        }

        fn managed_mut(&mut self) -> &mut Managed {
            &mut self.meta
        }

        fn attribute(&self, name: &str) -> Option<Scalar> {
            match name {
                "serial" => Some(self.serial.as_str().into()),
                "owner" => Some(self.owner.as_str().into()),
                "weight" => Some(self.weight.into()),
                _ => None,
            }
        }
    }

    #[test]
    fn reflects_collection_and_indexes() {
        let gadget = Gadget {
            serial: "g-001".into(),
            owner: "ada".into(),
            weight: 12,
            ..Default::default()
        };
        let schema = Schema::of(&gadget).unwrap();

        assert_eq!(schema.collection, "gadgets");
        assert_eq!(schema.indexes.len(), 3);

        let serial = schema.index("serial").unwrap();
        assert_eq!(serial.kind, IndexKind::Unique);
        assert_eq!(serial.value, "g-001");

        let owner = schema.index("owner").unwrap();
        assert_eq!(owner.kind, IndexKind::Shared);

        // Whitespace and token order in the annotation set are irrelevant.
        let weight = schema.index("weight").unwrap();
        assert_eq!(weight.kind, IndexKind::Ranged);
        assert_eq!(weight.scalar, ScalarKind::Uint);
        assert_eq!(weight.value, "12");
    }

    #[test]
    fn describe_leaves_values_empty() {
        let schema = Schema::describe::<Gadget>().unwrap();
        assert!(schema.indexes.iter().all(|index| index.value.is_empty()));
    }

    #[test]
    fn compare_fills_previous_on_change() {
        let stored = Gadget {
            serial: "g-001".into(),
            owner: "ada".into(),
            weight: 12,
            ..Default::default()
        };
        let mut modified = stored.clone();
        modified.owner = "grace".into();

        let mut schema = Schema::of(&modified).unwrap();
        assert!(schema.compare_index_fields(&stored));

        let owner = schema.index("owner").unwrap();
        assert!(owner.changed());
        assert_eq!(owner.previous.as_deref(), Some("ada"));
        assert!(!schema.index("serial").unwrap().changed());
        assert!(!schema.index("weight").unwrap().changed());
    }

    #[test]
    fn compare_detects_change_from_empty_value() {
        let stored = Gadget {
            serial: "g-001".into(),
            owner: String::new(),
            weight: 12,
            ..Default::default()
        };
        let mut modified = stored.clone();
        modified.owner = "grace".into();

        let mut schema = Schema::of(&modified).unwrap();
        assert!(schema.compare_index_fields(&stored));

        let owner = schema.index("owner").unwrap();
        assert!(owner.changed());
        assert_eq!(owner.previous.as_deref(), Some(""));
    }

    #[test]
    fn compare_reports_no_change_for_identical_records() {
        let stored = Gadget {
            serial: "g-001".into(),
            owner: "ada".into(),
            weight: 12,
            ..Default::default()
        };
        let mut schema = Schema::of(&stored).unwrap();
        assert!(!schema.compare_index_fields(&stored.clone()));
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Contradictory {
        #[serde(flatten)]
        meta: Managed,
        code: String,
    }

    impl Document for Contradictory {
        fn type_name() -> &'static str {
            "Contradictory"
        }

        fn attributes() -> &'static [Attribute] {
            const ATTRS: &[Attribute] =
                &[Attribute::new("code", "index,unique,ranged", ScalarKind::String)];
            ATTRS
        }

        fn managed(&self) -> &Managed {
            &self.meta
        }

        fn managed_mut(&mut self) -> &mut Managed {
            &mut self.meta
        }

        fn attribute(&self, name: &str) -> Option<Scalar> {
            (name == "code").then(|| self.code.as_str().into())
        }
    }

    #[test]
    fn unique_and_ranged_together_is_rejected() {
        let err = Schema::describe::<Contradictory>().unwrap_err();
        assert!(matches!(err, Error::BadSchema { .. }));
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Unreadable {
        #[serde(flatten)]
        meta: Managed,
    }

    impl Document for Unreadable {
        fn type_name() -> &'static str {
            "Unreadable"
        }

        fn attributes() -> &'static [Attribute] {
            const ATTRS: &[Attribute] = &[Attribute::new("ghost", "index", ScalarKind::String)];
            ATTRS
        }

        fn managed(&self) -> &Managed {
            &self.meta
        }

        fn managed_mut(&mut self) -> &mut Managed {
            &mut self.meta
        }

        fn attribute(&self, _name: &str) -> Option<Scalar> {
            None
        }
    }

    #[test]
    fn unreadable_indexed_attribute_is_rejected() {
        let err = Schema::of(&Unreadable::default()).unwrap_err();
        assert!(matches!(err, Error::BadSchema { .. }));
        // Without an instance there is no value to read, so describe passes.
        assert!(Schema::describe::<Unreadable>().is_ok());
    }

    #[test]
    fn unknown_annotations_are_ignored() {
        let parsed = parse_tags("index, sparkly , unique");
        assert!(parsed.index && parsed.unique && !parsed.ranged);
    }
}
