//! The record contract and the managed attribute block.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::types::{ObjectId, Scalar, ScalarKind, Timestamp};

/// One declared user attribute: its serialization name, its storage-role
/// annotation set, and its declared scalar category.
///
/// Annotations are a comma-separated set drawn from `id`, `created_at`,
/// `updated_at`, `deleted_at`, `index`, `unique`, `ranged`. Order,
/// duplicates, and whitespace are ignored; unknown tokens are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribute {
    /// Serialization name, as it appears in the JSON body.
    pub name: &'static str,
    /// Storage-role annotation set.
    pub tags: &'static str,
    /// Declared scalar category of the attribute's value.
    pub kind: ScalarKind,
}

impl Attribute {
    /// Declares an attribute.
    #[must_use]
    pub const fn new(name: &'static str, tags: &'static str, kind: ScalarKind) -> Self {
        Self { name, tags, kind }
    }
}

/// The managed attribute block every record embeds.
///
/// Flatten it into the record so the managed attributes serialize beside
/// the user attributes:
///
/// ```ignore
/// #[derive(Serialize, Deserialize)]
/// struct User {
///     #[serde(flatten)]
///     meta: Managed,
///     email: String,
/// }
/// ```
///
/// The engine owns these four slots: `id` is assigned once on create and
/// never changes; `created_at`/`updated_at` track the write lifecycle;
/// `deleted_at` is nil while the record is live.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Managed {
    pub id: ObjectId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Timestamp,
}

impl Managed {
    /// Stamps the block for a freshly created record: new id, both write
    /// timestamps set to now, deletion cleared.
    pub fn touch_create(&mut self) {
        let now = Timestamp::now();
        self.id = ObjectId::generate();
        self.created_at = now;
        self.updated_at = now;
        self.deleted_at = Timestamp::nil();
    }

    /// Overwrites `updated_at` with the current wall clock.
    pub fn touch_update(&mut self) {
        self.updated_at = Timestamp::now();
    }

    /// Records the deletion instant.
    pub fn mark_deleted(&mut self, at: Timestamp) {
        self.deleted_at = at;
    }

    /// Clears the deletion instant, restoring the record to live.
    pub fn clear_deleted(&mut self) {
        self.deleted_at = Timestamp::nil();
    }
}

/// A storable record type.
///
/// Implementations describe their attributes once (`attributes`), expose
/// the embedded [`Managed`] block, and answer value lookups by
/// serialization name. The engine derives everything else: the collection
/// name from `type_name`, the index family from the annotations, and the
/// JSON body from the serde implementation.
pub trait Document: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// The record type's name, used to derive the collection name.
    fn type_name() -> &'static str;

    /// Declared user attributes with their annotation sets.
    fn attributes() -> &'static [Attribute];

    /// The embedded managed block.
    fn managed(&self) -> &Managed;

    /// Mutable access to the managed block; used only by the engine.
    fn managed_mut(&mut self) -> &mut Managed;

    /// Current value of a declared attribute, by serialization name.
    /// `None` for undeclared names.
    fn attribute(&self, name: &str) -> Option<Scalar>;
}
