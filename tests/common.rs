//! Shared fixtures for the integration suite.

#![allow(dead_code)]

use std::sync::{Arc, Once};

use loam::{
    Attribute, Client, Config, Document, Managed, MemoryObjectStore, ObjectStore, Scalar,
    ScalarKind,
};
use serde::{Deserialize, Serialize};

static INIT: Once = Once::new();

/// Routes engine logs through `RUST_LOG` once per test binary.
fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

/// The record type exercised across the suite: one shared, two unique,
/// and one ranged index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(flatten)]
    pub meta: Managed,
    pub first_name: String,
    pub email: String,
    pub phone: String,
    pub age: u32,
    /// Unindexed payload, inflatable to exercise the chunked I/O path.
    #[serde(default)]
    pub bio: String,
}

impl User {
    pub fn new(first_name: &str, email: &str, phone: &str, age: u32) -> Self {
        Self {
            meta: Managed::default(),
            first_name: first_name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            age,
            bio: String::new(),
        }
    }
}

impl Document for User {
    fn type_name() -> &'static str {
        "User"
    }

    fn attributes() -> &'static [Attribute] {
        const ATTRS: &[Attribute] = &[
            Attribute::new("first_name", "index", ScalarKind::String),
            Attribute::new("email", "index,unique", ScalarKind::String),
            Attribute::new("phone", "index,unique", ScalarKind::String),
            Attribute::new("age", "index,ranged", ScalarKind::Uint),
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
            "first_name" => Some(self.first_name.as_str().into()),
            "email" => Some(self.email.as_str().into()),
            "phone" => Some(self.phone.as_str().into()),
            "age" => Some(self.age.into()),
            _ => None,
        }
    }
}

/// A client over a fresh in-memory store, plus a handle to the store for
/// direct assertions on the key namespace.
pub fn harness(soft_deletes: bool) -> (Client, Arc<MemoryObjectStore>) {
    init_tracing();
    let store = Arc::new(MemoryObjectStore::new());
    let config = Config::new("loam-test", "us-east-1").with_soft_deletes(soft_deletes);
    let client = Client::new(store.clone() as Arc<dyn ObjectStore>, config);
    (client, store)
}

/// The index keys a user's current attribute values derive to.
pub fn index_keys(user: &User) -> Vec<String> {
    use loam::{keys, IndexKind};

    let id = user.meta.id;
    [
        (IndexKind::Shared, "first_name", user.first_name.clone()),
        (IndexKind::Unique, "email", user.email.clone()),
        (IndexKind::Unique, "phone", user.phone.clone()),
        (IndexKind::Ranged, "age", user.age.to_string()),
    ]
    .into_iter()
    .map(|(kind, name, value)| {
        let prefix = keys::index_prefix("users", kind, name, &value).unwrap();
        keys::index_key(&prefix, id)
    })
    .collect()
}

/// The record object key for a user.
pub fn record_key(user: &User) -> String {
    loam::keys::record_key("users", user.meta.id)
}
