//! Document store over flat object storage.
//!
//! loam persists user-defined records in any store that offers a flat
//! key/value namespace with prefix listing, per-object tagging, and
//! byte-range reads, and builds collections, secondary indexes, soft
//! deletion, and pagination on top of those primitives.
//!
//! Records are JSON objects at `{collection}/{id}`. Each annotated
//! attribute maintains a family of empty index objects at
//! `{collection}/indexes/{kind}/{name}/{value}/{id}`; queries are prefix
//! scans over that subtree. Large bodies move through chunked parallel
//! I/O: byte-range reads and multipart uploads, one task per part.
//!
//! # Example
//!
//! ```ignore
//! use loam::{Attribute, Client, Config, Document, Managed, Query, ScalarKind};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct User {
//!     #[serde(flatten)]
//!     meta: Managed,
//!     email: String,
//!     age: u32,
//! }
//!
//! impl Document for User {
//!     fn type_name() -> &'static str { "User" }
//!     fn attributes() -> &'static [Attribute] {
//!         &[
//!             Attribute::new("email", "index,unique", ScalarKind::String),
//!             Attribute::new("age", "index,ranged", ScalarKind::Uint),
//!         ]
//!     }
//!     fn managed(&self) -> &Managed { &self.meta }
//!     fn managed_mut(&mut self) -> &mut Managed { &mut self.meta }
//!     fn attribute(&self, name: &str) -> Option<loam::Scalar> {
//!         match name {
//!             "email" => Some(self.email.as_str().into()),
//!             "age" => Some(self.age.into()),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! # async fn demo() -> loam::Result<()> {
//! let client = Client::memory(Config::new("records", "us-east-1"));
//! let mut user = User { meta: Managed::default(), email: "john@x.com".into(), age: 30 };
//! client.create(&mut user).await?;
//! let found: User = client.find_one(&Query::by("email", "john@x.com")).await?;
//! # Ok(())
//! # }
//! ```
//!
//! The store itself stays behind the [`ObjectStore`] trait;
//! [`MemoryObjectStore`] ships in-crate for tests and embedded use, and
//! adapters for remote stores implement the same capability set.

mod client;
mod config;
mod error;
mod index;
pub mod keys;
mod ops;
mod query;
mod schema;
pub mod store;
pub mod transfer;
mod types;

pub use client::Client;
pub use config::Config;
pub use error::{Error, Result};
pub use query::{Filter, Page, Query, DEFAULT_LIMIT};
pub use schema::{Attribute, Document, IndexField, IndexKind, Managed, Schema};
pub use store::{MemoryObjectStore, ObjectStore, StoreError};
pub use types::{IdError, ObjectId, Scalar, ScalarKind, Timestamp};
