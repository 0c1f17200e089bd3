//! HAL (Hypertext Application Language) envelopes for serde.
//!
//! Wraps any serializable record in an envelope that injects the reserved
//! `_links` and `_embedded` fields into its JSON form, without the record's
//! type carrying any hypermedia fields itself. A [`Registry`] maps concrete
//! record types to link generator functions and holds CURIE (Compact URI)
//! definitions; the encoder splices the record's serialized bytes together
//! with the metadata's bytes instead of re-parsing the record.
//!
//! ```
//! use hal_json::{Link, Registry};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct User {
//!     id: u64,
//!     name: String,
//! }
//!
//! let registry = Registry::new();
//! registry.register(|_ctx: &(), user: &User| {
//!     vec![Link::new("self", format!("/users/{}", user.id))]
//! });
//!
//! let user = User { id: 101, name: "Alice".into() };
//! let envelope = registry.wrap(&(), &user)?;
//! assert_eq!(
//!     envelope.to_json()?,
//!     r#"{"id":101,"name":"Alice","_links":{"self":{"href":"/users/101"}}}"#
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Registries are explicit values, safe for concurrent use; register
//! generators at service initialization and share the registry across
//! request handlers. [`Registry::strict`] turns silent omission of
//! hypermedia metadata into typed errors during development.

mod collection;
mod encoder;
mod envelope;
mod error;
mod link;
mod registry;
mod shape;

pub use collection::CollectionPage;
pub use envelope::Envelope;
pub use error::{EncodeError, WrapError};
pub use link::{Link, LinkMap, LinkValue};
pub use registry::{Registry, TypeKey};
