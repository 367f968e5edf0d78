//! Metadata resolution for stored types.
//!
//! Stored types carry up to three markers: a configuration profile, a
//! collection name and a file bucket name. Markers are inherited from base
//! types and, for generic types, from type arguments. Resolution walks the
//! type's lineage and returns the first marker it meets.
//!
//! Resolution never fails. An unresolved name is `None`, and it is up to the
//! caller (see [`crate::repository`]) to turn that into an error.
//!
//! ```rust,ignore
//! use phoenix::metadata::{resolve_collection_name, resolve_profile_name};
//! use phoenix_derive::Entity;
//!
//! #[derive(Entity)]
//! #[entity(profile = "main", bucket = "attachments")]
//! pub struct Attachment;
//!
//! assert_eq!(resolve_profile_name::<Attachment>().as_deref(), Some("main"));
//! assert_eq!(resolve_collection_name::<Attachment>().as_deref(), Some("attachments.files"));
//! ```

mod entity;
mod entity_type;

pub use entity::*;
pub use entity_type::*;
