//! # Phoenix - Document Database Access Core
//!
//! Phoenix holds the type-driven plumbing shared by document-database
//! repositories: where a stored type lives, how the process connects to it,
//! and what changed between two versions of an object.
//!
//! ## Key Features
//!
//! - **Metadata resolution**: profile, collection and bucket names declared on
//!   a type and inherited through base types and generic type arguments
//! - **Connection cache**: one client and one database handle per profile id,
//!   built at most once even under concurrent first access
//! - **Structural diff**: leaf-level change lists with dotted property paths
//! - **Pluggable drivers**: the cache is generic over a [`connection::DocumentDriver`],
//!   with an in-process `MemoryDriver` for hosts and tests
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use phoenix::connection::{ConnectionManager, MemoryDriver};
//! use phoenix::repository::Repository;
//! use phoenix_derive::{Comparable, Entity};
//!
//! #[derive(Entity, Comparable)]
//! #[entity(profile = "main", collection = "customers")]
//! pub struct Customer {
//!     pub name: String,
//!     pub email: String,
//! }
//!
//! let manager = ConnectionManager::builder(MemoryDriver::new())
//!     .profiles_from_file("appsettings.json")
//!     .build()?;
//!
//! let customers = Repository::<Customer, _>::new(manager)?;
//! let database = customers.database()?;
//! ```
//!
//! ## Module Organization
//!
//! - [`common`] - Shared constants
//! - [`comparer`] - Structural comparison of object versions
//! - [`connection`] - Profiles, client settings, drivers and the connection cache
//! - [`errors`] - Error types and result definitions
//! - [`metadata`] - Marker declarations and name resolution
//! - [`repository`] - Repository bindings over the other modules

pub mod common;
pub mod comparer;
pub mod connection;
pub mod errors;
pub mod metadata;
pub mod repository;
