//! Connection cache for document database drivers.
//!
//! A host application supplies a [`DatabaseProfiles`] mapping (usually read
//! from its settings file) and a [`DocumentDriver`]. The
//! [`ConnectionManager`] turns a profile into [`ClientSettings`], asks the
//! driver for a client once per profile id, and memoizes the database handle
//! pinned to the profile's database name.
//!
//! ```rust
//! use phoenix::connection::{ConnectionManager, MemoryDriver};
//!
//! let manager = ConnectionManager::builder(MemoryDriver::new())
//!     .profiles_from_json(r#"{
//!         "DatabaseSettings": {
//!             "main": { "Database": "shop", "Servers": [{ "Address": "localhost", "Port": 27017 }] }
//!         }
//!     }"#)
//!     .build()
//!     .unwrap();
//!
//! let database = manager.get_database_by_id("main").unwrap();
//! assert_eq!(database.name(), "shop");
//! assert!(manager.get_database_by_id("missing-id").is_err());
//! ```

mod driver;
mod manager;
mod memory;
mod profile;
mod settings;

pub use driver::*;
pub use manager::*;
pub use memory::*;
pub use profile::*;
pub use settings::*;
