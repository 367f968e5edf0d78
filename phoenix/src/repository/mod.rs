//! Repository bindings over the metadata resolver and connection cache.
//!
//! A repository ties a stored type to its configuration profile and
//! collection (or file bucket) name, resolved once from the type's markers,
//! and opens its database through a shared [`ConnectionManager`].
//!
//! ```rust,ignore
//! use phoenix::repository::Repository;
//! use phoenix_derive::{Comparable, Entity};
//!
//! #[derive(Entity, Comparable)]
//! #[entity(profile = "main", collection = "orders")]
//! pub struct Order {
//!     pub id: String,
//!     pub total: f64,
//! }
//!
//! let orders = Repository::<Order, _>::new(manager.clone())?;
//! let database = orders.database()?;
//! let audit = orders.changes(Some(&before), Some(&after));
//! ```
//!
//! [`ConnectionManager`]: crate::connection::ConnectionManager
mod file_repository;
mod repository;

pub use file_repository::*;
pub use repository::*;

use crate::connection::{ConnectionManager, DocumentDriver};
use crate::errors::{ErrorKind, PhoenixError, PhoenixResult};

pub(crate) fn require_name(
    name: Option<String>,
    marker: &str,
    type_name: &str,
) -> PhoenixResult<String> {
    match name {
        Some(name) => Ok(name),
        None => {
            log::error!("No {} name could be resolved for {}", marker, type_name);
            Err(PhoenixError::new(
                &format!("No {} name could be resolved for {}", marker, type_name),
                ErrorKind::MetadataNotFound,
            ))
        }
    }
}

pub(crate) fn require_non_blank(value: &str, marker: &str) -> PhoenixResult<String> {
    if value.trim().is_empty() {
        log::error!("{} name cannot be empty", marker);
        return Err(PhoenixError::new(
            &format!("{} name cannot be empty", marker),
            ErrorKind::ConfigurationError,
        ));
    }
    Ok(value.to_string())
}

pub(crate) fn require_profile<D: DocumentDriver>(
    manager: &ConnectionManager<D>,
    profile_name: &str,
) -> PhoenixResult<()> {
    if manager.profiles().contains(profile_name) {
        Ok(())
    } else {
        log::error!("Can't find connection profile for '{}'", profile_name);
        Err(PhoenixError::new(
            &format!("Can't find connection profile for '{}'", profile_name),
            ErrorKind::ProfileNotFound,
        ))
    }
}
