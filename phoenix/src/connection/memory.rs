//! In-process driver producing inert handles.
//!
//! Useful for hosts and tests that need the connection plumbing without a
//! running server. Handles remember the settings and names they were created
//! with.

use crate::connection::{ClientSettings, DocumentClient, DocumentDriver};
use crate::errors::{ErrorKind, PhoenixError, PhoenixResult};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Driver that creates [`MemoryClient`]s and counts how many it created.
#[derive(Clone, Default)]
pub struct MemoryDriver {
    connections: Arc<AtomicUsize>,
}

impl MemoryDriver {
    pub fn new() -> Self {
        MemoryDriver::default()
    }

    /// Number of clients created so far.
    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

impl DocumentDriver for MemoryDriver {
    type Client = MemoryClient;

    fn connect(&self, settings: &ClientSettings) -> PhoenixResult<MemoryClient> {
        let sequence = self.connections.fetch_add(1, Ordering::SeqCst) + 1;
        log::debug!("Memory driver opened client #{} with {}", sequence, settings);
        Ok(MemoryClient {
            sequence,
            settings: settings.clone(),
        })
    }
}

#[derive(Debug)]
pub struct MemoryClient {
    sequence: usize,
    settings: ClientSettings,
}

impl MemoryClient {
    /// Creation order of this client within its driver, starting at 1.
    pub fn sequence(&self) -> usize {
        self.sequence
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }
}

impl DocumentClient for MemoryClient {
    type Database = MemoryDatabase;

    fn database(&self, name: &str) -> PhoenixResult<MemoryDatabase> {
        if name.trim().is_empty() {
            return Err(PhoenixError::new(
                "Database name cannot be empty",
                ErrorKind::DriverError,
            ));
        }

        Ok(MemoryDatabase {
            name: name.to_string(),
            client_sequence: self.sequence,
            settings: self.settings.clone(),
        })
    }
}

#[derive(Debug)]
pub struct MemoryDatabase {
    name: String,
    client_sequence: usize,
    settings: ClientSettings,
}

impl MemoryDatabase {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sequence of the client this handle was opened from.
    pub fn client_sequence(&self) -> usize {
        self.client_sequence
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::DatabaseProfile;

    fn settings() -> ClientSettings {
        let profile = DatabaseProfile::new("main", "shop").with_server("localhost", 27017);
        ClientSettings::from_profile(&profile).unwrap()
    }

    #[test]
    fn counts_connections() {
        let driver = MemoryDriver::new();
        let first = driver.connect(&settings()).unwrap();
        let second = driver.clone().connect(&settings()).unwrap();
        assert_eq!(first.sequence(), 1);
        assert_eq!(second.sequence(), 2);
        assert_eq!(driver.connection_count(), 2);
    }

    #[test]
    fn database_handle_remembers_origin() {
        let client = MemoryDriver::new().connect(&settings()).unwrap();
        let database = client.database("shop").unwrap();
        assert_eq!(database.name(), "shop");
        assert_eq!(database.client_sequence(), 1);
        assert_eq!(database.settings(), client.settings());
    }

    #[test]
    fn blank_database_name_is_driver_error() {
        let client = MemoryDriver::new().connect(&settings()).unwrap();
        let err = client.database(" ").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::DriverError);
    }
}
