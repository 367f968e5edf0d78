use crate::connection::{
    ClientSettings, DatabaseOf, DatabaseProfile, DatabaseProfiles, DocumentClient, DocumentDriver,
};
use crate::errors::{ErrorKind, PhoenixError, PhoenixResult};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;

/// Process-lifetime cache of driver clients and database handles, keyed by
/// profile id.
///
/// Lookups of an already cached handle never take the creation lock. The
/// first request for a profile id takes the lock, checks again, and builds
/// the client and database handle exactly once, even under concurrent first
/// access. Entries are never evicted; [`ConnectionManager::reset`] drops all
/// of them.
///
/// Clones share the same cache.
///
/// # Examples
///
/// ```rust
/// use phoenix::connection::{ConnectionManager, DatabaseProfile, MemoryDriver};
/// use std::sync::Arc;
///
/// let manager = ConnectionManager::builder(MemoryDriver::new())
///     .profile(DatabaseProfile::new("main", "shop").with_server("localhost", 27017))
///     .build()
///     .unwrap();
///
/// let first = manager.get_database_by_id("main").unwrap();
/// let second = manager.get_database_by_id("main").unwrap();
/// assert!(Arc::ptr_eq(&first, &second));
/// assert_eq!(first.name(), "shop");
/// ```
pub struct ConnectionManager<D: DocumentDriver> {
    inner: Arc<ConnectionManagerInner<D>>,
}

impl<D: DocumentDriver> Clone for ConnectionManager<D> {
    fn clone(&self) -> Self {
        ConnectionManager {
            inner: self.inner.clone(),
        }
    }
}

impl<D: DocumentDriver> ConnectionManager<D> {
    /// Creates a manager over `driver` and the host-supplied profile mapping.
    pub fn new(driver: D, profiles: DatabaseProfiles) -> Self {
        ConnectionManager {
            inner: Arc::new(ConnectionManagerInner::new(driver, profiles)),
        }
    }

    /// Starts a [`ConnectionManagerBuilder`] over `driver`.
    pub fn builder(driver: D) -> ConnectionManagerBuilder<D> {
        ConnectionManagerBuilder::new(driver)
    }

    /// Returns the database handle for `profile`, creating the client and
    /// handle on first use.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidProfile`] when the profile has no id or
    /// carries malformed settings, and [`ErrorKind::DriverError`] when the
    /// driver fails.
    pub fn get_database(&self, profile: &DatabaseProfile) -> PhoenixResult<Arc<DatabaseOf<D>>> {
        self.inner.get_database(profile)
    }

    /// Looks `profile_id` up in the profile mapping and returns its database
    /// handle.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ProfileNotFound`] naming `profile_id` when the
    /// mapping has no such profile.
    pub fn get_database_by_id(&self, profile_id: &str) -> PhoenixResult<Arc<DatabaseOf<D>>> {
        self.inner.get_database_by_id(profile_id)
    }

    /// Returns the cached client for `profile_id`, if one was created.
    pub fn client(&self, profile_id: &str) -> Option<Arc<D::Client>> {
        self.inner.clients.get(profile_id).map(|it| it.value().clone())
    }

    /// Whether a database handle is cached for `profile_id`.
    pub fn is_cached(&self, profile_id: &str) -> bool {
        self.inner.databases.contains_key(profile_id)
    }

    pub fn profiles(&self) -> &DatabaseProfiles {
        &self.inner.profiles
    }

    pub fn driver(&self) -> &D {
        &self.inner.driver
    }

    /// Drops every cached client and database handle.
    pub fn reset(&self) {
        self.inner.reset()
    }
}

struct ConnectionManagerInner<D: DocumentDriver> {
    driver: D,
    profiles: DatabaseProfiles,
    clients: DashMap<String, Arc<D::Client>>,
    databases: DashMap<String, Arc<DatabaseOf<D>>>,
    init_lock: Mutex<()>,
}

impl<D: DocumentDriver> ConnectionManagerInner<D> {
    fn new(driver: D, profiles: DatabaseProfiles) -> Self {
        ConnectionManagerInner {
            driver,
            profiles,
            clients: DashMap::new(),
            databases: DashMap::new(),
            init_lock: Mutex::new(()),
        }
    }

    fn get_database_by_id(&self, profile_id: &str) -> PhoenixResult<Arc<DatabaseOf<D>>> {
        if profile_id.trim().is_empty() {
            log::error!("Profile id cannot be empty");
            return Err(PhoenixError::new(
                "Profile id cannot be empty",
                ErrorKind::ConfigurationError,
            ));
        }

        match self.profiles.get(profile_id) {
            Some(profile) => self.get_database(profile),
            None => {
                log::error!("Can't find connection profile for '{}'", profile_id);
                Err(PhoenixError::new(
                    &format!("Can't find connection profile for '{}'", profile_id),
                    ErrorKind::ProfileNotFound,
                ))
            }
        }
    }

    fn get_database(&self, profile: &DatabaseProfile) -> PhoenixResult<Arc<DatabaseOf<D>>> {
        let profile_id = profile.id();
        if profile_id.trim().is_empty() {
            log::error!("Profile for database '{}' has no id", profile.database());
            return Err(PhoenixError::new(
                &format!("Profile for database '{}' has no id", profile.database()),
                ErrorKind::InvalidProfile,
            ));
        }

        if let Some(database) = self.cached_database(profile_id) {
            return Ok(database);
        }

        let _guard = self.init_lock.lock();
        if let Some(database) = self.cached_database(profile_id) {
            return Ok(database);
        }

        let client = match self.clients.get(profile_id).map(|it| it.value().clone()) {
            Some(client) => client,
            None => {
                let client = Arc::new(self.connect(profile)?);
                self.clients.insert(profile_id.to_string(), client.clone());
                client
            }
        };

        let database = client.database(profile.database()).map_err(|err| {
            log::error!(
                "Failed to open database '{}' for profile '{}': {}",
                profile.database(),
                profile_id,
                err
            );
            PhoenixError::new_with_cause(
                &format!(
                    "Failed to open database '{}' for profile '{}'",
                    profile.database(),
                    profile_id
                ),
                ErrorKind::DriverError,
                err,
            )
        })?;

        let database = Arc::new(database);
        self.databases.insert(profile_id.to_string(), database.clone());
        log::info!(
            "Cached database '{}' for profile '{}'",
            profile.database(),
            profile_id
        );
        Ok(database)
    }

    fn connect(&self, profile: &DatabaseProfile) -> PhoenixResult<D::Client> {
        let settings = ClientSettings::from_profile(profile)?;
        log::debug!("Creating client for profile '{}' with {}", profile.id(), settings);

        self.driver.connect(&settings).map_err(|err| {
            log::error!("Failed to create client for profile '{}': {}", profile.id(), err);
            PhoenixError::new_with_cause(
                &format!("Failed to create client for profile '{}'", profile.id()),
                ErrorKind::DriverError,
                err,
            )
        })
    }

    fn cached_database(&self, profile_id: &str) -> Option<Arc<DatabaseOf<D>>> {
        self.databases.get(profile_id).map(|it| it.value().clone())
    }

    fn reset(&self) {
        let _guard = self.init_lock.lock();
        let count = self.databases.len();
        self.databases.clear();
        self.clients.clear();
        log::info!("Connection cache reset, {} database handle(s) dropped", count);
    }
}

/// Builder for a [`ConnectionManager`].
///
/// Follows the fail-late builder style: the first configuration error is
/// kept and returned from [`ConnectionManagerBuilder::build`].
pub struct ConnectionManagerBuilder<D: DocumentDriver> {
    error: Option<PhoenixError>,
    driver: D,
    profiles: DatabaseProfiles,
}

impl<D: DocumentDriver> ConnectionManagerBuilder<D> {
    pub fn new(driver: D) -> Self {
        ConnectionManagerBuilder {
            error: None,
            driver,
            profiles: DatabaseProfiles::new(),
        }
    }

    /// Registers a single profile under its id.
    pub fn profile(mut self, profile: DatabaseProfile) -> Self {
        if self.error.is_none() && profile.id().trim().is_empty() {
            self.error = Some(PhoenixError::new(
                &format!("Profile for database '{}' has no id", profile.database()),
                ErrorKind::InvalidProfile,
            ));
            return self;
        }
        self.profiles.insert(profile);
        self
    }

    /// Registers every profile of `profiles`, replacing profiles with the
    /// same id.
    pub fn profiles(mut self, profiles: DatabaseProfiles) -> Self {
        for id in profiles.ids() {
            if let Some(profile) = profiles.get(id) {
                self.profiles.insert_as(id, profile.clone());
            }
        }
        self
    }

    /// Registers profiles decoded from a JSON document.
    pub fn profiles_from_json(self, json: &str) -> Self {
        match DatabaseProfiles::from_json_str(json) {
            Ok(profiles) => self.profiles(profiles),
            Err(err) => self.fail(err),
        }
    }

    /// Registers profiles decoded from a JSON settings file.
    pub fn profiles_from_file<P: AsRef<Path>>(self, path: P) -> Self {
        match DatabaseProfiles::from_json_file(path) {
            Ok(profiles) => self.profiles(profiles),
            Err(err) => self.fail(err),
        }
    }

    /// Builds the manager, or returns the first captured error.
    pub fn build(self) -> PhoenixResult<ConnectionManager<D>> {
        if let Some(err) = self.error {
            return Err(err);
        }
        Ok(ConnectionManager::new(self.driver, self.profiles))
    }

    fn fail(mut self, err: PhoenixError) -> Self {
        if self.error.is_none() {
            self.error = Some(err);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::{MemoryDatabase, MemoryDriver};
    use std::sync::Barrier;
    use std::thread;

    // Setup only one time throughout the project.
    #[ctor::ctor]
    fn init() {
        colog::init();
    }

    fn profile(id: &str) -> DatabaseProfile {
        DatabaseProfile::new(id, &format!("{}_db", id)).with_server("localhost", 27017)
    }

    fn manager() -> ConnectionManager<MemoryDriver> {
        ConnectionManager::builder(MemoryDriver::new())
            .profile(profile("main"))
            .profile(profile("audit"))
            .build()
            .unwrap()
    }

    #[test]
    fn returns_same_handle_for_same_profile() {
        let manager = manager();
        let first = manager.get_database_by_id("main").unwrap();
        let second = manager.get_database(&profile("main")).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(manager.driver().connection_count(), 1);
    }

    #[test]
    fn handle_is_pinned_to_profile_database() {
        let manager = manager();
        let database = manager.get_database_by_id("audit").unwrap();
        assert_eq!(database.name(), "audit_db");
    }

    #[test]
    fn distinct_profiles_get_distinct_clients() {
        let manager = manager();
        let main = manager.get_database_by_id("main").unwrap();
        let audit = manager.get_database_by_id("audit").unwrap();
        assert!(!Arc::ptr_eq(&main, &audit));
        assert_ne!(main.client_sequence(), audit.client_sequence());
        assert_eq!(manager.driver().connection_count(), 2);
    }

    #[test]
    fn missing_profile_error_names_the_id() {
        let err = manager().get_database_by_id("missing-id").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ProfileNotFound);
        assert!(err.message().contains("missing-id"));
    }

    #[test]
    fn blank_profile_id_is_rejected() {
        let err = manager().get_database_by_id("  ").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ConfigurationError);

        let err = manager()
            .get_database(&DatabaseProfile::new("", "shop").with_server("localhost", 1))
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidProfile);
    }

    #[test]
    fn malformed_profile_is_not_cached() {
        let manager = ConnectionManager::builder(MemoryDriver::new())
            .profile(profile("broken").with_connect_timeout("later"))
            .build()
            .unwrap();
        let err = manager.get_database_by_id("broken").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidProfile);
        assert!(!manager.is_cached("broken"));
        assert!(manager.client("broken").is_none());
        assert_eq!(manager.driver().connection_count(), 0);
    }

    #[test]
    fn concurrent_first_access_constructs_once() {
        let manager = manager();
        let threads = 8;
        let barrier = Arc::new(Barrier::new(threads));

        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let manager = manager.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    manager.get_database_by_id("main").unwrap()
                })
            })
            .collect();

        let databases: Vec<Arc<MemoryDatabase>> =
            handles.into_iter().map(|it| it.join().unwrap()).collect();
        for database in &databases {
            assert!(Arc::ptr_eq(database, &databases[0]));
        }
        assert_eq!(manager.driver().connection_count(), 1);
    }

    #[test]
    fn reset_drops_cached_entries() {
        let manager = manager();
        let before = manager.get_database_by_id("main").unwrap();
        assert!(manager.is_cached("main"));
        assert!(manager.client("main").is_some());

        manager.reset();
        assert!(!manager.is_cached("main"));
        assert!(manager.client("main").is_none());

        let after = manager.get_database_by_id("main").unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(manager.driver().connection_count(), 2);
    }

    #[test]
    fn clones_share_the_cache() {
        let manager = manager();
        let clone = manager.clone();
        let first = manager.get_database_by_id("main").unwrap();
        let second = clone.get_database_by_id("main").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn builder_keeps_first_error() {
        let result = ConnectionManager::builder(MemoryDriver::new())
            .profiles_from_json("{ broken")
            .profile(DatabaseProfile::new("", "x"))
            .build();
        let err = result.err().unwrap();
        assert_eq!(err.kind(), &ErrorKind::EncodingError);
    }

    #[test]
    fn builder_rejects_profile_without_id() {
        let result = ConnectionManager::builder(MemoryDriver::new())
            .profile(DatabaseProfile::new("", "shop"))
            .build();
        assert_eq!(result.err().unwrap().kind(), &ErrorKind::InvalidProfile);
    }

    #[test]
    fn builder_loads_profiles_from_json() {
        let manager = ConnectionManager::builder(MemoryDriver::new())
            .profiles_from_json(
                r#"{ "DatabaseSettings": { "main": { "Database": "shop", "Servers": [{}] } } }"#,
            )
            .build()
            .unwrap();
        let database = manager.get_database_by_id("main").unwrap();
        assert_eq!(database.name(), "shop");
        assert_eq!(database.settings().hosts()[0].to_string(), "localhost:27017");
    }
}
