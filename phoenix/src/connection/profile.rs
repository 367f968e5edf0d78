use crate::common::{
    DATABASE_SETTINGS_SECTION, DEFAULT_CONNECT_TIMEOUT, DEFAULT_HOST, DEFAULT_PORT,
    DEFAULT_READ_CONCERN_LEVEL, DEFAULT_READ_PREFERENCE_MODE, DEFAULT_WRITE_CONCERN_MODE,
};
use crate::errors::{ErrorKind, PhoenixError, PhoenixResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{Debug, Display, Formatter};
use std::path::Path;

/// A single database server endpoint.
#[derive(PartialEq, Eq, Hash, Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ServerAddress {
    address: String,
    port: u16,
}

impl Default for ServerAddress {
    fn default() -> Self {
        ServerAddress {
            address: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerAddress {
    pub fn new(address: &str, port: u16) -> Self {
        ServerAddress {
            address: address.to_string(),
            port,
        }
    }

    /// IP address or DNS name of the server.
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl Display for ServerAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.address, self.port)
    }
}

/// Named bundle of connection parameters for one logical database.
///
/// Profiles deserialize from PascalCase keys so that an application
/// settings file can be bound directly:
///
/// ```json
/// {
///   "Database": "shop",
///   "Servers": [{ "Address": "db1", "Port": 27017 }],
///   "ReplicaSet": "rs0",
///   "ConnectTimeout": "00:00:30"
/// }
/// ```
///
/// Concern and timeout values are kept as strings and only parsed when a
/// client is built from the profile.
#[derive(Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DatabaseProfile {
    id: String,
    database: String,
    authentication_database: Option<String>,
    username: Option<String>,
    password: Option<String>,
    servers: Vec<ServerAddress>,
    replica_set: Option<String>,
    connect_timeout: String,
    read_concern_level: String,
    read_preference_mode: String,
    write_concern_mode: String,
    default_chunk_size: usize,
}

impl Default for DatabaseProfile {
    fn default() -> Self {
        DatabaseProfile {
            id: String::new(),
            database: String::new(),
            authentication_database: None,
            username: None,
            password: None,
            servers: Vec::new(),
            replica_set: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT.to_string(),
            read_concern_level: DEFAULT_READ_CONCERN_LEVEL.to_string(),
            read_preference_mode: DEFAULT_READ_PREFERENCE_MODE.to_string(),
            write_concern_mode: DEFAULT_WRITE_CONCERN_MODE.to_string(),
            default_chunk_size: 0,
        }
    }
}

impl Debug for DatabaseProfile {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseProfile")
            .field("id", &self.id)
            .field("database", &self.database)
            .field("authentication_database", &self.authentication_database)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("servers", &self.servers)
            .field("replica_set", &self.replica_set)
            .field("connect_timeout", &self.connect_timeout)
            .field("read_concern_level", &self.read_concern_level)
            .field("read_preference_mode", &self.read_preference_mode)
            .field("write_concern_mode", &self.write_concern_mode)
            .field("default_chunk_size", &self.default_chunk_size)
            .finish()
    }
}

impl DatabaseProfile {
    /// Creates a profile with default concerns and timeout and no servers.
    pub fn new(id: &str, database: &str) -> Self {
        DatabaseProfile {
            id: id.to_string(),
            database: database.to_string(),
            ..Default::default()
        }
    }

    pub fn with_server(mut self, address: &str, port: u16) -> Self {
        self.servers.push(ServerAddress::new(address, port));
        self
    }

    pub fn with_credentials(mut self, username: &str, password: &str) -> Self {
        self.username = Some(username.to_string());
        self.password = Some(password.to_string());
        self
    }

    pub fn with_authentication_database(mut self, database: &str) -> Self {
        self.authentication_database = Some(database.to_string());
        self
    }

    pub fn with_replica_set(mut self, replica_set: &str) -> Self {
        self.replica_set = Some(replica_set.to_string());
        self
    }

    pub fn with_connect_timeout(mut self, timeout: &str) -> Self {
        self.connect_timeout = timeout.to_string();
        self
    }

    pub fn with_read_concern_level(mut self, level: &str) -> Self {
        self.read_concern_level = level.to_string();
        self
    }

    pub fn with_read_preference_mode(mut self, mode: &str) -> Self {
        self.read_preference_mode = mode.to_string();
        self
    }

    pub fn with_write_concern_mode(mut self, mode: &str) -> Self {
        self.write_concern_mode = mode.to_string();
        self
    }

    pub fn with_default_chunk_size(mut self, chunk_size: usize) -> Self {
        self.default_chunk_size = chunk_size;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn authentication_database(&self) -> Option<&str> {
        non_blank(self.authentication_database.as_deref())
    }

    pub fn username(&self) -> Option<&str> {
        non_blank(self.username.as_deref())
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn servers(&self) -> &[ServerAddress] {
        &self.servers
    }

    pub fn replica_set(&self) -> Option<&str> {
        non_blank(self.replica_set.as_deref())
    }

    pub fn connect_timeout(&self) -> &str {
        &self.connect_timeout
    }

    pub fn read_concern_level(&self) -> &str {
        &self.read_concern_level
    }

    pub fn read_preference_mode(&self) -> &str {
        &self.read_preference_mode
    }

    pub fn write_concern_mode(&self) -> Option<&str> {
        non_blank(Some(self.write_concern_mode.as_str()))
    }

    /// Bucket chunk size in bytes; `0` means the driver default.
    pub fn default_chunk_size(&self) -> usize {
        self.default_chunk_size
    }

    pub(crate) fn set_id(&mut self, id: &str) {
        self.id = id.to_string();
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|it| !it.trim().is_empty())
}

/// The profile-id to [`DatabaseProfile`] mapping supplied by the host
/// application.
///
/// # Examples
///
/// ```rust
/// use phoenix::connection::DatabaseProfiles;
///
/// let json = r#"{
///     "DatabaseSettings": {
///         "main": { "Database": "shop", "Servers": [{ "Address": "db1", "Port": 27017 }] }
///     }
/// }"#;
/// let profiles = DatabaseProfiles::from_json_str(json).unwrap();
/// assert_eq!(profiles.get("main").map(|p| p.database()), Some("shop"));
/// assert_eq!(profiles.get("main").map(|p| p.id()), Some("main"));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DatabaseProfiles {
    profiles: HashMap<String, DatabaseProfile>,
}

impl DatabaseProfiles {
    pub fn new() -> Self {
        DatabaseProfiles::default()
    }

    /// Registers `profile` under its own id.
    pub fn insert(&mut self, profile: DatabaseProfile) -> Option<DatabaseProfile> {
        self.profiles.insert(profile.id().to_string(), profile)
    }

    /// Registers `profile` under `id`. A profile without an id takes `id`.
    pub fn insert_as(&mut self, id: &str, mut profile: DatabaseProfile) -> Option<DatabaseProfile> {
        if profile.id().trim().is_empty() {
            profile.set_id(id);
        }
        self.profiles.insert(id.to_string(), profile)
    }

    pub fn get(&self, id: &str) -> Option<&DatabaseProfile> {
        self.profiles.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.profiles.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Decodes profiles from JSON.
    ///
    /// Accepts either a bare id-to-profile object or a document holding such
    /// an object under the `"DatabaseSettings"` key.
    pub fn from_json_str(json: &str) -> PhoenixResult<Self> {
        let mut root: serde_json::Value = serde_json::from_str(json)?;
        let section = match root.get_mut(DATABASE_SETTINGS_SECTION) {
            Some(section) => section.take(),
            None => root,
        };

        if !section.is_object() {
            log::error!("Database settings must be a JSON object, found {}", section);
            return Err(PhoenixError::new(
                "Database settings must be a JSON object keyed by profile id",
                ErrorKind::ConfigurationError,
            ));
        }

        let decoded: HashMap<String, DatabaseProfile> = serde_json::from_value(section)?;
        Ok(DatabaseProfiles::from(decoded))
    }

    /// Reads and decodes a JSON settings file, see [`DatabaseProfiles::from_json_str`].
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> PhoenixResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|err| {
            log::error!("Failed to read database settings from {}: {}", path.display(), err);
            PhoenixError::new_with_cause(
                &format!("Failed to read database settings from {}", path.display()),
                ErrorKind::ConfigurationError,
                err.into(),
            )
        })?;
        DatabaseProfiles::from_json_str(&content)
    }
}

impl From<HashMap<String, DatabaseProfile>> for DatabaseProfiles {
    fn from(map: HashMap<String, DatabaseProfile>) -> Self {
        let mut profiles = DatabaseProfiles::new();
        for (id, profile) in map {
            profiles.insert_as(&id, profile);
        }
        profiles
    }
}

impl FromIterator<DatabaseProfile> for DatabaseProfiles {
    fn from_iter<I: IntoIterator<Item = DatabaseProfile>>(iter: I) -> Self {
        let mut profiles = DatabaseProfiles::new();
        for profile in iter {
            profiles.insert(profile);
        }
        profiles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_defaults_match_driver_defaults() {
        let profile = DatabaseProfile::new("main", "shop");
        assert_eq!(profile.connect_timeout(), "00:00:15");
        assert_eq!(profile.read_concern_level(), "Majority");
        assert_eq!(profile.read_preference_mode(), "SecondaryPreferred");
        assert_eq!(profile.write_concern_mode(), Some("majority"));
        assert_eq!(profile.default_chunk_size(), 0);
        assert!(profile.servers().is_empty());
    }

    #[test]
    fn server_address_defaults_to_localhost() {
        let server = ServerAddress::default();
        assert_eq!(server.to_string(), "localhost:27017");
    }

    #[test]
    fn profile_debug_redacts_password() {
        let profile = DatabaseProfile::new("main", "shop").with_credentials("admin", "s3cret");
        let formatted = format!("{:?}", profile);
        assert!(formatted.contains("[REDACTED]"));
        assert!(!formatted.contains("s3cret"));
    }

    #[test]
    fn blank_optional_fields_read_as_none() {
        let profile = DatabaseProfile::new("main", "shop")
            .with_replica_set(" ")
            .with_write_concern_mode("");
        assert_eq!(profile.replica_set(), None);
        assert_eq!(profile.write_concern_mode(), None);
        assert_eq!(profile.username(), None);
    }

    #[test]
    fn decodes_bare_profile_map() {
        let json = r#"{
            "reporting": {
                "Id": "reporting",
                "Database": "reports",
                "Username": "reader",
                "Password": "pwd",
                "AuthenticationDatabase": "admin",
                "Servers": [{ "Address": "db1", "Port": 27018 }, { "Address": "db2" }],
                "ReplicaSet": "rs0",
                "ConnectTimeout": "00:00:30",
                "ReadConcernLevel": "Local",
                "ReadPreferenceMode": "Nearest",
                "WriteConcernMode": "2",
                "DefaultChunkSize": 1024
            }
        }"#;
        let profiles = DatabaseProfiles::from_json_str(json).unwrap();
        let profile = profiles.get("reporting").unwrap();
        assert_eq!(profile.database(), "reports");
        assert_eq!(profile.username(), Some("reader"));
        assert_eq!(profile.authentication_database(), Some("admin"));
        assert_eq!(
            profile.servers(),
            &[ServerAddress::new("db1", 27018), ServerAddress::new("db2", 27017)]
        );
        assert_eq!(profile.replica_set(), Some("rs0"));
        assert_eq!(profile.connect_timeout(), "00:00:30");
        assert_eq!(profile.read_concern_level(), "Local");
        assert_eq!(profile.read_preference_mode(), "Nearest");
        assert_eq!(profile.write_concern_mode(), Some("2"));
        assert_eq!(profile.default_chunk_size(), 1024);
    }

    #[test]
    fn decodes_settings_section_and_fills_missing_ids() {
        let json = r#"{
            "Logging": { "Level": "Debug" },
            "DatabaseSettings": {
                "main": { "Database": "shop" },
                "audit": { "Id": "audit-profile", "Database": "audit" }
            }
        }"#;
        let profiles = DatabaseProfiles::from_json_str(json).unwrap();
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles.get("main").unwrap().id(), "main");
        assert_eq!(profiles.get("audit").unwrap().id(), "audit-profile");
    }

    #[test]
    fn rejects_non_object_settings() {
        let err = DatabaseProfiles::from_json_str(r#"{ "DatabaseSettings": [1, 2] }"#).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ConfigurationError);
    }

    #[test]
    fn rejects_malformed_json() {
        let err = DatabaseProfiles::from_json_str("{ not json").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::EncodingError);
    }

    #[test]
    fn missing_file_is_configuration_error() {
        let err = DatabaseProfiles::from_json_file("/definitely/not/here.json").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ConfigurationError);
        assert_eq!(err.cause().map(|c| c.kind()), Some(&ErrorKind::IOError));
    }

    #[test]
    fn collects_profiles_by_id() {
        let profiles: DatabaseProfiles = vec![
            DatabaseProfile::new("a", "db_a"),
            DatabaseProfile::new("b", "db_b"),
        ]
        .into_iter()
        .collect();
        assert!(profiles.contains("a"));
        assert!(profiles.contains("b"));
        let mut ids: Vec<&str> = profiles.ids().collect();
        ids.sort();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
