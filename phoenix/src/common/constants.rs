use std::time::Duration;

// metadata constants
pub const BUCKET_METADATA_SUFFIX: &str = ".files";
pub const MAX_LINEAGE_DEPTH: usize = 64;

// connection constants
pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 27017;
pub const DEFAULT_CONNECT_TIMEOUT: &str = "00:00:15";
pub const DEFAULT_READ_CONCERN_LEVEL: &str = "Majority";
pub const DEFAULT_READ_PREFERENCE_MODE: &str = "SecondaryPreferred";
pub const DEFAULT_WRITE_CONCERN_MODE: &str = "majority";
pub const DATABASE_SETTINGS_SECTION: &str = "DatabaseSettings";

// file bucket constants
pub const DEFAULT_CHUNK_SIZE: usize = 255 * 1024;

// comparer constants
pub const PATH_SEPARATOR: &str = ".";

pub(crate) const TICKS_PER_SECOND: u64 = 10_000_000;
pub(crate) const MAX_TIMEOUT: Duration = Duration::from_secs(10_675_199 * 86_400);
