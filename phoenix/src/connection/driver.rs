use crate::connection::ClientSettings;
use crate::errors::PhoenixResult;

/// Entry point of the underlying document database driver.
///
/// The connection manager calls [`DocumentDriver::connect`] at most once per
/// profile id and keeps the returned client for the lifetime of the process.
pub trait DocumentDriver: Send + Sync {
    type Client: DocumentClient;

    /// Creates a client configured with `settings`.
    fn connect(&self, settings: &ClientSettings) -> PhoenixResult<Self::Client>;
}

/// A connected driver client able to hand out database handles.
pub trait DocumentClient: Send + Sync {
    /// Opaque database handle returned to the repository layer.
    type Database: Send + Sync;

    fn database(&self, name: &str) -> PhoenixResult<Self::Database>;
}

/// The database handle type produced by driver `D`.
pub type DatabaseOf<D> = <<D as DocumentDriver>::Client as DocumentClient>::Database;
