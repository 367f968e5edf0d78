use backtrace::Backtrace;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;
use std::sync::Arc;

/// Error kinds for Phoenix operations
///
/// Each kind describes one category of failure so callers can branch on
/// [`PhoenixError::kind`] instead of parsing messages.
///
/// # Examples
///
/// ```rust
/// use phoenix::errors::{ErrorKind, PhoenixError, PhoenixResult};
///
/// fn example() -> PhoenixResult<()> {
///     Err(PhoenixError::new("Profile 'audit' not found", ErrorKind::ProfileNotFound))
/// }
///
/// assert_eq!(example().unwrap_err().kind(), &ErrorKind::ProfileNotFound);
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    // Configuration Errors
    /// Generic configuration failure
    ConfigurationError,
    /// The requested profile id is not present in the profile mapping
    ProfileNotFound,
    /// A profile carries malformed data (timeout, concern tokens, servers...)
    InvalidProfile,

    // Metadata Errors
    /// A required profile, collection or bucket name could not be resolved
    MetadataNotFound,

    // Driver Errors
    /// The document database driver failed to connect or open a database
    DriverError,

    // Data Encoding Errors
    /// Error encoding or decoding data
    EncodingError,

    // IO Errors
    /// Generic IO error
    IOError,

    // Generic/Internal Errors
    /// Internal error (usually indicates a bug)
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::ConfigurationError => write!(f, "Configuration error"),
            ErrorKind::ProfileNotFound => write!(f, "Profile not found"),
            ErrorKind::InvalidProfile => write!(f, "Invalid profile"),
            ErrorKind::MetadataNotFound => write!(f, "Metadata not found"),
            ErrorKind::DriverError => write!(f, "Driver error"),
            ErrorKind::EncodingError => write!(f, "Encoding error"),
            ErrorKind::IOError => write!(f, "IO error"),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// Custom Phoenix error type.
///
/// `PhoenixError` carries a message, an [`ErrorKind`] and an optional cause.
/// The backtrace is captured at construction and printed by `Debug`.
///
/// # Examples
///
/// ```rust
/// use phoenix::errors::{ErrorKind, PhoenixError};
///
/// let cause = PhoenixError::new("invalid digit in '1x'", ErrorKind::InvalidProfile);
/// let err = PhoenixError::new_with_cause(
///     "Failed to configure client for profile 'main'",
///     ErrorKind::ConfigurationError,
///     cause,
/// );
/// assert!(err.cause().is_some());
/// ```
#[derive(Clone)]
pub struct PhoenixError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<PhoenixError>>,
    backtrace: Arc<Backtrace>,
}

impl PhoenixError {
    /// Creates a new `PhoenixError` with the specified message and error kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        PhoenixError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: Arc::new(Backtrace::new()),
        }
    }

    /// Creates a new `PhoenixError` that wraps `cause`.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: PhoenixError) -> Self {
        PhoenixError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: Arc::new(Backtrace::new()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&PhoenixError> {
        self.cause.as_deref()
    }
}

impl Display for PhoenixError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for PhoenixError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // message with stack trace, or message followed by its cause
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => write!(f, "{}\n{:?}", self.message, self.backtrace),
        }
    }
}

impl Error for PhoenixError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for Phoenix operations.
pub type PhoenixResult<T> = Result<T, PhoenixError>;

impl From<std::io::Error> for PhoenixError {
    fn from(err: std::io::Error) -> Self {
        PhoenixError::new(&format!("IO error: {}", err), ErrorKind::IOError)
    }
}

impl From<serde_json::Error> for PhoenixError {
    fn from(err: serde_json::Error) -> Self {
        PhoenixError::new(
            &format!("JSON encoding error: {}", err),
            ErrorKind::EncodingError,
        )
    }
}

impl From<String> for PhoenixError {
    fn from(msg: String) -> Self {
        PhoenixError::new(&msg, ErrorKind::InternalError)
    }
}

impl From<&str> for PhoenixError {
    fn from(msg: &str) -> Self {
        PhoenixError::new(msg, ErrorKind::InternalError)
    }
}
