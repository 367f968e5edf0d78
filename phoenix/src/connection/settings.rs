use crate::common::{MAX_TIMEOUT, TICKS_PER_SECOND};
use crate::connection::{DatabaseProfile, ServerAddress};
use crate::errors::{ErrorKind, PhoenixError, PhoenixResult};
use regex::Regex;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;
use std::sync::LazyLock;
use std::time::Duration;

static WRITE_CONCERN_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_-]*$").expect("valid write concern tag pattern"));

/// How the driver discovers the cluster topology.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub enum ConnectionMode {
    /// Let the driver discover the topology from the seed list.
    Automatic,
    /// Connect to the named replica set.
    ReplicaSet,
}

/// Read isolation level requested from a replica set.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub enum ReadConcernLevel {
    Local,
    Available,
    Majority,
    Linearizable,
    Snapshot,
}

impl FromStr for ReadConcernLevel {
    type Err = PhoenixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(ReadConcernLevel::Local),
            "available" => Ok(ReadConcernLevel::Available),
            "majority" => Ok(ReadConcernLevel::Majority),
            "linearizable" => Ok(ReadConcernLevel::Linearizable),
            "snapshot" => Ok(ReadConcernLevel::Snapshot),
            _ => Err(PhoenixError::new(
                &format!("Unknown read concern level '{}'", s),
                ErrorKind::InvalidProfile,
            )),
        }
    }
}

/// Which replica set members reads are routed to.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub enum ReadPreferenceMode {
    Primary,
    PrimaryPreferred,
    Secondary,
    SecondaryPreferred,
    Nearest,
}

impl FromStr for ReadPreferenceMode {
    type Err = PhoenixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "primary" => Ok(ReadPreferenceMode::Primary),
            "primarypreferred" => Ok(ReadPreferenceMode::PrimaryPreferred),
            "secondary" => Ok(ReadPreferenceMode::Secondary),
            "secondarypreferred" => Ok(ReadPreferenceMode::SecondaryPreferred),
            "nearest" => Ok(ReadPreferenceMode::Nearest),
            _ => Err(PhoenixError::new(
                &format!("Unknown read preference mode '{}'", s),
                ErrorKind::InvalidProfile,
            )),
        }
    }
}

/// Acknowledgement required for writes.
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub enum WriteConcern {
    /// Acknowledged by a majority of voting members.
    Majority,
    /// Acknowledged by the given number of members.
    Nodes(u32),
    /// Acknowledged by the members matching a custom tag set.
    Tag(String),
}

impl FromStr for WriteConcern {
    type Err = PhoenixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mode = s.trim();
        if mode.eq_ignore_ascii_case("majority") {
            return Ok(WriteConcern::Majority);
        }

        if !mode.is_empty() && mode.bytes().all(|b| b.is_ascii_digit()) {
            return mode.parse::<u32>().map(WriteConcern::Nodes).map_err(|err| {
                PhoenixError::new(
                    &format!("Invalid write concern node count '{}': {}", s, err),
                    ErrorKind::InvalidProfile,
                )
            });
        }

        if WRITE_CONCERN_TAG.is_match(mode) {
            return Ok(WriteConcern::Tag(mode.to_string()));
        }

        Err(PhoenixError::new(
            &format!("Unknown write concern mode '{}'", s),
            ErrorKind::InvalidProfile,
        ))
    }
}

/// Authentication material for a client.
#[derive(PartialEq, Eq, Hash, Clone)]
pub struct Credential {
    username: String,
    password: Option<String>,
    source: String,
}

impl Credential {
    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// The database the credential authenticates against.
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("source", &self.source)
            .finish()
    }
}

/// Driver-facing client configuration derived from a [`DatabaseProfile`].
///
/// Replica set options (read concern, read preference and write concern)
/// are only populated when the profile names a replica set.
#[derive(PartialEq, Clone, Debug)]
pub struct ClientSettings {
    hosts: Vec<ServerAddress>,
    credential: Option<Credential>,
    connection_mode: ConnectionMode,
    replica_set_name: Option<String>,
    read_concern: Option<ReadConcernLevel>,
    read_preference: Option<ReadPreferenceMode>,
    write_concern: Option<WriteConcern>,
    connect_timeout: Duration,
    ipv6: bool,
}

impl ClientSettings {
    /// Builds client settings from `profile`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidProfile`] naming the profile when it has no
    /// servers, no database name, an unparseable timeout or an unknown
    /// concern token.
    pub fn from_profile(profile: &DatabaseProfile) -> PhoenixResult<Self> {
        let invalid = |cause: PhoenixError| {
            log::error!("Invalid profile '{}': {}", profile.id(), cause);
            PhoenixError::new_with_cause(
                &format!("Invalid database profile '{}': {}", profile.id(), cause.message()),
                ErrorKind::InvalidProfile,
                cause,
            )
        };

        if profile.servers().is_empty() {
            return Err(invalid(PhoenixError::new(
                "no servers configured",
                ErrorKind::InvalidProfile,
            )));
        }

        if profile.database().trim().is_empty() {
            return Err(invalid(PhoenixError::new(
                "database name is empty",
                ErrorKind::InvalidProfile,
            )));
        }

        let credential = profile.username().map(|username| Credential {
            username: username.to_string(),
            password: profile.password().map(str::to_string),
            source: profile
                .authentication_database()
                .unwrap_or(profile.database())
                .to_string(),
        });

        let mut settings = ClientSettings {
            hosts: profile.servers().to_vec(),
            credential,
            connection_mode: ConnectionMode::Automatic,
            replica_set_name: None,
            read_concern: None,
            read_preference: None,
            write_concern: None,
            connect_timeout: parse_time_span(profile.connect_timeout()).map_err(invalid)?,
            ipv6: false,
        };

        if let Some(replica_set) = profile.replica_set() {
            settings.connection_mode = ConnectionMode::ReplicaSet;
            settings.replica_set_name = Some(replica_set.to_string());
            settings.read_concern = Some(profile.read_concern_level().parse().map_err(invalid)?);
            settings.read_preference = Some(profile.read_preference_mode().parse().map_err(invalid)?);
            if let Some(mode) = profile.write_concern_mode() {
                settings.write_concern = Some(mode.parse().map_err(invalid)?);
            }
        }

        Ok(settings)
    }

    pub fn hosts(&self) -> &[ServerAddress] {
        &self.hosts
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    pub fn connection_mode(&self) -> ConnectionMode {
        self.connection_mode
    }

    pub fn replica_set_name(&self) -> Option<&str> {
        self.replica_set_name.as_deref()
    }

    pub fn read_concern(&self) -> Option<ReadConcernLevel> {
        self.read_concern
    }

    pub fn read_preference(&self) -> Option<ReadPreferenceMode> {
        self.read_preference
    }

    pub fn write_concern(&self) -> Option<&WriteConcern> {
        self.write_concern.as_ref()
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    pub fn ipv6(&self) -> bool {
        self.ipv6
    }
}

impl Display for ClientSettings {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let hosts: Vec<String> = self.hosts.iter().map(|it| it.to_string()).collect();
        write!(f, "hosts=[{}]", hosts.join(","))?;
        if let Some(replica_set) = &self.replica_set_name {
            write!(f, ", replica_set={}", replica_set)?;
        }
        write!(f, ", connect_timeout={:?}", self.connect_timeout)
    }
}

/// Parses a `[d.]hh:mm[:ss[.fffffff]]` time span. A bare integer is a
/// number of days.
///
/// # Examples
///
/// ```rust
/// use phoenix::connection::parse_time_span;
/// use std::time::Duration;
///
/// assert_eq!(parse_time_span("00:00:15").unwrap(), Duration::from_secs(15));
/// assert_eq!(parse_time_span("1.02:00:00").unwrap(), Duration::from_secs(93_600));
/// assert_eq!(parse_time_span("00:00:00.5").unwrap(), Duration::from_millis(500));
/// assert!(parse_time_span("fifteen seconds").is_err());
/// ```
pub fn parse_time_span(value: &str) -> PhoenixResult<Duration> {
    let input = value.trim();
    let malformed = || {
        PhoenixError::new(
            &format!("Malformed time span '{}'", value),
            ErrorKind::InvalidProfile,
        )
    };

    let colon = match input.find(':') {
        Some(colon) => colon,
        None => {
            let days = parse_digits(input).ok_or_else(malformed)?;
            return to_duration(days, 0, 0, 0, 0).ok_or_else(malformed);
        }
    };

    let (days, hours) = match input[..colon].split_once('.') {
        Some((days, hours)) => (parse_digits(days).ok_or_else(malformed)?, hours),
        None => (0, &input[..colon]),
    };
    let hours = parse_digits(hours).filter(|h| *h < 24).ok_or_else(malformed)?;

    let mut parts = input[colon + 1..].splitn(2, ':');
    let minutes = parts
        .next()
        .and_then(parse_digits)
        .filter(|m| *m < 60)
        .ok_or_else(malformed)?;

    let (seconds, ticks) = match parts.next() {
        None => (0, 0),
        Some(rest) => {
            let (seconds, fraction) = match rest.split_once('.') {
                Some((seconds, fraction)) => (seconds, Some(fraction)),
                None => (rest, None),
            };
            let seconds = parse_digits(seconds).filter(|s| *s < 60).ok_or_else(malformed)?;
            let ticks = match fraction {
                None => 0,
                Some(fraction) if (1..=7).contains(&fraction.len()) => {
                    let digits = parse_digits(fraction).ok_or_else(malformed)?;
                    digits * 10u64.pow(7 - fraction.len() as u32)
                }
                Some(_) => return Err(malformed()),
            };
            (seconds, ticks)
        }
    };

    to_duration(days, hours, minutes, seconds, ticks).ok_or_else(malformed)
}

fn parse_digits(value: &str) -> Option<u64> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

fn to_duration(days: u64, hours: u64, minutes: u64, seconds: u64, ticks: u64) -> Option<Duration> {
    let total_seconds = days
        .checked_mul(86_400)?
        .checked_add(hours * 3_600 + minutes * 60 + seconds)?;
    let nanos = (ticks % TICKS_PER_SECOND) * 100;
    let duration = Duration::new(total_seconds, nanos as u32);
    if duration > MAX_TIMEOUT {
        return None;
    }
    Some(duration)
}
