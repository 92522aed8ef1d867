//! Error types for netdeploy.

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Main error type for netdeploy operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Input table errors
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Command builder errors
    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    /// SSH transport-level errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Channel operation errors
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Session-level errors
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    /// Configuration backup errors
    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),

    /// Smart plug provisioning errors
    #[error("Plug error: {0}")]
    Plug(#[from] PlugError),

    /// Run configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Output file errors
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Coarse classification used by callers to pick a failure policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    Parse,
    InvalidVlan,
    InvalidPortRange,
    InvalidAddress,
    Auth,
    Unreachable,
    Transport,
    Archive,
    Config,
    Io,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Source(SourceError::NotFound { .. }) => ErrorKind::NotFound,
            Error::Source(_) => ErrorKind::Parse,
            Error::Build(BuildError::InvalidVlan { .. }) => ErrorKind::InvalidVlan,
            Error::Build(BuildError::InvalidPortRange { .. }) => ErrorKind::InvalidPortRange,
            Error::Build(BuildError::InvalidAddress { .. }) => ErrorKind::InvalidAddress,
            Error::Transport(e) => e.kind(),
            Error::Channel(_) => ErrorKind::Transport,
            Error::Driver(DriverError::PrivilegeAcquisitionFailed { .. }) => ErrorKind::Auth,
            Error::Driver(_) => ErrorKind::Transport,
            Error::Archive(_) => ErrorKind::Archive,
            Error::Plug(_) => ErrorKind::Transport,
            Error::Config(_) => ErrorKind::Config,
            Error::Io { .. } => ErrorKind::Io,
        }
    }
}

/// Row source errors (reading the delimited input table).
#[derive(Error, Debug)]
pub enum SourceError {
    /// Input file does not exist
    #[error("Input file not found: {}", .path.display())]
    NotFound { path: PathBuf },

    /// Header or record could not be decoded
    #[error("Parse error in {}{}: {message}", .path.display(), .line.map(|l| format!(" (line {l})")).unwrap_or_default())]
    Parse {
        path: PathBuf,
        line: Option<u64>,
        message: String,
    },

    /// Reading the file failed
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Command builder errors (malformed numeric or range fields).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// VLAN id is not a number in range
    #[error("Invalid VLAN id '{value}'")]
    InvalidVlan { value: String },

    /// Port specification could not be expanded
    #[error("Invalid port range '{spec}': {reason}")]
    InvalidPortRange { spec: String, reason: String },

    /// IPv4 address could not be parsed
    #[error("Invalid IPv4 address '{value}'")]
    InvalidAddress { value: String },
}

/// Transport layer errors (SSH connection, authentication).
#[derive(Error, Debug)]
pub enum TransportError {
    /// Failed to connect to host
    #[error("Connection failed to {host}:{port}: {source}")]
    ConnectionFailed {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    /// SSH handshake or protocol error
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// Authentication failed
    #[error("Authentication failed for user '{user}'")]
    AuthenticationFailed { user: String },

    /// Host key differs from the one in known_hosts
    #[error("Host key for {host}:{port} changed (known_hosts line {line})")]
    HostKeyChanged { host: String, port: u16, line: usize },

    /// Host is not in known_hosts and strict checking is on
    #[error("Host key for {host}:{port} is unknown")]
    HostKeyUnknown { host: String, port: u16 },

    /// known_hosts could not be read or written
    #[error("known_hosts error: {0}")]
    KnownHosts(String),

    /// Connection was closed unexpectedly
    #[error("Connection disconnected")]
    Disconnected,

    /// Connecting timed out
    #[error("Connection to {host} timed out after {timeout:?}")]
    Timeout { host: String, timeout: Duration },
}

impl TransportError {
    fn kind(&self) -> ErrorKind {
        match self {
            TransportError::ConnectionFailed { .. } | TransportError::Timeout { .. } => {
                ErrorKind::Unreachable
            }
            TransportError::AuthenticationFailed { .. }
            | TransportError::HostKeyChanged { .. }
            | TransportError::HostKeyUnknown { .. } => ErrorKind::Auth,
            _ => ErrorKind::Transport,
        }
    }
}

/// Channel layer errors (pattern matching, PTY operations).
#[derive(Error, Debug)]
pub enum ChannelError {
    /// Pattern matching timed out
    #[error("Pattern not found within {0:?}")]
    PatternTimeout(Duration),

    /// Channel closed unexpectedly
    #[error("Channel closed")]
    Closed,

    /// Reading from or writing to the shell stream failed
    #[error("Channel I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid regex pattern
    #[error("Invalid regex pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Session errors (privilege handling, command execution).
#[derive(Error, Debug)]
pub enum DriverError {
    /// Configuration requires privileged mode
    #[error("Session is not elevated - call elevate() first")]
    NotElevated,

    /// Failed to acquire target privilege level
    #[error("Failed to acquire privilege level '{target}'")]
    PrivilegeAcquisitionFailed { target: String },

    /// Prompt did not match any known privilege level
    #[error("Unknown privilege level from prompt: '{prompt}'")]
    UnknownPrivilege { prompt: String },
}

/// Configuration backup errors.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// The device reported a failed copy
    #[error("Backup of '{filename}' failed: {message}")]
    TransferFailed { filename: String, message: String },

    /// The session broke while the copy was running
    #[error("Backup of '{filename}' interrupted: {source}")]
    Interrupted {
        filename: String,
        #[source]
        source: Box<Error>,
    },

    /// The TFTP listener could not bind
    #[error("TFTP listener failed to bind {addr}: {source}")]
    ListenerFailed {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    /// The TFTP listener task ended before reporting readiness
    #[error("TFTP listener stopped before it was ready")]
    ListenerStopped,
}

/// Smart plug errors (HTTP settings API, Wi-Fi adapter).
#[derive(Error, Debug)]
pub enum PlugError {
    /// Request could not be sent or timed out
    #[error("HTTP request to {endpoint} failed: {source}")]
    Http {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// Plug answered with a non-success status
    #[error("{endpoint} answered {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    Client(reqwest::Error),

    /// Wi-Fi adapter failure
    #[error("Wi-Fi adapter error: {message}")]
    Wifi { message: String },
}

/// Run configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config or secrets file could not be read
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// TOML could not be decoded
    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Settings are inconsistent
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

/// Result type alias using netdeploy's Error.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        let err: Error = SourceError::NotFound {
            path: PathBuf::from("missing.csv"),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err: Error = BuildError::InvalidVlan {
            value: "ten".to_string(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::InvalidVlan);

        let err: Error = TransportError::AuthenticationFailed {
            user: "admin".to_string(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Auth);

        let err: Error = TransportError::Timeout {
            host: "10.0.0.1".to_string(),
            timeout: Duration::from_secs(5),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Unreachable);

        let err: Error = ChannelError::Closed.into();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[test]
    fn test_parse_error_display_includes_line() {
        let err = SourceError::Parse {
            path: PathBuf::from("rows.csv"),
            line: Some(4),
            message: "found 3 fields, expected 7".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Parse error in rows.csv (line 4): found 3 fields, expected 7"
        );
    }
}
