//! SSH connection configuration.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;

/// Host key verification mode, analogous to OpenSSH's `StrictHostKeyChecking`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostKeyVerification {
    /// Reject unknown and changed keys.
    Strict,

    /// Learn unknown keys, reject changed ones.
    #[default]
    AcceptNew,

    /// Accept every key. Lab use only.
    Disabled,
}

/// Connection parameters for one device.
#[derive(Debug)]
pub struct SshConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,

    /// Applies to the TCP connect plus handshake, and to channel inactivity.
    pub timeout: Duration,

    pub terminal_width: u32,
    pub terminal_height: u32,
    pub host_key_verification: HostKeyVerification,

    /// Falls back to the user's `~/.ssh/known_hosts` when unset.
    pub known_hosts_path: Option<PathBuf>,
}

impl SshConfig {
    /// Get the socket address for connection.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Wrapper {
        mode: HostKeyVerification,
    }

    #[test]
    fn test_verification_names() {
        let w: Wrapper = toml::from_str("mode = \"accept_new\"").unwrap();
        assert_eq!(w.mode, HostKeyVerification::AcceptNew);
        let w: Wrapper = toml::from_str("mode = \"strict\"").unwrap();
        assert_eq!(w.mode, HostKeyVerification::Strict);
        assert!(toml::from_str::<Wrapper>("mode = \"sometimes\"").is_err());
    }
}
