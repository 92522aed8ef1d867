//! SSH session opener with builder-style overrides.

use std::path::PathBuf;
use std::time::Duration;

use log::info;
use russh::ChannelStream;
use russh::client::Msg;
use secrecy::{ExposeSecret, SecretString};

use super::SessionOpener;
use super::session::CiscoSession;
use crate::channel::PtyConfig;
use crate::config::{Credentials, SessionSettings};
use crate::error::Result;
use crate::platform::{PlatformDefinition, cisco_ios};
use crate::transport::{HostKeyVerification, SshConfig, SshTransport};

/// IOS session running over a russh channel.
pub type SshSession = CiscoSession<ChannelStream<Msg>>;

/// Opens [`SshSession`]s.
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
/// use netdeploy::config::Credentials;
/// use netdeploy::driver::{SessionOpener, SshOpener};
///
/// # async fn example() -> Result<(), netdeploy::Error> {
/// let opener = SshOpener::new()?
///     .port(2222)
///     .timeout(Duration::from_secs(10));
/// let credentials = Credentials::new("admin", "cisco", "class");
/// let session = opener.open("192.168.1.12", &credentials).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SshOpener {
    port: u16,
    timeout: Duration,
    terminal_width: u32,
    terminal_height: u32,
    host_key_verification: HostKeyVerification,
    known_hosts_path: Option<PathBuf>,
    platform: PlatformDefinition,
}

impl SshOpener {
    /// Opener for Cisco IOS devices with default settings.
    pub fn new() -> Result<Self> {
        Self::from_settings(&SessionSettings::default())
    }

    /// Opener for Cisco IOS devices using the run's session settings.
    pub fn from_settings(settings: &SessionSettings) -> Result<Self> {
        Ok(Self {
            port: settings.port,
            timeout: settings.timeout(),
            terminal_width: 511,
            terminal_height: 24,
            host_key_verification: settings.host_key_verification,
            known_hosts_path: settings.known_hosts.clone(),
            platform: cisco_ios::platform()?,
        })
    }

    /// Set the SSH port (default: 22).
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Connect timeout, also used for every prompt wait.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn terminal_size(mut self, width: u32, height: u32) -> Self {
        self.terminal_width = width;
        self.terminal_height = height;
        self
    }

    pub fn host_key_verification(mut self, mode: HostKeyVerification) -> Self {
        self.host_key_verification = mode;
        self
    }

    pub fn known_hosts(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_hosts_path = Some(path.into());
        self
    }

    /// Use a different platform definition.
    pub fn platform(mut self, platform: PlatformDefinition) -> Self {
        self.platform = platform;
        self
    }

    fn ssh_config(&self, host: &str, credentials: &Credentials) -> SshConfig {
        SshConfig {
            host: host.to_string(),
            port: self.port,
            username: credentials.username.clone(),
            password: SecretString::from(credentials.password.expose_secret().to_string()),
            timeout: self.timeout,
            terminal_width: self.terminal_width,
            terminal_height: self.terminal_height,
            host_key_verification: self.host_key_verification,
            known_hosts_path: self.known_hosts_path.clone(),
        }
    }
}

impl SessionOpener for SshOpener {
    type Session = SshSession;

    async fn open(&self, host: &str, credentials: &Credentials) -> Result<SshSession> {
        let transport = SshTransport::connect(self.ssh_config(host, credentials)).await?;
        let channel = transport.open_channel().await?;

        let pty = PtyConfig {
            timeout: self.timeout,
            ..Default::default()
        };
        let session =
            CiscoSession::establish(host, channel.into_stream(), self.platform.clone(), pty)
                .await?
                .with_transport(transport);
        info!("Connected to {} as {}", host, credentials.username);
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides() {
        let opener = SshOpener::new()
            .unwrap()
            .port(2222)
            .timeout(Duration::from_secs(5))
            .host_key_verification(HostKeyVerification::Disabled);
        let credentials = Credentials::new("admin", "cisco", "class");

        let config = opener.ssh_config("10.0.0.1", &credentials);
        assert_eq!(config.socket_addr(), "10.0.0.1:2222");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.username, "admin");
        assert_eq!(config.password.expose_secret(), "cisco");
        assert_eq!(config.host_key_verification, HostKeyVerification::Disabled);
    }

    #[tokio::test]
    async fn test_unreachable_host() {
        // Port 9 on loopback: nothing listens, connect is refused.
        let opener = SshOpener::new()
            .unwrap()
            .port(9)
            .timeout(Duration::from_secs(2));
        let credentials = Credentials::new("admin", "cisco", "class");

        let err = opener.open("127.0.0.1", &credentials).await.err().unwrap();
        assert_eq!(err.kind(), crate::error::ErrorKind::Unreachable);
    }
}
