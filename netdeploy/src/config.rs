//! Run configuration.
//!
//! Everything a run needs is collected in one [`RunConfig`], built once at
//! process start and passed by reference to each component. Values left out
//! of the TOML file fall back to the defaults of the lab the tables were
//! written for.
//!
//! ```toml
//! [switch]
//! input = "BST-D-1-242.csv"
//! host_prefix = "192.168.1."
//! gateway = { last_octet = 1 }
//!
//! [archive]
//! server = "192.168.1.2"
//! root = "tftp"
//! ```

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;

use crate::builder::{GatewayPolicy, PortNaming};
use crate::error::ConfigError;
use crate::transport::HostKeyVerification;

/// Top-level run configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub session: SessionSettings,
    pub switch: SwitchSettings,
    pub router: RouterSettings,
    pub archive: ArchiveSettings,
    pub plug: PlugSettings,
}

impl RunConfig {
    /// Load a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check settings that serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.switch.delimiter_byte()?;
        self.router.delimiter_byte()?;
        if self.archive.enabled && self.archive.server.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: "archive.server is required when archiving is enabled".to_string(),
            });
        }
        if !self.archive.filename_pattern.contains("{id}") {
            return Err(ConfigError::Invalid {
                message: "archive.filename_pattern must contain {id}".to_string(),
            });
        }
        Ok(())
    }
}

/// SSH session settings shared by every device.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub port: u16,
    pub timeout_secs: u64,
    pub host_key_verification: HostKeyVerification,
    pub known_hosts: Option<PathBuf>,
}

impl SessionSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            port: 22,
            timeout_secs: 30,
            host_key_verification: HostKeyVerification::default(),
            known_hosts: None,
        }
    }
}

/// Switch table settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SwitchSettings {
    pub input: PathBuf,
    pub delimiter: char,
    /// Switch address is this prefix followed by the row's `Switch` value.
    pub host_prefix: String,
    pub port_naming: PortNaming,
    /// Ports used by the trunk path when the row names none.
    pub trunk_ports: String,
    pub trunk_keywords: Vec<String>,
    pub management_keywords: Vec<String>,
    pub management_interface: String,
    pub gateway: GatewayPolicy,
    pub ip_routing: bool,
    /// Egress interface of the NAT overload trailer appended when
    /// assembling a whole table. `None` or an empty name leaves the
    /// trailer out.
    pub nat_egress_interface: Option<String>,
}

impl SwitchSettings {
    /// The delimiter as the byte the CSV reader expects.
    pub fn delimiter_byte(&self) -> Result<u8, ConfigError> {
        ascii_delimiter("switch.delimiter", self.delimiter)
    }

    /// Management address of the switch identified by `id`.
    pub fn host_for(&self, id: &str) -> String {
        format!("{}{}", self.host_prefix, id.trim())
    }
}

impl Default for SwitchSettings {
    fn default() -> Self {
        Self {
            input: PathBuf::from("BST-D-1-242.csv"),
            delimiter: ';',
            host_prefix: "192.168.1.".to_string(),
            port_naming: PortNaming::default(),
            trunk_ports: "1-24".to_string(),
            trunk_keywords: vec!["trunk".to_string(), "uplink".to_string()],
            management_keywords: vec!["management".to_string()],
            management_interface: "vlan 1".to_string(),
            gateway: GatewayPolicy::default(),
            ip_routing: true,
            nat_egress_interface: Some("gi0/0".to_string()),
        }
    }
}

/// Router table settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RouterSettings {
    pub input: PathBuf,
    pub delimiter: char,
    pub output: PathBuf,
    pub egress_interface: String,
}

impl RouterSettings {
    /// The delimiter as the byte the CSV reader expects.
    pub fn delimiter_byte(&self) -> Result<u8, ConfigError> {
        ascii_delimiter("router.delimiter", self.delimiter)
    }
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            input: PathBuf::from("config.csv"),
            delimiter: ';',
            output: PathBuf::from("cisco_config.txt"),
            egress_interface: "gi0/0".to_string(),
        }
    }
}

/// Running-config backup settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArchiveSettings {
    pub enabled: bool,
    /// Address the devices copy to.
    pub server: String,
    /// Start the built-in TFTP listener.
    pub listen: bool,
    pub listen_addr: SocketAddr,
    pub root: PathBuf,
    /// `{id}` is replaced by the row's switch id.
    pub filename_pattern: String,
    pub timeout_secs: u64,
}

impl ArchiveSettings {
    pub fn filename_for(&self, id: &str) -> String {
        self.filename_pattern.replace("{id}", id.trim())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ArchiveSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            server: "192.168.1.2".to_string(),
            listen: true,
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 69)),
            root: PathBuf::from("tftp"),
            filename_pattern: "switch_{id}_config.cfg".to_string(),
            timeout_secs: 60,
        }
    }
}

/// Shelly plug provisioning settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlugSettings {
    pub family_name: String,
    pub first_name: String,
    pub cloud: bool,
    pub mqtt_broker: String,
    pub max_power: u32,
    /// Relay state after power loss and LED state.
    pub default_state: String,
    /// Station network the plug joins.
    pub wifi_ssid: String,
    pub wifi_password_file: PathBuf,
    pub ip_method: String,
    /// SSID fragment identifying plugs in access-point mode.
    pub ap_marker: String,
    /// Base URL of a plug in access-point mode.
    pub ap_address: String,
    pub timeout_secs: u64,
}

impl PlugSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for PlugSettings {
    fn default() -> Self {
        Self {
            family_name: String::new(),
            first_name: String::new(),
            cloud: false,
            mqtt_broker: "172.23.83.254:1883".to_string(),
            max_power: 2200,
            default_state: "off".to_string(),
            wifi_ssid: "Howest-IoT".to_string(),
            wifi_password_file: PathBuf::from("password2.txt"),
            ip_method: "dhcp".to_string(),
            ap_marker: "shellyplug".to_string(),
            ap_address: "http://192.168.33.1".to_string(),
            timeout_secs: 10,
        }
    }
}

fn ascii_delimiter(name: &str, delimiter: char) -> Result<u8, ConfigError> {
    u8::try_from(delimiter)
        .ok()
        .filter(u8::is_ascii)
        .ok_or_else(|| ConfigError::Invalid {
            message: format!("{name} must be a single ASCII character"),
        })
}

/// Login credentials for the switches.
#[derive(Debug)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
    /// Enable secret.
    pub secret: SecretString,
}

impl Credentials {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
            secret: SecretString::from(secret.into()),
        }
    }

    /// Read credentials from a TOML secrets file with `username`,
    /// `password` and `secret` keys.
    pub fn from_secrets_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let raw: RawCredentials = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(raw.username, raw.password, raw.secret))
    }
}

#[derive(Deserialize)]
struct RawCredentials {
    username: String,
    password: String,
    secret: String,
}

/// Read a single secret from a file, dropping the trailing newline.
pub fn read_secret_file(path: impl AsRef<Path>) -> Result<SecretString, ConfigError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(SecretString::from(
        text.trim_end_matches(['\r', '\n']).to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::net::Ipv4Addr;

    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = RunConfig::default();
        assert_eq!(config.switch.host_for("12"), "192.168.1.12");
        assert_eq!(
            config.archive.filename_for("12"),
            "switch_12_config.cfg"
        );
        assert_eq!(config.router.egress_interface, "gi0/0");
        assert_eq!(config.switch.nat_egress_interface.as_deref(), Some("gi0/0"));
        assert_eq!(config.plug.max_power, 2200);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_delimiter_must_be_ascii() {
        let mut config = RunConfig::default();
        assert_eq!(config.switch.delimiter_byte().unwrap(), b';');

        config.router.delimiter = '\u{1F4}';
        assert!(matches!(
            config.router.delimiter_byte(),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(config.validate().is_err());

        config.router.delimiter = '\u{e9}';
        assert!(config.router.delimiter_byte().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: RunConfig = toml::from_str(
            r#"
            [switch]
            host_prefix = "10.1.1."
            port_naming = "GigabitEthernet1/0/"
            gateway = { fixed = "10.1.1.254" }

            [archive]
            server = "10.1.1.2"
            listen_addr = "127.0.0.1:6969"
            "#,
        )
        .unwrap();

        assert_eq!(config.switch.host_for("4"), "10.1.1.4");
        assert_eq!(
            config.switch.port_naming.interface(3),
            "GigabitEthernet1/0/3"
        );
        assert_eq!(
            config.switch.gateway,
            GatewayPolicy::Fixed(Ipv4Addr::new(10, 1, 1, 254))
        );
        assert_eq!(config.switch.trunk_ports, "1-24");
        assert_eq!(config.archive.listen_addr.port(), 6969);
        assert_eq!(config.session.port, 22);
    }

    #[test]
    fn test_validate_rejects_pattern_without_id() {
        let mut config = RunConfig::default();
        config.archive.filename_pattern = "backup.cfg".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn test_secrets_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "username = \"admin\"\npassword = \"hunter2\"\nsecret = \"enable\""
        )
        .unwrap();

        let creds = Credentials::from_secrets_file(file.path()).unwrap();
        assert_eq!(creds.username, "admin");
        assert_eq!(creds.password.expose_secret(), "hunter2");
        assert_eq!(creds.secret.expose_secret(), "enable");
        assert!(!format!("{creds:?}").contains("hunter2"));
    }

    #[test]
    fn test_read_secret_file_trims_newline() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "wifi-pass").unwrap();
        let secret = read_secret_file(file.path()).unwrap();
        assert_eq!(secret.expose_secret(), "wifi-pass");
    }
}
