//! # netdeploy
//!
//! Table-driven configuration rollout for small Cisco networks.
//!
//! Rows of a CSV table describe VLANs, addresses and ports. netdeploy turns
//! them into IOS configuration and either pushes it over SSH (switches) or
//! writes it to a file for pasting (routers). Pushed switches back up their
//! running-config to a TFTP listener the crate can host itself. A separate
//! runner provisions Shelly smart plugs over their HTTP settings API.
//!
//! ## Features
//!
//! - Async SSH sessions via russh, with IOS privilege handling
//! - Pure configuration builders, testable without a device
//! - Per-row failure policy for every runner
//! - Write-only TFTP server for running-config backups
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use netdeploy::{Credentials, FailurePolicy, RunConfig, SshOpener};
//! use netdeploy::source::SwitchRow;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), netdeploy::Error> {
//!     let config = RunConfig::load("netdeploy.toml")?;
//!     let credentials = Credentials::from_secrets_file("secrets.toml")?;
//!     let rows = SwitchRow::read(&config.switch.input, config.switch.delimiter_byte()?)?;
//!
//!     let opener = SshOpener::from_settings(&config.session)?;
//!     let report = netdeploy::deploy::deploy_switches(
//!         &config,
//!         &rows,
//!         &opener,
//!         &credentials,
//!         &FailurePolicy::ContinueAll,
//!     )
//!     .await?;
//!
//!     println!("{} rows configured", report.succeeded());
//!     Ok(())
//! }
//! ```

pub mod archive;
pub mod assemble;
pub mod builder;
pub mod channel;
pub mod config;
pub mod deploy;
pub mod driver;
pub mod error;
pub mod platform;
pub mod plug;
pub mod source;
pub mod tftp;
pub mod transport;

// Re-export main types for convenience
pub use builder::CommandList;
pub use config::{Credentials, RunConfig};
pub use deploy::{FailurePolicy, RunReport};
pub use driver::{DeviceSession, SessionOpener, SshOpener};
pub use error::{Error, ErrorKind, Result};
