//! SSH transport layer wrapping russh.
//!
//! Connection setup, host key checking, password authentication and
//! opening the interactive shell channel the session layer talks to.

pub mod config;
mod ssh;

pub use config::{HostKeyVerification, SshConfig};
pub use ssh::SshTransport;
