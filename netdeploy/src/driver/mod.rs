//! Device sessions: privilege handling and command transmission.
//!
//! [`DeviceSession`] is the seam between the runners and the network. The
//! SSH implementation is [`CiscoSession`] over a russh channel, opened by
//! [`SshOpener`]; tests substitute scripted sessions.

mod builder;
mod interactive;
pub(crate) mod response;
mod session;

pub use builder::{SshOpener, SshSession};
pub use interactive::{InteractiveEvent, InteractiveResult, InteractiveStep};
pub use response::{ApplyReport, Response};
pub use session::CiscoSession;

use std::future::Future;

use secrecy::SecretString;

use crate::builder::CommandList;
use crate::config::Credentials;
use crate::error::Result;

/// An open, authenticated CLI session on one device.
pub trait DeviceSession: Send {
    /// Address the session is connected to.
    fn host(&self) -> &str;

    /// Enter privileged mode, answering the password prompt with `secret`.
    ///
    /// A no-op when the session already is privileged.
    fn elevate(&mut self, secret: &SecretString) -> impl Future<Output = Result<()>> + Send;

    /// Send `commands` in configuration mode.
    ///
    /// Statements the device rejects are recorded in the report and do not
    /// stop the rest of the list. Requires a prior [`elevate`](Self::elevate).
    fn apply(&mut self, commands: &CommandList) -> impl Future<Output = Result<ApplyReport>> + Send;

    /// Send an interactive command sequence.
    ///
    /// Each event's input is sent, then its pattern is awaited before the
    /// next event. Used for commands that ask questions, like `copy`.
    ///
    /// ```rust,no_run
    /// use netdeploy::driver::{DeviceSession, InteractiveEvent};
    ///
    /// # async fn example(session: &mut impl DeviceSession) -> Result<(), netdeploy::Error> {
    /// let events = vec![
    ///     InteractiveEvent::new("copy running-config startup-config", r"Destination filename")?,
    ///     InteractiveEvent::new("", r"#\s?$")?,
    /// ];
    /// let result = session.send_interactive(&events).await?;
    /// # Ok(())
    /// # }
    /// ```
    fn send_interactive(
        &mut self,
        events: &[InteractiveEvent],
    ) -> impl Future<Output = Result<InteractiveResult>> + Send;

    /// Close the session and its connection.
    fn close(self) -> impl Future<Output = Result<()>> + Send;
}

/// Opens sessions to devices by address.
pub trait SessionOpener: Send + Sync {
    type Session: DeviceSession;

    /// Connect and log in. Fails with an `Auth` or `Unreachable` kind error.
    fn open(
        &self,
        host: &str,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<Self::Session>> + Send;
}
