//! IOS CLI session over an interactive shell stream.

use std::time::Instant;

use log::{debug, info, warn};
use regex::bytes::Regex;
use secrecy::{ExposeSecret, SecretString};
use tokio::io::{AsyncRead, AsyncWrite};

use super::DeviceSession;
use super::interactive::{InteractiveEvent, InteractiveResult, InteractiveStep};
use super::response::{ApplyReport, Response};
use crate::builder::CommandList;
use crate::channel::{PtyChannel, PtyConfig, last_line};
use crate::error::{ChannelError, DriverError, Result};
use crate::platform::{Mode, PlatformDefinition};
use crate::transport::SshTransport;

/// A logged-in IOS shell.
///
/// Tracks the CLI mode from every prompt it reads, so [`apply`] knows
/// whether it still has to enter configuration mode.
///
/// [`apply`]: DeviceSession::apply
pub struct CiscoSession<S> {
    host: String,
    channel: PtyChannel<S>,
    platform: PlatformDefinition,
    mode: Mode,

    /// Keeps the SSH connection alive; absent for in-memory streams.
    transport: Option<SshTransport>,
}

impl<S> CiscoSession<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Wait for the first prompt on `stream` and run the platform's
    /// on-open commands.
    pub async fn establish(
        host: impl Into<String>,
        stream: S,
        platform: PlatformDefinition,
        config: PtyConfig,
    ) -> Result<Self> {
        let mut channel = PtyChannel::new(stream, config);
        let data = channel.read_until(platform.prompt_pattern(), None).await?;
        let prompt = String::from_utf8_lossy(last_line(&data)).into_owned();
        let mode = platform
            .mode_for(&prompt)
            .ok_or(DriverError::UnknownPrivilege { prompt })?;

        let mut session = Self {
            host: host.into(),
            channel,
            platform,
            mode,
            transport: None,
        };
        debug!("{}: session open in {} mode", session.host, session.mode);

        for command in session.platform.on_open_commands.clone() {
            session.send_command(&command).await?;
        }
        Ok(session)
    }

    /// Attach the SSH connection the stream runs over.
    pub fn with_transport(mut self, transport: SshTransport) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Current CLI mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Send one statement and wait for any prompt.
    pub async fn send_command(&mut self, command: &str) -> Result<Response> {
        let start = Instant::now();
        self.channel.send(command).await?;
        let data = self
            .channel
            .read_until(self.platform.prompt_pattern(), None)
            .await?;

        let raw = String::from_utf8_lossy(&data).into_owned();
        let prompt = self.track_mode(&data);
        let result = normalize_output(&raw, command);
        let response = Response::new(command, result, raw, prompt, start.elapsed());

        match self.platform.detect_failure(&response.result) {
            Some(marker) => {
                let marker = marker.to_string();
                Ok(response.with_failure(marker))
            }
            None => Ok(response),
        }
    }

    /// Update the tracked mode from the prompt ending `data`.
    fn track_mode(&mut self, data: &[u8]) -> String {
        let prompt = String::from_utf8_lossy(last_line(data)).into_owned();
        if let Some(mode) = self.platform.mode_for(&prompt) {
            self.mode = mode;
        }
        prompt
    }

    fn level_command(&self, mode: Mode, escalate: bool) -> String {
        let level = self.platform.level(mode);
        let command = if escalate {
            level.and_then(|l| l.escalate_command.clone())
        } else {
            level.and_then(|l| l.deescalate_command.clone())
        };
        command.unwrap_or_else(|| match (mode, escalate) {
            (Mode::Privileged, true) => "enable".to_string(),
            (Mode::Configuration, true) => "configure terminal".to_string(),
            _ => "end".to_string(),
        })
    }

    async fn enter_configuration(&mut self) -> Result<()> {
        let command = self.level_command(Mode::Configuration, true);
        self.send_command(&command).await?;
        if self.mode != Mode::Configuration {
            return Err(DriverError::PrivilegeAcquisitionFailed {
                target: Mode::Configuration.to_string(),
            }
            .into());
        }
        Ok(())
    }
}

impl<S> DeviceSession for CiscoSession<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    fn host(&self) -> &str {
        &self.host
    }

    async fn elevate(&mut self, secret: &SecretString) -> Result<()> {
        match self.mode {
            Mode::Privileged => return Ok(()),
            Mode::Configuration => {
                let command = self.level_command(Mode::Configuration, false);
                self.send_command(&command).await?;
                return Ok(());
            }
            Mode::Exec => {}
        }

        let failed = || DriverError::PrivilegeAcquisitionFailed {
            target: Mode::Privileged.to_string(),
        };
        let command = self.level_command(Mode::Privileged, true);
        let auth_prompt = self
            .platform
            .level(Mode::Privileged)
            .and_then(|l| l.escalate_prompt.clone());

        // Either the password question or straight to a prompt.
        let expect = match &auth_prompt {
            Some(auth) => Regex::new(&format!(
                "(?:{})|(?:{})",
                auth.as_str(),
                self.platform.prompt_pattern().as_str()
            ))
            .map_err(ChannelError::from)?,
            None => self.platform.prompt_pattern().clone(),
        };

        self.channel.send(&command).await?;
        let mut data = self.channel.read_until(&expect, None).await?;

        if let Some(auth) = &auth_prompt {
            if auth.is_match(last_line(&data)) {
                debug!("{}: sending enable secret", self.host);
                self.channel.send(secret.expose_secret()).await?;
                data = self.channel.read_until(&expect, None).await?;
                if auth.is_match(last_line(&data)) {
                    warn!("{}: enable secret rejected", self.host);
                    return Err(failed().into());
                }
            }
        }

        self.track_mode(&data);
        if self.mode != Mode::Privileged {
            return Err(failed().into());
        }
        info!("{}: privileged mode acquired", self.host);
        Ok(())
    }

    async fn apply(&mut self, commands: &CommandList) -> Result<ApplyReport> {
        if self.mode < Mode::Privileged {
            return Err(DriverError::NotElevated.into());
        }

        let start = Instant::now();
        if self.mode != Mode::Configuration {
            self.enter_configuration().await?;
        }

        let mut responses = Vec::with_capacity(commands.len());
        for statement in commands.iter() {
            let response = self.send_command(statement).await?;
            if let Some(marker) = &response.failure_message {
                warn!("{}: '{}' rejected ({})", self.host, statement, marker);
            }
            responses.push(response);
        }

        if self.mode == Mode::Configuration {
            let command = self.level_command(Mode::Configuration, false);
            self.send_command(&command).await?;
        }

        let report = ApplyReport::new(responses, start.elapsed());
        info!(
            "{}: applied {} statements ({} rejected) in {:?}",
            self.host,
            report.sent(),
            report.failures().count(),
            report.elapsed
        );
        Ok(report)
    }

    async fn send_interactive(&mut self, events: &[InteractiveEvent]) -> Result<InteractiveResult> {
        let start = Instant::now();
        let mut steps = Vec::with_capacity(events.len());

        for event in events {
            let step_start = Instant::now();
            debug!("{}: sending '{}'", self.host, event.display_input());
            self.channel.send(&event.input).await?;
            let data = self.channel.read_until(&event.pattern, event.timeout).await?;

            let raw = String::from_utf8_lossy(&data);
            self.track_mode(&data);
            let output = normalize_output(&raw, &event.input);
            let failure_message = self.platform.detect_failure(&output).map(str::to_string);

            steps.push(InteractiveStep {
                input: event.display_input().to_string(),
                output,
                elapsed: step_start.elapsed(),
                failure_message,
            });
        }

        Ok(InteractiveResult::new(steps, start.elapsed()))
    }

    async fn close(mut self) -> Result<()> {
        if let Err(e) = self.channel.shutdown().await {
            debug!("{}: shell shutdown failed: {}", self.host, e);
        }
        if let Some(transport) = self.transport.take() {
            transport.close().await?;
        }
        debug!("{}: session closed", self.host);
        Ok(())
    }
}

/// Strip the echoed command and the trailing prompt line.
fn normalize_output(raw: &str, command: &str) -> String {
    let mut lines: Vec<&str> = raw.lines().map(|l| l.trim_end_matches('\r')).collect();
    lines.pop();
    if let Some(first) = lines.first() {
        if first.trim() == command.trim() {
            lines.remove(0);
        }
    }
    lines.join("\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::platform::cisco_ios;
    use tokio_test::io::{Builder, Mock};

    async fn session(mock: Mock) -> CiscoSession<Mock> {
        CiscoSession::establish("192.168.1.12", mock, cisco_ios::platform().unwrap(), PtyConfig::default())
            .await
            .unwrap()
    }

    fn login(builder: &mut Builder, prompt: &str) {
        builder
            .read(format!("\r\nUser Access Verification\r\n\r\n{prompt}").as_bytes())
            .write(b"terminal length 0\n")
            .read(format!("terminal length 0\r\n{prompt}").as_bytes());
    }

    #[test]
    fn test_normalize_output() {
        assert_eq!(
            normalize_output("show clock\r\n*10:00:00 UTC\r\nSwitch#", "show clock"),
            "*10:00:00 UTC"
        );
        assert_eq!(normalize_output("\r\nSwitch#", ""), "");
        assert_eq!(
            normalize_output("vlan 99999\r\n% Invalid input detected\r\nSwitch(config)#", "vlan 99999"),
            "% Invalid input detected"
        );
    }

    #[tokio::test]
    async fn test_establish_detects_mode() {
        let mut builder = Builder::new();
        login(&mut builder, "Switch>");
        let session = session(builder.build()).await;
        assert_eq!(session.mode(), Mode::Exec);
    }

    #[tokio::test]
    async fn test_elevate_with_secret() {
        let mut builder = Builder::new();
        login(&mut builder, "Switch>");
        builder
            .write(b"enable\n")
            .read(b"enable\r\nPassword: ")
            .write(b"class\n")
            .read(b"\r\nSwitch#");
        let mut session = session(builder.build()).await;

        session
            .elevate(&SecretString::from("class".to_string()))
            .await
            .unwrap();
        assert_eq!(session.mode(), Mode::Privileged);
    }

    #[tokio::test]
    async fn test_elevate_bad_secret() {
        let mut builder = Builder::new();
        login(&mut builder, "Switch>");
        builder
            .write(b"enable\n")
            .read(b"enable\r\nPassword: ")
            .write(b"wrong\n")
            .read(b"\r\nPassword: ");
        let mut session = session(builder.build()).await;

        let err = session
            .elevate(&SecretString::from("wrong".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Driver(DriverError::PrivilegeAcquisitionFailed { .. })
        ));
        assert_eq!(err.kind(), crate::error::ErrorKind::Auth);
    }

    #[tokio::test]
    async fn test_elevate_noop_when_privileged() {
        let mut builder = Builder::new();
        login(&mut builder, "Switch#");
        let mut session = session(builder.build()).await;

        tokio_test::assert_ok!(
            session
                .elevate(&SecretString::from("unused".to_string()))
                .await
        );
    }

    #[tokio::test]
    async fn test_apply_requires_elevation() {
        let mut builder = Builder::new();
        login(&mut builder, "Switch>");
        let mut session = session(builder.build()).await;

        let commands: CommandList = ["vlan 10"].into_iter().collect();
        let err = session.apply(&commands).await.unwrap_err();
        assert!(matches!(err, Error::Driver(DriverError::NotElevated)));
    }

    #[tokio::test]
    async fn test_apply_records_rejections_and_continues() {
        let mut builder = Builder::new();
        login(&mut builder, "Switch#");
        builder
            .write(b"configure terminal\n")
            .read(b"configure terminal\r\nEnter configuration commands, one per line.  End with CNTL/Z.\r\nSwitch(config)#")
            .write(b"vlan 10\n")
            .read(b"vlan 10\r\nSwitch(config-vlan)#")
            .write(b"nmae Data\n")
            .read(b"nmae Data\r\n       ^\r\n% Invalid input detected at '^' marker.\r\n\r\nSwitch(config-vlan)#")
            .write(b"name Data\n")
            .read(b"name Data\r\nSwitch(config-vlan)#")
            .write(b"end\n")
            .read(b"end\r\nSwitch#");
        let mut session = session(builder.build()).await;

        let commands: CommandList = ["vlan 10", "nmae Data", "name Data"].into_iter().collect();
        let report = session.apply(&commands).await.unwrap();

        assert_eq!(report.sent(), 3);
        let failed: Vec<_> = report.failures().map(|r| r.command.as_str()).collect();
        assert_eq!(failed, vec!["nmae Data"]);
        assert_eq!(session.mode(), Mode::Privileged);
    }

    #[tokio::test]
    async fn test_send_interactive_follows_questions() {
        let mut builder = Builder::new();
        login(&mut builder, "Switch#");
        builder
            .write(b"copy running-config tftp://192.168.1.2/switch_1_config.cfg\n")
            .read(b"copy running-config tftp://192.168.1.2/switch_1_config.cfg\r\nAddress or name of remote host [192.168.1.2]? ")
            .write(b"\n")
            .read(b"\r\nDestination filename [switch_1_config.cfg]? ")
            .write(b"\n")
            .read(b"\r\n!!\r\n1030 bytes copied in 1.2 secs (858 bytes/sec)\r\nSwitch#");
        let mut session = session(builder.build()).await;

        let events = vec![
            InteractiveEvent::new(
                "copy running-config tftp://192.168.1.2/switch_1_config.cfg",
                r"(?i)remote host.*\?\s*$",
            )
            .unwrap(),
            InteractiveEvent::new("", r"(?i)destination filename.*\?\s*$").unwrap(),
            InteractiveEvent::new("", r"(?m)^Switch#\s?$").unwrap(),
        ];
        let result = session.send_interactive(&events).await.unwrap();

        assert!(!result.failed);
        assert_eq!(result.steps.len(), 3);
        assert!(result.final_output().unwrap().contains("bytes copied"));
    }
}
