//! Running-config backup over TFTP.
//!
//! The device pushes its own configuration with `copy running-config
//! tftp://server/filename` and asks two questions on the way, both answered
//! with the defaults the command line already supplied.

use std::time::Duration;

use log::{error, info};

use crate::config::ArchiveSettings;
use crate::driver::{DeviceSession, InteractiveEvent, InteractiveResult};
use crate::error::{ArchiveError, Error, Result};

const REMOTE_HOST_QUESTION: &str = r"(?i)remote host.*\?\s*$";
const FILENAME_QUESTION: &str = r"(?i)destination filename.*\?\s*$";
const PRIVILEGED_PROMPT: &str = r"(?m)^[\w.\-@()/: ]{1,63}#\s?$";

/// Triggers running-config backups to one TFTP server.
#[derive(Debug, Clone)]
pub struct Archiver {
    server: String,
    pattern: String,
    timeout: Duration,
}

impl Archiver {
    pub fn new(server: impl Into<String>, timeout: Duration) -> Self {
        Self {
            server: server.into(),
            pattern: "switch_{id}_config.cfg".to_string(),
            timeout,
        }
    }

    pub fn from_settings(settings: &ArchiveSettings) -> Self {
        Self {
            server: settings.server.clone(),
            pattern: settings.filename_pattern.clone(),
            timeout: settings.timeout(),
        }
    }

    /// Backup filename for the switch with id `id`.
    pub fn filename_for(&self, id: &str) -> String {
        self.pattern.replace("{id}", id.trim())
    }

    /// The copy command for `filename`.
    pub fn copy_command(&self, filename: &str) -> String {
        format!("copy running-config tftp://{}/{}", self.server, filename)
    }

    fn events(&self, filename: &str) -> Result<Vec<InteractiveEvent>> {
        Ok(vec![
            InteractiveEvent::new(self.copy_command(filename), REMOTE_HOST_QUESTION)?,
            InteractiveEvent::new("", FILENAME_QUESTION)?,
            InteractiveEvent::new("", PRIVILEGED_PROMPT)?.with_timeout(self.timeout),
        ])
    }

    /// Copy the running configuration of `session` to `filename` on the
    /// server. Never retried; the caller decides what a failure means.
    pub async fn archive<S: DeviceSession>(
        &self,
        session: &mut S,
        filename: &str,
    ) -> Result<InteractiveResult> {
        let events = self.events(filename)?;
        let result = session
            .send_interactive(&events)
            .await
            .map_err(|e| {
                error!("{}: backup to {} interrupted: {}", session.host(), filename, e);
                ArchiveError::Interrupted {
                    filename: filename.to_string(),
                    source: Box::new(e),
                }
            })?;

        let output = result.full_output();
        if let Some(line) = output
            .lines()
            .find(|l| l.contains("%Error") || l.contains("% Error"))
        {
            error!("{}: backup to {} failed: {}", session.host(), filename, line);
            return Err(Error::from(ArchiveError::TransferFailed {
                filename: filename.to_string(),
                message: line.trim().to_string(),
            }));
        }

        info!(
            "{}: running-config saved as tftp://{}/{}",
            session.host(),
            self.server,
            filename
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_and_command() {
        let archiver = Archiver::from_settings(&ArchiveSettings::default());
        let filename = archiver.filename_for(" 7 ");
        assert_eq!(filename, "switch_7_config.cfg");
        assert_eq!(
            archiver.copy_command(&filename),
            "copy running-config tftp://192.168.1.2/switch_7_config.cfg"
        );
    }

    #[test]
    fn test_events_answer_both_questions() {
        let archiver = Archiver::new("10.0.0.2", Duration::from_secs(5));
        let events = archiver.events("a.cfg").unwrap();

        assert_eq!(events.len(), 3);
        assert!(events[0].pattern.is_match(b"Address or name of remote host [10.0.0.2]? "));
        assert_eq!(events[1].input, "");
        assert!(events[1].pattern.is_match(b"Destination filename [a.cfg]? "));
        assert!(events[2].pattern.is_match(b"1030 bytes copied\r\nSwitch#"));
        assert_eq!(events[2].timeout, Some(Duration::from_secs(5)));
    }
}
