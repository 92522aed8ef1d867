//! Interactive command sequences.
//!
//! Some IOS commands ask questions before they run. `copy running-config
//! tftp:` asks for the remote host and the destination filename, and
//! `enable` asks for a password. An [`InteractiveEvent`] pairs the input to
//! send with the pattern that marks the device's next question or prompt.

use std::time::Duration;

use regex::bytes::Regex;

use crate::error::ChannelError;

/// One input and the pattern to wait for after sending it.
#[derive(Debug, Clone)]
pub struct InteractiveEvent {
    pub input: String,
    pub pattern: Regex,

    /// Mask the input in logs and results.
    pub hidden: bool,

    /// Overrides the session's read timeout for this event.
    pub timeout: Option<Duration>,
}

impl InteractiveEvent {
    pub fn new(input: impl Into<String>, pattern: &str) -> Result<Self, ChannelError> {
        Ok(Self {
            input: input.into(),
            pattern: Regex::new(pattern)?,
            hidden: false,
            timeout: None,
        })
    }

    /// Create an event whose input is never logged, like a password.
    pub fn hidden(input: impl Into<String>, pattern: &str) -> Result<Self, ChannelError> {
        Ok(Self {
            hidden: true,
            ..Self::new(input, pattern)?
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Input as it may appear in logs.
    pub fn display_input(&self) -> &str {
        if self.hidden { "********" } else { &self.input }
    }
}

/// Result of an interactive command sequence.
#[derive(Debug, Clone)]
pub struct InteractiveResult {
    pub steps: Vec<InteractiveStep>,
    pub elapsed: Duration,

    /// Whether any step failed.
    pub failed: bool,
}

impl InteractiveResult {
    pub fn new(steps: Vec<InteractiveStep>, elapsed: Duration) -> Self {
        let failed = steps.iter().any(|s| s.failure_message.is_some());
        Self {
            steps,
            elapsed,
            failed,
        }
    }

    /// Output of the last step.
    pub fn final_output(&self) -> Option<&str> {
        self.steps.last().map(|s| s.output.as_str())
    }

    /// All outputs joined by newlines.
    pub fn full_output(&self) -> String {
        self.steps
            .iter()
            .map(|s| s.output.as_str())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// First failure message, if any step failed.
    pub fn failure_message(&self) -> Option<&str> {
        self.steps.iter().find_map(|s| s.failure_message.as_deref())
    }
}

/// Result of a single step in an interactive sequence.
#[derive(Debug, Clone)]
pub struct InteractiveStep {
    /// The input that was sent, masked if hidden.
    pub input: String,
    pub output: String,
    pub elapsed: Duration,
    pub failure_message: Option<String>,
}
