//! Results of sending statements to a device.

use std::time::Duration;

/// Response from a single statement.
#[derive(Debug, Clone)]
pub struct Response {
    /// The statement that was sent.
    pub command: String,

    /// Device output with the echo and trailing prompt removed.
    pub result: String,

    /// Output exactly as read.
    pub raw_result: String,

    /// The prompt that ended the output.
    pub prompt: String,

    pub elapsed: Duration,

    /// Set when the output contained one of the platform's failure markers.
    pub failure_message: Option<String>,
}

impl Response {
    pub fn new(
        command: impl Into<String>,
        result: impl Into<String>,
        raw_result: impl Into<String>,
        prompt: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        Self {
            command: command.into(),
            result: result.into(),
            raw_result: raw_result.into(),
            prompt: prompt.into(),
            elapsed,
            failure_message: None,
        }
    }

    /// Mark this response as rejected by the device.
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.failure_message = Some(message.into());
        self
    }

    pub fn is_success(&self) -> bool {
        self.failure_message.is_none()
    }
}

impl std::fmt::Display for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.result)
    }
}

/// Outcome of applying a command list.
#[derive(Debug, Clone, Default)]
pub struct ApplyReport {
    /// One response per statement, in order sent.
    pub responses: Vec<Response>,
    pub elapsed: Duration,
}

impl ApplyReport {
    pub fn new(responses: Vec<Response>, elapsed: Duration) -> Self {
        Self { responses, elapsed }
    }

    /// Statements the device rejected.
    pub fn failures(&self) -> impl Iterator<Item = &Response> {
        self.responses.iter().filter(|r| !r.is_success())
    }

    /// True when every statement was accepted.
    pub fn is_clean(&self) -> bool {
        self.failures().next().is_none()
    }

    /// Number of statements sent.
    pub fn sent(&self) -> usize {
        self.responses.len()
    }
}
