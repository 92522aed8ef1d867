//! Privilege level definition.

use std::fmt;

use regex::bytes::Regex;

/// CLI mode of an IOS session, ordered from least to most privileged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Mode {
    /// User EXEC, `Switch>`
    Exec,
    /// Privileged EXEC, `Switch#`
    Privileged,
    /// Global or sub-mode configuration, `Switch(config-if)#`
    Configuration,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Exec => "exec",
            Mode::Privileged => "privileged",
            Mode::Configuration => "configuration",
        };
        f.write_str(name)
    }
}

/// Prompt pattern for one mode plus how to get in and out of it.
#[derive(Debug, Clone)]
pub struct PrivilegeLevel {
    pub mode: Mode,

    /// Matches the prompt line of this mode.
    pub pattern: Regex,

    /// Sent from the next lower mode to enter this one.
    pub escalate_command: Option<String>,

    /// Sent from this mode to return to the next lower one.
    pub deescalate_command: Option<String>,

    /// Set when entering this mode asks for a password.
    pub escalate_prompt: Option<Regex>,

    /// Strings that must NOT be in the prompt for this level to match.
    /// `#` ends both privileged and configuration prompts.
    pub not_contains: Vec<String>,
}

impl PrivilegeLevel {
    pub fn new(mode: Mode, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            mode,
            pattern: Regex::new(pattern)?,
            escalate_command: None,
            deescalate_command: None,
            escalate_prompt: None,
            not_contains: vec![],
        })
    }

    pub fn with_escalate(mut self, command: impl Into<String>) -> Self {
        self.escalate_command = Some(command.into());
        self
    }

    pub fn with_deescalate(mut self, command: impl Into<String>) -> Self {
        self.deescalate_command = Some(command.into());
        self
    }

    /// Escalation into this level asks for a password matching `prompt_pattern`.
    pub fn with_auth(mut self, prompt_pattern: &str) -> Result<Self, regex::Error> {
        self.escalate_prompt = Some(Regex::new(prompt_pattern)?);
        Ok(self)
    }

    pub fn with_not_contains(mut self, pattern: impl Into<String>) -> Self {
        self.not_contains.push(pattern.into());
        self
    }

    /// Check if this privilege level matches a prompt.
    pub fn matches(&self, prompt: &str) -> bool {
        if self.not_contains.iter().any(|nc| prompt.contains(nc.as_str())) {
            return false;
        }
        self.pattern.is_match(prompt.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_order() {
        assert!(Mode::Exec < Mode::Privileged);
        assert!(Mode::Privileged < Mode::Configuration);
        assert_eq!(Mode::Configuration.to_string(), "configuration");
    }

    #[test]
    fn test_not_contains_filters_match() {
        let level = PrivilegeLevel::new(Mode::Privileged, r"#\s?$")
            .unwrap()
            .with_not_contains("(config");
        assert!(level.matches("Switch#"));
        assert!(!level.matches("Switch(config)#"));
    }
}
