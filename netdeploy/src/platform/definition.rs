//! Platform definition: the prompts and quirks of one device family.

use indexmap::IndexMap;
use regex::bytes::Regex;

use super::privilege_level::{Mode, PrivilegeLevel};
use crate::error::ChannelError;

/// Everything the session layer needs to know about a device family.
#[derive(Debug, Clone)]
pub struct PlatformDefinition {
    pub name: String,

    /// Levels keyed by mode, in escalation order.
    pub privilege_levels: IndexMap<Mode, PrivilegeLevel>,

    /// Output substrings that mark a rejected statement.
    pub failed_when_contains: Vec<String>,

    /// Commands sent once the first prompt is seen.
    pub on_open_commands: Vec<String>,

    /// Matches any prompt of any level.
    prompt_pattern: Regex,
}

impl PlatformDefinition {
    /// Build a definition from its levels, lowest mode first.
    pub fn new(
        name: impl Into<String>,
        levels: impl IntoIterator<Item = PrivilegeLevel>,
    ) -> Result<Self, ChannelError> {
        let privilege_levels: IndexMap<Mode, PrivilegeLevel> =
            levels.into_iter().map(|level| (level.mode, level)).collect();
        let prompt_pattern = build_combined_pattern(&privilege_levels)?;
        Ok(Self {
            name: name.into(),
            privilege_levels,
            failed_when_contains: vec![],
            on_open_commands: vec![],
            prompt_pattern,
        })
    }

    pub fn with_failure_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.failed_when_contains.push(pattern.into());
        self
    }

    pub fn with_on_open_command(mut self, command: impl Into<String>) -> Self {
        self.on_open_commands.push(command.into());
        self
    }

    /// Pattern matching the prompt of any level.
    pub fn prompt_pattern(&self) -> &Regex {
        &self.prompt_pattern
    }

    pub fn level(&self, mode: Mode) -> Option<&PrivilegeLevel> {
        self.privilege_levels.get(&mode)
    }

    /// Work out the mode from a prompt line.
    pub fn mode_for(&self, prompt: &str) -> Option<Mode> {
        self.privilege_levels
            .values()
            .find(|level| level.matches(prompt))
            .map(|level| level.mode)
    }

    /// First failure marker found in `output`.
    pub fn detect_failure(&self, output: &str) -> Option<&str> {
        self.failed_when_contains
            .iter()
            .find(|pattern| output.contains(pattern.as_str()))
            .map(String::as_str)
    }
}

fn build_combined_pattern(levels: &IndexMap<Mode, PrivilegeLevel>) -> Result<Regex, ChannelError> {
    let combined = levels
        .values()
        .map(|level| format!("(?:{})", level.pattern.as_str()))
        .collect::<Vec<_>>()
        .join("|");
    Ok(Regex::new(&combined)?)
}
