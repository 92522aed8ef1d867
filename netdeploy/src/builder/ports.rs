//! Switch port specifications (`5`, `1-24`, `1,3,5`, `1-4,9`).

use std::fmt;
use std::str::FromStr;

use crate::error::BuildError;

/// One item of a port specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PortItem {
    Single(u32),
    /// Inclusive on both ends.
    Range(u32, u32),
}

/// A parsed port specification.
///
/// Expansion keeps the order in which ports are written; ranges expand
/// in ascending order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortSpec {
    text: String,
    items: Vec<PortItem>,
}

impl PortSpec {
    /// Highest port number accepted. Bounds the expansion of a range.
    pub const MAX_PORT: u32 = 1024;

    /// Parse a specification. An empty string yields an empty spec.
    pub fn parse(spec: &str) -> Result<Self, BuildError> {
        let text = spec.trim();
        let invalid = |reason: &str| BuildError::InvalidPortRange {
            spec: text.to_string(),
            reason: reason.to_string(),
        };

        let mut items = Vec::new();
        if text.is_empty() {
            return Ok(Self {
                text: String::new(),
                items,
            });
        }

        for part in text.split(',') {
            let part = part.trim();
            if part.is_empty() {
                return Err(invalid("empty list entry"));
            }
            match part.split_once('-') {
                Some((start, end)) => {
                    let start = parse_port(start).ok_or_else(|| invalid("bad range start"))?;
                    let end = parse_port(end).ok_or_else(|| invalid("bad range end"))?;
                    if start > end {
                        return Err(invalid("range start is above range end"));
                    }
                    if end > Self::MAX_PORT {
                        return Err(invalid("port number out of range"));
                    }
                    items.push(PortItem::Range(start, end));
                }
                None => {
                    let port = parse_port(part).ok_or_else(|| invalid("port is not a number"))?;
                    if port > Self::MAX_PORT {
                        return Err(invalid("port number out of range"));
                    }
                    items.push(PortItem::Single(port));
                }
            }
        }

        Ok(Self {
            text: text.to_string(),
            items,
        })
    }

    /// Check if the spec names no ports.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Expand into individual port numbers.
    pub fn ports(&self) -> Vec<u32> {
        let mut ports = Vec::new();
        for item in &self.items {
            match *item {
                PortItem::Single(port) => ports.push(port),
                PortItem::Range(start, end) => ports.extend(start..=end),
            }
        }
        ports
    }
}

fn parse_port(text: &str) -> Option<u32> {
    let text = text.trim();
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

impl FromStr for PortSpec {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}
