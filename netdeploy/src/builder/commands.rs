//! Ordered list of configuration statements.

use std::fmt;
use std::path::Path;

use crate::error::{Error, Result};

/// An ordered sequence of configuration-language statements.
///
/// Statements are kept exactly as built: no deduplication, no reordering.
/// IOS is context-sensitive, so `interface X` must stay in front of its
/// sub-statements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandList {
    statements: Vec<String>,
}

impl CommandList {
    /// Create an empty command list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one statement.
    pub fn push(&mut self, statement: impl Into<String>) {
        self.statements.push(statement.into());
    }

    /// Append every statement of another list, preserving order.
    pub fn extend(&mut self, other: CommandList) {
        self.statements.extend(other.statements);
    }

    /// Number of statements.
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Iterate over the statements.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.statements.iter().map(String::as_str)
    }

    /// Borrow the statements as a slice.
    pub fn as_slice(&self) -> &[String] {
        &self.statements
    }

    /// Count statements equal to `statement`.
    pub fn count(&self, statement: &str) -> usize {
        self.iter().filter(|s| *s == statement).count()
    }

    /// Write the list to `path`, one statement per line.
    ///
    /// Missing parent directories are created.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| Error::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, self.to_string()).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl fmt::Display for CommandList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.statements.join("\n"))
    }
}

impl From<Vec<String>> for CommandList {
    fn from(statements: Vec<String>) -> Self {
        Self { statements }
    }
}

impl<S: Into<String>> FromIterator<S> for CommandList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            statements: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl IntoIterator for CommandList {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.into_iter()
    }
}

impl PartialEq<[&str]> for CommandList {
    fn eq(&self, other: &[&str]) -> bool {
        self.statements.len() == other.len()
            && self.statements.iter().zip(other).all(|(a, b)| a == b)
    }
}

impl<const N: usize> PartialEq<[&str; N]> for CommandList {
    fn eq(&self, other: &[&str; N]) -> bool {
        *self == other[..]
    }
}
