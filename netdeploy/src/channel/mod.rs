//! Channel layer: prompt-driven reads over the interactive shell.

mod buffer;
mod pty;

pub use buffer::{PatternBuffer, last_line};
pub use pty::{PtyChannel, PtyConfig};
