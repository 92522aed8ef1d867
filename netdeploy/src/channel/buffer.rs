//! Output buffer with tail-only prompt search.
//!
//! Prompts always sit at the very end of what the device has printed, so
//! only the last `search_depth` bytes are matched against prompt patterns.
//! A long `show running-config` echo never gets rescanned on every chunk.

use regex::bytes::Regex;

/// Accumulates shell output with ANSI escapes removed.
#[derive(Debug)]
pub struct PatternBuffer {
    buffer: Vec<u8>,
    search_depth: usize,
}

impl PatternBuffer {
    pub fn new(search_depth: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(4096),
            search_depth,
        }
    }

    /// Append raw device output, stripping ANSI escape sequences.
    pub fn extend(&mut self, data: &[u8]) {
        let cleaned = strip_ansi_escapes::strip(data);
        self.buffer.extend_from_slice(&cleaned);
    }

    /// Offset of the first byte the tail search looks at.
    fn tail_start(&self) -> usize {
        self.buffer.len().saturating_sub(self.search_depth)
    }

    /// Find `pattern` in the tail. Returns the end offset of the match
    /// relative to the whole buffer.
    pub fn find_in_tail(&self, pattern: &Regex) -> Option<usize> {
        let start = self.tail_start();
        pattern.find(&self.buffer[start..]).map(|m| start + m.end())
    }

    /// Check if the tail contains a pattern match.
    pub fn tail_contains(&self, pattern: &Regex) -> bool {
        self.find_in_tail(pattern).is_some()
    }

    /// Remove and return everything up to `end`, keeping whatever the
    /// device printed after it for the next read.
    pub fn take_through(&mut self, end: usize) -> Vec<u8> {
        let end = end.min(self.buffer.len());
        let rest = self.buffer.split_off(end);
        std::mem::replace(&mut self.buffer, rest)
    }

    /// Take ownership of the buffer contents and reset.
    pub fn take(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buffer)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for PatternBuffer {
    fn default() -> Self {
        Self::new(1000)
    }
}

/// Last non-empty line of `data`, trimmed. This is where a prompt lives.
pub fn last_line(data: &[u8]) -> &[u8] {
    let trimmed = data.trim_ascii_end();
    let start = memchr::memrchr(b'\n', trimmed).map_or(0, |i| i + 1);
    trimmed[start..].trim_ascii()
}
