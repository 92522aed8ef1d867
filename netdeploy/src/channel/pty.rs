//! PTY channel: write input lines, read until a prompt pattern shows up.

use std::time::Duration;

use log::trace;
use regex::bytes::Regex;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::buffer::PatternBuffer;
use crate::error::{ChannelError, Result};

/// Configuration for PTY channel behavior.
#[derive(Debug, Clone)]
pub struct PtyConfig {
    /// Default timeout for a single read.
    pub timeout: Duration,

    /// Search depth for pattern matching.
    pub search_depth: usize,
}

impl Default for PtyConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            search_depth: 1000,
        }
    }
}

/// Interactive shell on top of any byte stream.
///
/// Over SSH the stream is the russh channel stream; tests drive it with a
/// scripted mock.
pub struct PtyChannel<S> {
    stream: S,
    config: PtyConfig,
    buffer: PatternBuffer,
}

impl<S> PtyChannel<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn new(stream: S, config: PtyConfig) -> Self {
        Self {
            buffer: PatternBuffer::new(config.search_depth),
            stream,
            config,
        }
    }

    /// Send one line of input. A newline is appended.
    pub async fn send(&mut self, input: &str) -> Result<()> {
        let mut line = Vec::with_capacity(input.len() + 1);
        line.extend_from_slice(input.as_bytes());
        line.push(b'\n');
        self.stream
            .write_all(&line)
            .await
            .map_err(ChannelError::Io)?;
        self.stream.flush().await.map_err(ChannelError::Io)?;
        Ok(())
    }

    /// Read until `pattern` matches the tail of the output.
    ///
    /// Returns everything up to and including the match. Output that
    /// arrives after the match stays buffered for the next read.
    pub async fn read_until(&mut self, pattern: &Regex, timeout: Option<Duration>) -> Result<Vec<u8>> {
        let timeout = timeout.unwrap_or(self.config.timeout);
        tokio::time::timeout(timeout, self.read_until_inner(pattern))
            .await
            .map_err(|_| ChannelError::PatternTimeout(timeout))?
    }

    async fn read_until_inner(&mut self, pattern: &Regex) -> Result<Vec<u8>> {
        let mut chunk = [0u8; 4096];
        loop {
            if let Some(end) = self.buffer.find_in_tail(pattern) {
                return Ok(self.buffer.take_through(end));
            }

            let n = self
                .stream
                .read(&mut chunk)
                .await
                .map_err(ChannelError::Io)?;
            if n == 0 {
                return Err(ChannelError::Closed.into());
            }
            trace!("read {} bytes", n);
            self.buffer.extend(&chunk[..n]);
        }
    }

    pub fn timeout(&self) -> Duration {
        self.config.timeout
    }

    /// Drop any buffered output.
    pub fn clear_buffer(&mut self) {
        self.buffer.clear();
    }

    /// Shut down the write half of the stream.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.stream.shutdown().await.map_err(ChannelError::Io)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn prompt() -> Regex {
        Regex::new(r"(?m)^Switch[>#]\s?$").unwrap()
    }

    #[tokio::test]
    async fn test_read_until_across_chunks() {
        let mock = tokio_test::io::Builder::new()
            .read(b"Welcome\r\nSwi")
            .read(b"tch>")
            .build();
        let mut channel = PtyChannel::new(mock, PtyConfig::default());

        let data = channel.read_until(&prompt(), None).await.unwrap();
        assert_eq!(data, b"Welcome\r\nSwitch>");
    }

    #[tokio::test]
    async fn test_send_appends_newline() {
        let mock = tokio_test::io::Builder::new()
            .write(b"show clock\n")
            .read(b"show clock\r\n*10:00:00 UTC\r\nSwitch#")
            .build();
        let mut channel = PtyChannel::new(mock, PtyConfig::default());

        channel.send("show clock").await.unwrap();
        let data = channel.read_until(&prompt(), None).await.unwrap();
        assert!(data.ends_with(b"Switch#"));
    }

    #[tokio::test]
    async fn test_eof_is_closed() {
        let mock = tokio_test::io::Builder::new().read(b"partial").build();
        let mut channel = PtyChannel::new(mock, PtyConfig::default());

        let err = channel.read_until(&prompt(), None).await.unwrap_err();
        assert!(matches!(err, Error::Channel(ChannelError::Closed)));
    }

    #[tokio::test]
    async fn test_timeout() {
        let (client, _server) = tokio::io::duplex(64);
        let mut channel = PtyChannel::new(client, PtyConfig::default());

        let err = channel
            .read_until(&prompt(), Some(Duration::from_millis(50)))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Channel(ChannelError::PatternTimeout(_))
        ));
    }
}
