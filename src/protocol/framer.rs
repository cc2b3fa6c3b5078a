//! Line framing
//!
//! Turns a byte stream into logical lines. `\n` ends a line, every `\r` is
//! dropped, and the terminator is never part of the returned text.

use std::io::{self, Read};

use bytes::BytesMut;

use crate::error::{ChatError, Result};

/// Bytes requested from the underlying reader per call
const READ_CHUNK_SIZE: usize = 4096;

/// Buffered line reader over any byte source
pub struct LineReader<R> {
    inner: R,

    /// Bytes read but not yet returned as a line
    buffer: BytesMut,

    /// Prefix of `buffer` already known to contain no `\n`
    scanned: usize,

    max_line_length: usize,

    /// Set after an over-long line was reported; bytes are dropped until
    /// its terminator arrives
    discarding: bool,
}

impl<R: Read> LineReader<R> {
    pub fn new(inner: R, max_line_length: usize) -> Self {
        Self {
            inner,
            buffer: BytesMut::with_capacity(READ_CHUNK_SIZE),
            scanned: 0,
            max_line_length,
            discarding: false,
        }
    }

    /// Read the next line, blocking until a `\n` arrives
    ///
    /// End of stream before a terminator is [`ChatError::ConnectionClosed`];
    /// the partial line is dropped. A line longer than the limit (not
    /// counting `\r`) is reported once as [`ChatError::LineTooLong`] and the
    /// rest of it is skipped, so the next call starts at the following line
    /// however the bytes were split across reads.
    pub fn read_line(&mut self) -> Result<String> {
        loop {
            if let Some(offset) = self.buffer[self.scanned..].iter().position(|&b| b == b'\n') {
                let end = self.scanned + offset;
                let frame = self.buffer.split_to(end + 1);
                self.scanned = 0;

                if self.discarding {
                    self.discarding = false;
                    continue;
                }
                if line_length(&frame[..end]) > self.max_line_length {
                    return Err(ChatError::LineTooLong {
                        limit: self.max_line_length,
                    });
                }
                return Ok(decode_line(&frame[..end]));
            }

            if self.discarding {
                self.buffer.clear();
                self.scanned = 0;
            } else if line_length(&self.buffer) > self.max_line_length {
                self.buffer.clear();
                self.scanned = 0;
                self.discarding = true;
                return Err(ChatError::LineTooLong {
                    limit: self.max_line_length,
                });
            } else {
                self.scanned = self.buffer.len();
            }

            self.fill()?;
        }
    }

    /// Bytes buffered but not yet consumed as lines
    pub fn buffered(&self) -> &[u8] {
        &self.buffer
    }

    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    fn fill(&mut self) -> Result<()> {
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        loop {
            match self.inner.read(&mut chunk) {
                Ok(0) => return Err(ChatError::ConnectionClosed),
                Ok(n) => {
                    self.buffer.extend_from_slice(&chunk[..n]);
                    return Ok(());
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(ChatError::from_io(e)),
            }
        }
    }
}

/// Line length as returned to the caller, with `\r` excluded
fn line_length(raw: &[u8]) -> usize {
    raw.iter().filter(|&&b| b != b'\r').count()
}

fn decode_line(raw: &[u8]) -> String {
    let bytes: Vec<u8> = raw.iter().copied().filter(|&b| b != b'\r').collect();
    match String::from_utf8(bytes) {
        Ok(line) => line,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}
