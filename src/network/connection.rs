//! Connection Handler
//!
//! Owns the single socket of a session and runs request/response exchanges
//! over it.

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};

use crate::config::Config;
use crate::error::{ChatError, Result};
use crate::protocol::{
    read_inbox_batch, read_response, write_command, Command, InboxBatch, LineReader, Response,
};

/// A bidirectional byte stream that can be closed explicitly
pub trait Transport: Read + Write {
    /// Shut the stream down in both directions
    fn close(&mut self) -> io::Result<()>;
}

impl Transport for TcpStream {
    fn close(&mut self) -> io::Result<()> {
        self.shutdown(Shutdown::Both)
    }
}

/// Opens transports to the configured server
pub trait Connector {
    type Stream: Transport;

    fn connect(&mut self, config: &Config) -> Result<Self::Stream>;
}

/// Plain TCP connector
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl Connector for TcpConnector {
    type Stream = TcpStream;

    /// Resolve `host:port` and try each address in turn
    ///
    /// Applies the configured connect, read and write timeouts.
    fn connect(&mut self, config: &Config) -> Result<TcpStream> {
        let addr = config.addr();
        let connect_err = |source: io::Error| ChatError::Connect {
            addr: addr.clone(),
            source,
        };

        let candidates = addr.to_socket_addrs().map_err(connect_err)?;

        let mut last_error = None;
        let mut stream = None;
        for candidate in candidates {
            let attempt = match config.connect_timeout() {
                Some(timeout) => TcpStream::connect_timeout(&candidate, timeout),
                None => TcpStream::connect(candidate),
            };
            match attempt {
                Ok(s) => {
                    stream = Some(s);
                    break;
                }
                Err(e) => {
                    tracing::debug!("Connect to {} failed: {}", candidate, e);
                    last_error = Some(e);
                }
            }
        }

        let stream = match stream {
            Some(stream) => stream,
            None => {
                let source = last_error.unwrap_or_else(|| {
                    io::Error::new(io::ErrorKind::NotFound, "no addresses resolved")
                });
                return Err(connect_err(source));
            }
        };

        // Disable Nagle's algorithm: every command is a single short line
        stream.set_nodelay(true)?;
        stream.set_read_timeout(config.read_timeout())?;
        stream.set_write_timeout(config.write_timeout())?;

        Ok(stream)
    }
}

// =============================================================================
// Connection
// =============================================================================

/// An open connection to the chat server
pub struct Connection<T> {
    /// Line reader wrapping the transport; writes go to the same transport
    reader: LineReader<T>,

    /// Peer address for logging
    peer_addr: String,

    max_discarded_lines: usize,
    max_inbox_messages: usize,
}

impl<T: Transport> Connection<T> {
    pub fn new(stream: T, peer_addr: impl Into<String>, config: &Config) -> Self {
        Self {
            reader: LineReader::new(stream, config.max_line_length),
            peer_addr: peer_addr.into(),
            max_discarded_lines: config.max_discarded_lines,
            max_inbox_messages: config.max_inbox_messages,
        }
    }

    /// Write one command
    pub fn send(&mut self, command: &Command) -> Result<()> {
        tracing::debug!("-> {}: {}", self.peer_addr, command.name());
        write_command(self.reader.get_mut(), command)
    }

    /// Wait for the next recognized response
    pub fn receive(&mut self) -> Result<Response> {
        let response = read_response(&mut self.reader, self.max_discarded_lines)?;
        tracing::debug!("<- {}: {}", self.peer_addr, response.kind());
        Ok(response)
    }

    /// Send a command and wait for its response
    pub fn request(&mut self, command: &Command) -> Result<Response> {
        self.send(command)?;
        self.receive()
    }

    /// Send `inbox` and read the whole batch
    pub fn fetch_inbox(&mut self) -> Result<InboxBatch> {
        self.send(&Command::Inbox)?;
        let batch = read_inbox_batch(&mut self.reader, self.max_inbox_messages)?;
        tracing::debug!(
            "<- {}: inbox with {} messages",
            self.peer_addr,
            batch.declared_count()
        );
        Ok(batch)
    }

    /// Shut the transport down
    pub fn close(&mut self) -> io::Result<()> {
        tracing::debug!("Closing connection to {}", self.peer_addr);
        self.reader.get_mut().close()
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}
