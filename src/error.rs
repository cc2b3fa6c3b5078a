//! Error types for datachat
//!
//! Provides a unified error type for all operations.
//!
//! Protocol-level refusals (`loginerr`, `msgerr`, `cmderr`) are not errors:
//! they come back as ordinary [`Response`](crate::protocol::Response) values.
//! Everything here aborts the operation that produced it.

use std::io;

use thiserror::Error;

use crate::state::{Operation, SessionState, Transition};

/// Result type alias using ChatError
pub type Result<T> = std::result::Result<T, ChatError>;

/// Unified error type for datachat operations
#[derive(Debug, Error)]
pub enum ChatError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    #[error("Failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("Connection closed by peer")]
    ConnectionClosed,

    #[error("Not connected to a chat server")]
    NotConnected,

    #[error("Timed out: {0}")]
    Timeout(String),

    /// The classifier gave up after discarding too many unrecognized lines
    #[error("No recognized response after discarding {discarded} lines")]
    ResponseTimeout { discarded: usize },

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Server did not enter sync mode, replied: {0}")]
    SyncRejected(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Line exceeds {limit} bytes without a terminator")]
    LineTooLong { limit: usize },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // -------------------------------------------------------------------------
    // State Errors
    // -------------------------------------------------------------------------
    #[error("{operation} is not allowed in the {state} state")]
    InvalidState {
        operation: Operation,
        state: SessionState,
    },

    #[error("Transition {transition:?} is not valid from the {from} state")]
    InvalidTransition {
        from: SessionState,
        transition: Transition,
    },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ChatError {
    /// Map a socket error onto the transport error kinds.
    ///
    /// Read/write timeouts show up as `WouldBlock` on Unix and `TimedOut` on
    /// Windows; both become [`ChatError::Timeout`].
    pub fn from_io(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => {
                ChatError::Timeout(err.to_string())
            }
            io::ErrorKind::UnexpectedEof => ChatError::ConnectionClosed,
            _ => ChatError::Io(err),
        }
    }

    /// True for both socket timeouts and the bounded discard loop giving up
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            ChatError::Timeout(_) | ChatError::ResponseTimeout { .. }
        )
    }
}
