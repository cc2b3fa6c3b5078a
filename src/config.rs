//! Configuration for datachat
//!
//! Centralized configuration with sensible defaults.

use std::time::Duration;

use crate::error::{ChatError, Result};

/// Main configuration for a chat session
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Server Configuration
    // -------------------------------------------------------------------------
    /// Chat server hostname or IP address
    pub host: String,

    /// Chat server TCP port
    pub port: u16,

    // -------------------------------------------------------------------------
    // Timeout Configuration (0 disables the timeout)
    // -------------------------------------------------------------------------
    /// Connect timeout (milliseconds)
    pub connect_timeout_ms: u64,

    /// Socket read timeout (milliseconds)
    pub read_timeout_ms: u64,

    /// Socket write timeout (milliseconds)
    pub write_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Protocol Limits
    // -------------------------------------------------------------------------
    /// Unrecognized lines the classifier may skip before giving up
    pub max_discarded_lines: usize,

    /// Longest line (in bytes) accepted from the server
    pub max_line_length: usize,

    /// Largest inbox batch accepted in one `inbox` reply
    pub max_inbox_messages: usize,

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------
    /// What happens to the session when closing the socket fails
    pub disconnect_policy: DisconnectPolicy,
}

/// Disconnect behavior when the socket shutdown reports an error
///
/// The error is returned to the caller under both policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisconnectPolicy {
    /// Drop the connection and move to `Disconnected` anyway
    #[default]
    ReleaseOnError,

    /// Keep the connection and the current state so the caller can retry
    KeepOnError,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "datakomm.work".to_string(),
            port: 1300,
            connect_timeout_ms: 5000,
            read_timeout_ms: 10_000,
            write_timeout_ms: 5000,
            max_discarded_lines: 256,
            max_line_length: 64 * 1024, // 64 KB
            max_inbox_messages: 10_000,
            disconnect_policy: DisconnectPolicy::ReleaseOnError,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// `host:port` as passed to the resolver
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check the values a session cannot work without
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(ChatError::Config("host must not be empty".to_string()));
        }
        if self.port == 0 {
            return Err(ChatError::Config("port must be non-zero".to_string()));
        }
        if self.max_line_length == 0 {
            return Err(ChatError::Config(
                "max_line_length must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        millis(self.read_timeout_ms)
    }

    pub fn write_timeout(&self) -> Option<Duration> {
        millis(self.write_timeout_ms)
    }
}

fn millis(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the server host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the server port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the connect timeout (in milliseconds)
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.connect_timeout_ms = ms;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set how many unrecognized lines may be skipped while awaiting a response
    pub fn max_discarded_lines(mut self, count: usize) -> Self {
        self.config.max_discarded_lines = count;
        self
    }

    /// Set the maximum accepted line length (in bytes)
    pub fn max_line_length(mut self, bytes: usize) -> Self {
        self.config.max_line_length = bytes;
        self
    }

    /// Set the maximum accepted inbox batch size
    pub fn max_inbox_messages(mut self, count: usize) -> Self {
        self.config.max_inbox_messages = count;
        self
    }

    /// Set the disconnect policy
    pub fn disconnect_policy(mut self, policy: DisconnectPolicy) -> Self {
        self.config.disconnect_policy = policy;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
