//! Network Module
//!
//! TCP transport for the chat session.
//!
//! ## Architecture
//! - `Connector` opens a `Transport` (TCP in production)
//! - `Connection` owns that transport for the lifetime of a session
//! - One blocking request/response exchange at a time

mod connection;

pub use connection::{Connection, Connector, TcpConnector, Transport};
