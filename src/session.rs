//! Session Module
//!
//! The chat session that ties framing, classification, the inbox protocol
//! and the state machine to one connection.
//!
//! ## Responsibilities
//! - Own the single connection and the lifecycle state
//! - Run one request/response exchange per operation
//! - Apply state transitions as explicit results of those exchanges
//! - Guard requests against the operation's valid states (`dispatch`)
//!
//! Invariant: a connection is held if and only if the state is not
//! `Disconnected`.

use crate::config::{Config, DisconnectPolicy};
use crate::error::{ChatError, Result};
use crate::network::{Connection, Connector, TcpConnector};
use crate::protocol::{Command, InboxBatch, Response, ResponseKind};
use crate::state::{Operation, SessionState, Transition};

/// A request for one engine operation, carrying its user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Connect,
    Disconnect,
    Login { username: String },
    SendPublicMessage { text: String },
    SendPrivateMessage { recipient: String, text: String },
    ReadInbox,
    ListUsers,
    GetJoke,
    ListSupported,
}

impl Request {
    pub fn operation(&self) -> Operation {
        match self {
            Request::Connect => Operation::Connect,
            Request::Disconnect => Operation::Disconnect,
            Request::Login { .. } => Operation::Login,
            Request::SendPublicMessage { .. } => Operation::SendPublicMessage,
            Request::SendPrivateMessage { .. } => Operation::SendPrivateMessage,
            Request::ReadInbox => Operation::ReadInbox,
            Request::ListUsers => Operation::ListUsers,
            Request::GetJoke => Operation::GetJoke,
            Request::ListSupported => Operation::ListSupported,
        }
    }
}

/// Result of a dispatched request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Connected,
    Disconnected,
    /// A classified reply; refusals (`loginerr`, `msgerr`, `cmderr`) land here too
    Reply(Response),
    Inbox(InboxBatch),
}

/// A client session with one chat server
pub struct ChatSession<C: Connector = TcpConnector> {
    config: Config,

    /// Opens the transport on `connect`
    connector: C,

    /// Single source of truth for which operations are legal
    state: SessionState,

    /// Present exactly when `state != Disconnected`
    connection: Option<Connection<C::Stream>>,
}

impl ChatSession<TcpConnector> {
    /// Create a disconnected session that will connect over TCP
    pub fn new(config: Config) -> Self {
        Self::with_connector(config, TcpConnector)
    }
}

impl<C: Connector> ChatSession<C> {
    pub fn with_connector(config: Config, connector: C) -> Self {
        Self {
            config,
            connector,
            state: SessionState::Disconnected,
            connection: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// The open connection, if any
    pub fn connection(&self) -> Option<&Connection<C::Stream>> {
        self.connection.as_ref()
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// Run `request` if its operation is permitted in the current state
    pub fn dispatch(&mut self, request: Request) -> Result<Outcome> {
        let operation = request.operation();
        if !operation.is_permitted_in(self.state) {
            return Err(ChatError::InvalidState {
                operation,
                state: self.state,
            });
        }

        match request {
            Request::Connect => self.connect().map(|()| Outcome::Connected),
            Request::Disconnect => self.disconnect().map(|()| Outcome::Disconnected),
            Request::Login { username } => self.login(&username).map(Outcome::Reply),
            Request::SendPublicMessage { text } => {
                self.send_public_message(&text).map(Outcome::Reply)
            }
            Request::SendPrivateMessage { recipient, text } => self
                .send_private_message(&recipient, &text)
                .map(Outcome::Reply),
            Request::ReadInbox => self.read_inbox().map(Outcome::Inbox),
            Request::ListUsers => self.list_users().map(Outcome::Reply),
            Request::GetJoke => self.get_joke().map(Outcome::Reply),
            Request::ListSupported => self.supported_commands().map(Outcome::Reply),
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Open the connection and enter sync mode
    ///
    /// The session only becomes `Connected` once `sync` is answered with
    /// `modeok`. On any other reply the new connection is closed again and
    /// [`ChatError::SyncRejected`] is returned.
    pub fn connect(&mut self) -> Result<()> {
        if self.connection.is_some() {
            return Err(ChatError::InvalidState {
                operation: Operation::Connect,
                state: self.state,
            });
        }
        self.config.validate()?;

        let addr = self.config.addr();
        let stream = self.connector.connect(&self.config)?;
        let mut connection = Connection::new(stream, addr.as_str(), &self.config);

        let response = connection.request(&Command::Sync)?;
        if response.kind() != ResponseKind::ModeOk {
            tracing::warn!("{} answered sync with {:?}", addr, response.line());
            if let Err(e) = connection.close() {
                tracing::debug!("Closing rejected connection failed: {}", e);
            }
            return Err(ChatError::SyncRejected(response.into_line()));
        }

        self.transition(Transition::SyncAcknowledged)?;
        self.connection = Some(connection);
        tracing::info!("Connected to {} in sync mode", addr);
        Ok(())
    }

    /// Close the connection
    ///
    /// If the shutdown itself fails the error is returned, and the
    /// configured [`DisconnectPolicy`] decides whether the session is
    /// released anyway.
    pub fn disconnect(&mut self) -> Result<()> {
        let connection = self.connection.as_mut().ok_or(ChatError::NotConnected)?;

        match connection.close() {
            Ok(()) => self.release(),
            Err(e) => {
                tracing::warn!("Closing connection to {} failed: {}", connection.peer_addr(), e);
                match self.config.disconnect_policy {
                    DisconnectPolicy::ReleaseOnError => self.release()?,
                    DisconnectPolicy::KeepOnError => {}
                }
                Err(ChatError::from_io(e))
            }
        }
    }

    /// Log in as `username`
    ///
    /// Only `loginerr` counts as a rejection; any other reply authorizes
    /// the session.
    pub fn login(&mut self, username: &str) -> Result<Response> {
        ensure_single_line("username", username)?;

        let response = self.connection_mut()?.request(&Command::Login {
            username: username.to_string(),
        })?;

        if response.kind() == ResponseKind::LoginErr {
            tracing::info!("Login as {} rejected: {}", username, response.body());
        } else {
            self.transition(Transition::LoginAccepted)?;
        }
        Ok(response)
    }

    // =========================================================================
    // Messaging
    // =========================================================================

    pub fn send_public_message(&mut self, text: &str) -> Result<Response> {
        ensure_single_line("message", text)?;
        self.connection_mut()?.request(&Command::Msg {
            text: text.to_string(),
        })
    }

    /// Send `text` to `recipient` only
    ///
    /// The recipient must be a single word, since the server splits the
    /// argument at the first space.
    pub fn send_private_message(&mut self, recipient: &str, text: &str) -> Result<Response> {
        if recipient.is_empty() || recipient.contains(char::is_whitespace) {
            return Err(ChatError::InvalidArgument(format!(
                "recipient must be a single word, got {:?}",
                recipient
            )));
        }
        ensure_single_line("message", text)?;

        self.connection_mut()?.request(&Command::PrivMsg {
            recipient: recipient.to_string(),
            text: text.to_string(),
        })
    }

    /// Fetch and partition the unread message batch
    pub fn read_inbox(&mut self) -> Result<InboxBatch> {
        self.connection_mut()?.fetch_inbox()
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn list_users(&mut self) -> Result<Response> {
        self.connection_mut()?.request(&Command::Users)
    }

    pub fn get_joke(&mut self) -> Result<Response> {
        self.connection_mut()?.request(&Command::Joke)
    }

    pub fn supported_commands(&mut self) -> Result<Response> {
        self.connection_mut()?.request(&Command::Help)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn connection_mut(&mut self) -> Result<&mut Connection<C::Stream>> {
        self.connection.as_mut().ok_or(ChatError::NotConnected)
    }

    fn transition(&mut self, transition: Transition) -> Result<()> {
        let next = self.state.apply(transition)?;
        tracing::debug!("State {} -> {} ({:?})", self.state, next, transition);
        self.state = next;
        Ok(())
    }

    /// Drop the connection and move to `Disconnected`
    fn release(&mut self) -> Result<()> {
        self.transition(Transition::Closed)?;
        if let Some(connection) = self.connection.take() {
            tracing::info!("Disconnected from {}", connection.peer_addr());
        }
        Ok(())
    }
}

/// Arguments go out verbatim, so a line break would split the command
fn ensure_single_line(field: &str, value: &str) -> Result<()> {
    if value.contains(['\n', '\r']) {
        return Err(ChatError::InvalidArgument(format!(
            "{} must not contain line breaks",
            field
        )));
    }
    Ok(())
}
