//! Connection State Machine
//!
//! Lifecycle states of a chat session, the events that move between them,
//! and the set of states each operation is allowed in.
//!
//! ```text
//! Disconnected ──SyncAcknowledged──▶ Connected ──LoginAccepted──▶ Authorized
//!      ▲                                 │                          │
//!      └──────────────Closed─────────────┴───────────Closed─────────┘
//! ```
//!
//! `LoginAccepted` from `Authorized` stays in `Authorized` (re-login).

use std::fmt;

use crate::error::{ChatError, Result};

/// Lifecycle state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    /// No connection to a chat server
    #[default]
    Disconnected,

    /// Connected and in sync mode, not logged in
    Connected,

    /// Connected and logged in
    Authorized,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Disconnected => "disconnected",
            SessionState::Connected => "connected",
            SessionState::Authorized => "authorized",
        }
    }

    /// State reached by applying `transition`, or `None` if it is not legal here
    pub fn next(self, transition: Transition) -> Option<SessionState> {
        use SessionState::*;

        match (self, transition) {
            (Disconnected, Transition::SyncAcknowledged) => Some(Connected),
            (Connected | Authorized, Transition::LoginAccepted) => Some(Authorized),
            (Connected | Authorized, Transition::Closed) => Some(Disconnected),
            _ => None,
        }
    }

    /// Like [`next`](Self::next), but as an error for the illegal cases
    pub fn apply(self, transition: Transition) -> Result<SessionState> {
        self.next(transition).ok_or(ChatError::InvalidTransition {
            from: self,
            transition,
        })
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Events that move a session between states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Socket connected and the server answered `sync` with `modeok`
    SyncAcknowledged,

    /// `login` answered with anything but `loginerr`
    LoginAccepted,

    /// Connection released
    Closed,
}

// =============================================================================
// Operations
// =============================================================================

/// Every engine operation a caller can request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Connect,
    Disconnect,
    Login,
    SendPublicMessage,
    SendPrivateMessage,
    ReadInbox,
    ListUsers,
    GetJoke,
    ListSupported,
}

const DISCONNECTED_ONLY: &[SessionState] = &[SessionState::Disconnected];
const ONLINE: &[SessionState] = &[SessionState::Connected, SessionState::Authorized];
const AUTHORIZED_ONLY: &[SessionState] = &[SessionState::Authorized];

impl Operation {
    /// All operations, in menu order
    pub const ALL: [Operation; 9] = [
        Operation::Connect,
        Operation::Disconnect,
        Operation::Login,
        Operation::SendPublicMessage,
        Operation::SendPrivateMessage,
        Operation::ReadInbox,
        Operation::ListUsers,
        Operation::GetJoke,
        Operation::ListSupported,
    ];

    /// States in which this operation may be invoked
    pub fn valid_states(self) -> &'static [SessionState] {
        match self {
            Operation::Connect => DISCONNECTED_ONLY,
            Operation::SendPrivateMessage => AUTHORIZED_ONLY,
            Operation::Disconnect
            | Operation::Login
            | Operation::SendPublicMessage
            | Operation::ReadInbox
            | Operation::ListUsers
            | Operation::GetJoke
            | Operation::ListSupported => ONLINE,
        }
    }

    pub fn is_permitted_in(self, state: SessionState) -> bool {
        self.valid_states().contains(&state)
    }

    /// Human-readable label for menus
    pub fn description(self) -> &'static str {
        match self {
            Operation::Connect => "Connect to a chat server",
            Operation::Disconnect => "Disconnect from the server",
            Operation::Login => "Authorize (log in)",
            Operation::SendPublicMessage => "Send a public message",
            Operation::SendPrivateMessage => "Send a private message",
            Operation::ReadInbox => "Read messages in the inbox",
            Operation::ListUsers => "See list of users",
            Operation::GetJoke => "Get a joke",
            Operation::ListSupported => "List commands supported by the server",
        }
    }

    /// Operations available in `state`, in menu order
    pub fn permitted_in(state: SessionState) -> impl Iterator<Item = Operation> {
        Self::ALL
            .into_iter()
            .filter(move |op| op.is_permitted_in(state))
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Connect => "connect",
            Operation::Disconnect => "disconnect",
            Operation::Login => "login",
            Operation::SendPublicMessage => "public message",
            Operation::SendPrivateMessage => "private message",
            Operation::ReadInbox => "inbox",
            Operation::ListUsers => "user list",
            Operation::GetJoke => "joke",
            Operation::ListSupported => "supported commands",
        };
        f.write_str(name)
    }
}
