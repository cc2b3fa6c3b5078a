//! Command definitions
//!
//! Represents commands sent to the chat server.

use std::borrow::Cow;

/// Command types (the keyword written on the wire)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    Sync,
    Login,
    Msg,
    Users,
    Inbox,
    Joke,
    Help,
}

impl CommandType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandType::Sync => "sync",
            CommandType::Login => "login",
            CommandType::Msg => "msg",
            CommandType::Users => "users",
            CommandType::Inbox => "inbox",
            CommandType::Joke => "joke",
            CommandType::Help => "help",
        }
    }
}

/// A command to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Enter synchronized response mode
    Sync,

    /// Authenticate as `username`
    Login { username: String },

    /// Public message to everyone
    Msg { text: String },

    /// Private message, sent as `msg <recipient> <text>`
    PrivMsg { recipient: String, text: String },

    /// Request the user list
    Users,

    /// Request the unread message batch
    Inbox,

    /// Request a joke
    Joke,

    /// Request the list of supported commands
    Help,
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Sync => CommandType::Sync,
            Command::Login { .. } => CommandType::Login,
            Command::Msg { .. } | Command::PrivMsg { .. } => CommandType::Msg,
            Command::Users => CommandType::Users,
            Command::Inbox => CommandType::Inbox,
            Command::Joke => CommandType::Joke,
            Command::Help => CommandType::Help,
        }
    }

    pub fn name(&self) -> &'static str {
        self.command_type().as_str()
    }

    /// The argument string as written after the name, if any
    pub fn argument(&self) -> Option<Cow<'_, str>> {
        match self {
            Command::Login { username } => Some(Cow::Borrowed(username)),
            Command::Msg { text } => Some(Cow::Borrowed(text)),
            Command::PrivMsg { recipient, text } => {
                Some(Cow::Owned(format!("{} {}", recipient, text)))
            }
            Command::Sync | Command::Users | Command::Inbox | Command::Joke | Command::Help => {
                None
            }
        }
    }
}
