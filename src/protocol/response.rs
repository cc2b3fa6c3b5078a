//! Response definitions
//!
//! Represents classified lines received from the chat server.

use std::fmt;

/// Recognized response kinds, keyed by the leading token of a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseKind {
    LoginOk,
    LoginErr,
    ModeOk,
    MsgOk,
    MsgErr,
    Inbox,
    Supported,
    CmdErr,
    Users,
    Joke,
}

impl ResponseKind {
    /// The full vocabulary, in classification order
    pub const ALL: [ResponseKind; 10] = [
        ResponseKind::LoginOk,
        ResponseKind::LoginErr,
        ResponseKind::ModeOk,
        ResponseKind::MsgOk,
        ResponseKind::MsgErr,
        ResponseKind::Inbox,
        ResponseKind::Supported,
        ResponseKind::CmdErr,
        ResponseKind::Users,
        ResponseKind::Joke,
    ];

    pub fn token(&self) -> &'static str {
        match self {
            ResponseKind::LoginOk => "loginok",
            ResponseKind::LoginErr => "loginerr",
            ResponseKind::ModeOk => "modeok",
            ResponseKind::MsgOk => "msgok",
            ResponseKind::MsgErr => "msgerr",
            ResponseKind::Inbox => "inbox",
            ResponseKind::Supported => "supported",
            ResponseKind::CmdErr => "cmderr",
            ResponseKind::Users => "users",
            ResponseKind::Joke => "joke",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.token() == token)
    }

    /// Classify a line by its first whitespace-delimited token
    ///
    /// Blank lines and unknown tokens are `None`.
    pub fn classify(line: &str) -> Option<Self> {
        line.split_whitespace().next().and_then(Self::from_token)
    }

    /// Protocol-level refusal
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            ResponseKind::LoginErr | ResponseKind::MsgErr | ResponseKind::CmdErr
        )
    }
}

impl fmt::Display for ResponseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// A classified server line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    kind: ResponseKind,
    line: String,
}

impl Response {
    pub fn new(kind: ResponseKind, line: impl Into<String>) -> Self {
        Self {
            kind,
            line: line.into(),
        }
    }

    /// Classify `line`, handing it back untouched if it is not recognized
    pub fn parse(line: String) -> std::result::Result<Self, String> {
        match ResponseKind::classify(&line) {
            Some(kind) => Ok(Self { kind, line }),
            None => Err(line),
        }
    }

    pub fn kind(&self) -> ResponseKind {
        self.kind
    }

    /// The full line as received (terminator removed)
    pub fn line(&self) -> &str {
        &self.line
    }

    pub fn into_line(self) -> String {
        self.line
    }

    /// Text after the leading token
    pub fn body(&self) -> &str {
        let trimmed = self.line.trim_start();
        match trimmed.find(char::is_whitespace) {
            Some(idx) => trimmed[idx..].trim(),
            None => "",
        }
    }

    /// Names listed in a `users` reply
    pub fn users(&self) -> Vec<&str> {
        if self.kind != ResponseKind::Users {
            return Vec::new();
        }
        self.body().split_whitespace().collect()
    }

    pub fn is_error(&self) -> bool {
        self.kind.is_error()
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.line)
    }
}
