//! Protocol Module
//!
//! Defines the line-based wire protocol spoken with the chat server.
//!
//! ## Protocol Format
//!
//! One UTF-8 text line per unit, terminated by `\n`. A `\r` before the
//! terminator is ignored on read and never written.
//!
//! ### Commands
//! - `sync`                   - enter synchronized response mode
//! - `login <username>`       - authenticate
//! - `msg <text>`             - public message
//! - `msg <recipient> <text>` - private message
//! - `users`                  - user list
//! - `inbox`                  - unread message batch
//! - `joke`                   - a joke
//! - `help`                   - supported commands
//!
//! ### Responses (by leading token)
//! - `modeok`
//! - `loginok` / `loginerr`
//! - `msgok` / `msgerr`
//! - `users <names>`
//! - `inbox <n>` followed by `n` lines prefixed `msg ` or `privmsg `
//! - `joke <text>`
//! - `supported <commands>`
//! - `cmderr`

mod command;
mod response;
mod framer;
mod codec;
pub mod inbox;

pub use command::{Command, CommandType};
pub use response::{Response, ResponseKind};
pub use framer::LineReader;
pub use codec::{encode_command, encode_line, read_response, write_command};
pub use inbox::{parse_inbox_count, read_inbox_batch, InboxBatch, InboxMessage, Visibility};
