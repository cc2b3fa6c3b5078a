//! Inbox batches
//!
//! The reply to `inbox` is a header line `inbox <n>` followed by exactly `n`
//! payload lines. Payload lines are not classified: each one is a message,
//! prefixed `privmsg ` (private) or `msg ` (public).

use std::io::Read;

use crate::error::{ChatError, Result};
use super::LineReader;

const PRIVATE_PREFIX: &str = "privmsg ";
const PUBLIC_PREFIX: &str = "msg ";

/// Whether a message was addressed to us alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Private,
    Public,
}

/// One message from an inbox batch, prefix removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboxMessage {
    pub visibility: Visibility,
    pub text: String,
}

impl InboxMessage {
    /// Classify a payload line and strip its prefix
    pub fn from_payload(line: String) -> Self {
        if let Some(text) = line.strip_prefix(PRIVATE_PREFIX) {
            return Self {
                visibility: Visibility::Private,
                text: text.to_string(),
            };
        }
        let text = match line.strip_prefix(PUBLIC_PREFIX) {
            Some(text) => text.to_string(),
            None => line,
        };
        Self {
            visibility: Visibility::Public,
            text,
        }
    }

    pub fn is_private(&self) -> bool {
        self.visibility == Visibility::Private
    }
}

/// Messages returned by one `inbox` request, in arrival order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboxBatch {
    declared_count: usize,
    messages: Vec<InboxMessage>,
}

impl InboxBatch {
    pub fn new(declared_count: usize) -> Self {
        Self {
            declared_count,
            messages: Vec::with_capacity(declared_count),
        }
    }

    pub fn push(&mut self, message: InboxMessage) {
        self.messages.push(message);
    }

    /// Count announced in the header
    pub fn declared_count(&self) -> usize {
        self.declared_count
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// All messages in arrival order
    pub fn messages(&self) -> &[InboxMessage] {
        &self.messages
    }

    pub fn private(&self) -> impl Iterator<Item = &InboxMessage> {
        self.messages.iter().filter(|m| m.is_private())
    }

    pub fn public(&self) -> impl Iterator<Item = &InboxMessage> {
        self.messages.iter().filter(|m| !m.is_private())
    }

    /// Display order: private messages first, then public
    pub fn grouped(&self) -> impl Iterator<Item = &InboxMessage> {
        self.private().chain(self.public())
    }
}

/// Parse the header line `inbox <n>`
pub fn parse_inbox_count(header: &str) -> Result<usize> {
    let mut tokens = header.split_whitespace();

    if tokens.next() != Some("inbox") {
        return Err(ChatError::Protocol(format!(
            "expected inbox header, got {:?}",
            header
        )));
    }

    let count = tokens
        .next()
        .ok_or_else(|| ChatError::Protocol(format!("inbox header without count: {:?}", header)))?;
    if !count.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ChatError::Protocol(format!(
            "inbox count {:?} is not a decimal number",
            count
        )));
    }
    let count = count.parse::<usize>().map_err(|e| {
        ChatError::Protocol(format!("invalid inbox count {:?}: {}", count, e))
    })?;

    if let Some(extra) = tokens.next() {
        return Err(ChatError::Protocol(format!(
            "unexpected token {:?} after inbox count",
            extra
        )));
    }

    Ok(count)
}

/// Read a header and its payload lines from `reader`
///
/// The header is read raw, without response classification. Counts above
/// `max_messages` are rejected before any payload is consumed.
pub fn read_inbox_batch<R: Read>(
    reader: &mut LineReader<R>,
    max_messages: usize,
) -> Result<InboxBatch> {
    let header = reader.read_line()?;
    let count = parse_inbox_count(&header)?;

    if count > max_messages {
        return Err(ChatError::Protocol(format!(
            "inbox announces {} messages (max {})",
            count, max_messages
        )));
    }

    let mut batch = InboxBatch::new(count);
    for _ in 0..count {
        let line = reader.read_line()?;
        tracing::trace!("Inbox payload: {:?}", line);
        batch.push(InboxMessage::from_payload(line));
    }

    Ok(batch)
}
