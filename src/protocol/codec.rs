//! Protocol codec
//!
//! Encoding of commands and classification of server lines.
//!
//! ## Wire Format
//!
//! ### Request (Command) Format
//! ```text
//! name\n
//! name SP argument\n
//! ```
//!
//! The argument is written as-is: no escaping, no validation. Callers must
//! not pass an argument containing `\n`.
//!
//! ### Response Format
//! ```text
//! token [SP text]\n
//! ```
//!
//! Only lines whose first token is in the response vocabulary count as a
//! response; anything else (echoes, server chatter) is skipped.

use std::io::{Read, Write};

use crate::error::{ChatError, Result};
use super::{Command, LineReader, Response};

// =============================================================================
// Command Encoding
// =============================================================================

/// Encode a bare name and optional argument
///
/// Format: `name\n` or `name argument\n`
pub fn encode_line(name: &str, argument: Option<&str>) -> Vec<u8> {
    let arg_len = argument.map_or(0, |a| a.len() + 1);
    let mut message = Vec::with_capacity(name.len() + arg_len + 1);
    message.extend_from_slice(name.as_bytes());
    if let Some(argument) = argument {
        message.push(b' ');
        message.extend_from_slice(argument.as_bytes());
    }
    message.push(b'\n');
    message
}

/// Encode a command to bytes
pub fn encode_command(command: &Command) -> Vec<u8> {
    encode_line(command.name(), command.argument().as_deref())
}

/// Write a command to a stream
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    let bytes = encode_command(command);
    writer.write_all(&bytes).map_err(ChatError::from_io)?;
    writer.flush().map_err(ChatError::from_io)?;
    Ok(())
}

// =============================================================================
// Response Classification
// =============================================================================

/// Read lines until one is a recognized response
///
/// At most `max_discarded` unrecognized lines are skipped; one more and the
/// read fails with [`ChatError::ResponseTimeout`].
pub fn read_response<R: Read>(
    reader: &mut LineReader<R>,
    max_discarded: usize,
) -> Result<Response> {
    let mut discarded = 0;

    loop {
        let line = reader.read_line()?;
        match Response::parse(line) {
            Ok(response) => {
                if discarded > 0 {
                    tracing::trace!("Skipped {} lines before {}", discarded, response.kind());
                }
                return Ok(response);
            }
            Err(line) => {
                discarded += 1;
                tracing::trace!("Discarding unrecognized line: {:?}", line);
                if discarded > max_discarded {
                    return Err(ChatError::ResponseTimeout { discarded });
                }
            }
        }
    }
}
