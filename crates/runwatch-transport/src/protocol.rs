//! Wire protocol for inbound log frames.

use runwatch_core::{LogRecord, Scope};

/// Inbound frame of a log stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// JSON encoded log record.
    Text(String),
    Binary(Vec<u8>),
    Ping,
    Pong,
    /// Peer closed the stream.
    Close,
}

/// Malformed text frame.
#[derive(Debug, thiserror::Error)]
#[error("parse msg error: {0}")]
pub struct DecodeError(#[from] serde_json::Error);

/// Decode a text frame into the record shape of the session scope.
///
/// # Errors
/// Returns error if the payload is not a valid record of that shape.
pub fn decode(text: &str, scope: &Scope) -> Result<LogRecord, DecodeError> {
    let record = match scope {
        Scope::Run { .. } => LogRecord::Run(serde_json::from_str(text)?),
        Scope::Admin => LogRecord::Admin(serde_json::from_str(text)?),
    };
    Ok(record)
}
