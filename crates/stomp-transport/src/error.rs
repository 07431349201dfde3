//! Error types for the transport layer.

use std::io;

/// Errors that can occur while moving STOMP bytes over a transport.
///
/// Encoding a frame never fails by itself; the I/O variant exists because the
/// codec error type has to absorb errors from the underlying stream.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// An I/O error occurred while reading or writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A command token did not name a STOMP command.
    #[error("unknown STOMP command {0:?}")]
    UnknownCommand(String),
}
