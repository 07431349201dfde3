//! STOMP command and frame types.
//!
//! This module defines the closed set of STOMP verbs and the outgoing
//! [`Frame`] value that the codec serializes onto the wire.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;

use crate::error::CodecError;

/// A STOMP command verb.
///
/// Each variant maps to its canonical uppercase wire token, see
/// [`Command::as_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Connect,
    Connected,
    Send,
    Subscribe,
    Unsubscribe,
    Ack,
    Nack,
    Begin,
    Commit,
    Abort,
    Disconnect,
    Message,
    Receipt,
    Error,
}

impl Command {
    /// Every command, in protocol order.
    pub const ALL: [Command; 14] = [
        Command::Connect,
        Command::Connected,
        Command::Send,
        Command::Subscribe,
        Command::Unsubscribe,
        Command::Ack,
        Command::Nack,
        Command::Begin,
        Command::Commit,
        Command::Abort,
        Command::Disconnect,
        Command::Message,
        Command::Receipt,
        Command::Error,
    ];

    /// The wire token for this command.
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Connect => "CONNECT",
            Command::Connected => "CONNECTED",
            Command::Send => "SEND",
            Command::Subscribe => "SUBSCRIBE",
            Command::Unsubscribe => "UNSUBSCRIBE",
            Command::Ack => "ACK",
            Command::Nack => "NACK",
            Command::Begin => "BEGIN",
            Command::Commit => "COMMIT",
            Command::Abort => "ABORT",
            Command::Disconnect => "DISCONNECT",
            Command::Message => "MESSAGE",
            Command::Receipt => "RECEIPT",
            Command::Error => "ERROR",
        }
    }

    /// Whether header values in frames with this command are sent without
    /// escaping.
    ///
    /// STOMP 1.2 exempts the handshake frames from header escaping.
    pub fn is_handshake(&self) -> bool {
        matches!(self, Command::Connect | Command::Connected)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Command {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Command::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| CodecError::UnknownCommand(s.to_string()))
    }
}

/// Header values sent with the CONNECT handshake.
///
/// These are static placeholders: the client never authenticates with
/// anything other than the broker's guest account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handshake {
    /// Value of the `accept-version` header.
    pub accept_version: String,
    /// Value of the `login` header.
    pub login: String,
    /// Value of the `passcode` header.
    pub passcode: String,
}

impl Default for Handshake {
    fn default() -> Self {
        Self {
            accept_version: "1.2".to_string(),
            login: "guest".to_string(),
            passcode: "guest".to_string(),
        }
    }
}

/// An outgoing STOMP frame.
///
/// ```
/// use transport::{Command, Frame};
///
/// let frame = Frame::new(Command::Send)
///     .header("destination", "/queue/a")
///     .body("hello");
/// assert_eq!(frame.command(), Command::Send);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    command: Command,
    headers: Vec<(String, String)>,
    body: Bytes,
}

impl Frame {
    /// Create a frame with no headers and an empty body.
    pub fn new(command: Command) -> Self {
        Self {
            command,
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    /// Build the CONNECT frame for a handshake.
    pub fn connect(handshake: &Handshake) -> Self {
        Frame::new(Command::Connect)
            .header("accept-version", &handshake.accept_version)
            .header("login", &handshake.login)
            .header("passcode", &handshake.passcode)
    }

    /// Append a header. Order is preserved on the wire.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set the frame body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn command(&self) -> Command {
        self.command
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn payload(&self) -> &Bytes {
        &self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_round_trip() {
        for command in Command::ALL {
            let parsed: Command = command.to_string().parse().unwrap();
            assert_eq!(parsed, command);
        }
    }

    #[test]
    fn tokens_are_uppercase() {
        assert_eq!(Command::Connect.as_str(), "CONNECT");
        assert_eq!(Command::Unsubscribe.as_str(), "UNSUBSCRIBE");
        assert_eq!(Command::Nack.to_string(), "NACK");
    }

    #[test]
    fn parse_rejects_unknown_and_lowercase() {
        assert!(matches!(
            "connect".parse::<Command>(),
            Err(CodecError::UnknownCommand(s)) if s == "connect"
        ));
        assert!("STOMP".parse::<Command>().is_err());
    }

    #[test]
    fn connect_frame_uses_handshake_headers() {
        let frame = Frame::connect(&Handshake::default());
        assert_eq!(frame.command(), Command::Connect);
        assert_eq!(
            frame.headers(),
            &[
                ("accept-version".to_string(), "1.2".to_string()),
                ("login".to_string(), "guest".to_string()),
                ("passcode".to_string(), "guest".to_string()),
            ]
        );
        assert!(frame.payload().is_empty());
    }
}
