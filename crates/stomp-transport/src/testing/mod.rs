//! Testing utilities for the transport layer.
//!
//! This module provides helpers for testing code that uses the STOMP
//! transport, including in-memory transports and frame encoding helpers.

mod memory;

pub use memory::MemoryTransport;

use bytes::BytesMut;
use tokio_util::codec::Encoder;

use crate::codec::StompCodec;
use crate::command::{Command, Frame};

/// Encode a bare command exactly as a default [`FrameWriter`](crate::FrameWriter)
/// would put it on the wire.
///
/// # Example
///
/// ```
/// use transport::Command;
/// use transport::testing::encode_command;
///
/// let bytes = encode_command(Command::Connect);
/// assert!(bytes.starts_with(b"CONNECT\n"));
/// assert!(bytes.ends_with(b"\n\n\0"));
/// ```
pub fn encode_command(command: Command) -> Vec<u8> {
    let mut buf = BytesMut::new();
    StompCodec::new()
        .encode(command, &mut buf)
        .expect("encoding a command cannot fail");
    buf.to_vec()
}

/// Encode a frame, e.g. to script what a fake broker sends back.
///
/// # Example
///
/// ```
/// use transport::{Command, Frame};
/// use transport::testing::encode_frame;
///
/// let bytes = encode_frame(Frame::new(Command::Connected).header("version", "1.2"));
/// assert_eq!(bytes, b"CONNECTED\nversion:1.2\n\n\0");
/// ```
pub fn encode_frame(frame: Frame) -> Vec<u8> {
    let mut buf = BytesMut::new();
    StompCodec::new()
        .encode(frame, &mut buf)
        .expect("encoding a frame cannot fail");
    buf.to_vec()
}

/// Split a byte stream on NUL terminators, returning each complete frame's
/// bytes without the terminator. Trailing bytes after the last NUL are
/// dropped.
pub fn split_frames(bytes: &[u8]) -> Vec<&[u8]> {
    let mut frames: Vec<&[u8]> = bytes.split(|b| *b == 0).collect();
    frames.pop();
    frames
}
