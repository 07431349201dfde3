//! STOMP codec implementation using tokio-util.
//!
//! This module provides [`StompCodec`], which encodes outgoing commands and
//! frames into the STOMP wire format and passes incoming bytes through
//! untouched.

use bytes::{BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::command::{Command, Frame, Handshake};
use crate::error::CodecError;

/// Codec for STOMP traffic.
///
/// Outgoing frames use the STOMP text format:
/// ```text
/// COMMAND\n
/// header:value\n
/// ...\n
/// \n
/// <body>\0
/// ```
///
/// Incoming bytes are not parsed: the decoder hands back whatever has been
/// buffered as a single raw chunk.
///
/// # Example
///
/// ```ignore
/// use tokio_util::codec::{FramedRead, FramedWrite};
/// use transport::StompCodec;
///
/// let framed = FramedWrite::new(writer, StompCodec::new());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StompCodec {
    /// Headers attached to CONNECT frames built from a bare [`Command`].
    handshake: Handshake,
}

impl StompCodec {
    /// Create a new codec with the default guest handshake.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new codec that sends the given handshake headers on CONNECT.
    pub fn with_handshake(handshake: Handshake) -> Self {
        Self { handshake }
    }

    pub fn handshake(&self) -> &Handshake {
        &self.handshake
    }

    /// Expand a bare command into the frame that is written for it.
    fn frame_for(&self, command: Command) -> Frame {
        match command {
            Command::Connect => Frame::connect(&self.handshake),
            other => Frame::new(other),
        }
    }
}

impl Decoder for StompCodec {
    type Item = Bytes;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }

        tracing::trace!(len = src.len(), "passing through inbound chunk");
        Ok(Some(src.split().freeze()))
    }
}

impl Encoder<Command> for StompCodec {
    type Error = CodecError;

    fn encode(&mut self, item: Command, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let frame = self.frame_for(item);
        Encoder::<Frame>::encode(self, frame, dst)
    }
}

impl Encoder<Frame> for StompCodec {
    type Error = CodecError;

    fn encode(&mut self, item: Frame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let command = item.command();
        let escape = !command.is_handshake();
        tracing::debug!(%command, headers = item.headers().len(), "encoding frame");

        dst.put_slice(command.as_str().as_bytes());
        dst.put_u8(b'\n');

        for (name, value) in item.headers() {
            put_header_part(dst, name, escape);
            dst.put_u8(b':');
            put_header_part(dst, value, escape);
            dst.put_u8(b'\n');
        }

        // Blank line, body, then the NUL terminator
        dst.put_u8(b'\n');
        dst.put_slice(item.payload());
        dst.put_u8(0);

        Ok(())
    }
}

/// Write a header name or value, applying STOMP 1.2 escaping if requested.
fn put_header_part(dst: &mut BytesMut, s: &str, escape: bool) {
    if !escape {
        dst.put_slice(s.as_bytes());
        return;
    }

    dst.reserve(s.len());
    for b in s.bytes() {
        match b {
            b'\\' => dst.put_slice(b"\\\\"),
            b'\n' => dst.put_slice(b"\\n"),
            b'\r' => dst.put_slice(b"\\r"),
            b':' => dst.put_slice(b"\\c"),
            other => dst.put_u8(other),
        }
    }
}
