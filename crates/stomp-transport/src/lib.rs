//! Async STOMP transport layer using tokio.
//!
//! This crate provides the framing and transport layer for a minimal STOMP
//! client: outgoing commands are encoded into STOMP frames, incoming bytes
//! are passed through untouched.
//!
//! # Architecture
//!
//! The crate is designed around the tokio-util codec pattern:
//!
//! - [`StompCodec`] implements `Encoder` for [`Command`]s and [`Frame`]s and a
//!   pass-through `Decoder` for raw bytes
//! - [`ByteReader`] wraps an `AsyncRead` to produce a `Stream` of raw chunks
//! - [`FrameWriter`] wraps an `AsyncWrite` to provide a `Sink` for outgoing
//!   frames
//! - [`ByteSink`] is where inbound chunks end up, and [`forward`] pumps them
//!   there
//! - [`ConnectionTarget`] describes where to connect and [`connect`] opens it
//!
//! # Usage
//!
//! ```ignore
//! use transport::{Command, ConnectionTarget};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let target = ConnectionTarget::from_args(&["localhost", "61613"]);
//!     let (reader, mut writer) = transport::split(transport::connect(&target).await?);
//!
//!     writer.send(Command::Connect).await?;
//!     transport::forward(reader, tokio::io::stdout(), CancellationToken::new()).await;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Scope
//!
//! Inbound STOMP frames are never parsed. Session lifecycle, waiting for
//! the operator and shutdown belong in the client crate.

mod codec;
mod command;
mod error;
mod reader;
mod sink;
mod target;
mod transport;
mod writer;

pub mod testing;

// Re-export main types
pub use codec::StompCodec;
pub use command::{Command, Frame, Handshake};
pub use error::CodecError;
pub use reader::ByteReader;
pub use sink::{ByteSink, ForwardOutcome, forward};
pub use target::{ConnectionTarget, DEFAULT_HOST, DEFAULT_PORT, Defaults};
pub use transport::{Connection, StompTransport, connect, split, split_with_codec};
pub use writer::FrameWriter;
