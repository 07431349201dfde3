//! STOMP frame writer.
//!
//! This module provides [`FrameWriter`], a typed wrapper around a framed
//! async writer for sending STOMP commands and frames.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::{Sink, SinkExt};
use pin_project_lite::pin_project;
use tokio::io::AsyncWrite;
use tokio_util::codec::{Encoder, FramedWrite};

use crate::codec::StompCodec;
use crate::command::Command;
use crate::error::CodecError;

pin_project! {
    /// An async sink for outgoing STOMP frames.
    ///
    /// `FrameWriter` accepts anything the [`StompCodec`] can encode: a bare
    /// [`Command`] or a fully built [`Frame`](crate::Frame).
    ///
    /// # Example
    ///
    /// ```ignore
    /// use transport::{Command, FrameWriter};
    ///
    /// let mut writer = FrameWriter::new(tcp_write_half);
    /// writer.send(Command::Connect).await?;
    /// ```
    pub struct FrameWriter<W> {
        #[pin]
        inner: FramedWrite<W, StompCodec>,
    }
}

impl<W> FrameWriter<W>
where
    W: AsyncWrite + Unpin,
{
    /// Create a new writer using the default guest handshake.
    pub fn new(writer: W) -> Self {
        Self {
            inner: FramedWrite::new(writer, StompCodec::new()),
        }
    }

    /// Create a new writer with a custom codec.
    pub fn with_codec(writer: W, codec: StompCodec) -> Self {
        Self {
            inner: FramedWrite::new(writer, codec),
        }
    }

    /// Encode a command or frame and flush it to the transport.
    pub async fn send<I>(&mut self, item: I) -> Result<(), CodecError>
    where
        StompCodec: Encoder<I, Error = CodecError>,
    {
        SinkExt::send(&mut self.inner, item).await
    }

    /// Flush pending frames and shut down the write half.
    pub async fn close(&mut self) -> Result<(), CodecError> {
        SinkExt::<Command>::close(&mut self.inner).await
    }

    /// Get a reference to the underlying writer.
    pub fn get_ref(&self) -> &W {
        self.inner.get_ref()
    }

    /// Consume the writer and return the underlying destination.
    pub fn into_inner(self) -> W {
        self.inner.into_inner()
    }
}

impl<W, I> Sink<I> for FrameWriter<W>
where
    W: AsyncWrite,
    StompCodec: Encoder<I, Error = CodecError>,
{
    type Error = CodecError;

    fn poll_ready(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Sink::<I>::poll_ready(self.project().inner, cx)
    }

    fn start_send(self: Pin<&mut Self>, item: I) -> Result<(), Self::Error> {
        Sink::<I>::start_send(self.project().inner, item)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Sink::<I>::poll_flush(self.project().inner, cx)
    }

    fn poll_close(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Sink::<I>::poll_close(self.project().inner, cx)
    }
}
