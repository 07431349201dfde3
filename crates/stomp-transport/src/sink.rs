//! Inbound byte sink.
//!
//! [`ByteSink`] is the destination for raw bytes received from the broker and
//! [`forward`] is the pump that moves chunks from a [`ByteReader`] into it.

use std::future::Future;
use std::io;

use futures::StreamExt;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;

use crate::error::CodecError;
use crate::reader::ByteReader;

/// Destination for raw inbound bytes.
///
/// Implementations must write every byte of every chunk, unmodified and in
/// order. Any [`AsyncWrite`] is a sink; each chunk is flushed before the next
/// one is accepted.
pub trait ByteSink: Send {
    /// Write one chunk in full.
    fn write_chunk(&mut self, chunk: &[u8]) -> impl Future<Output = io::Result<()>> + Send;
}

impl<W> ByteSink for W
where
    W: AsyncWrite + Unpin + Send,
{
    async fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.write_all(chunk).await?;
        self.flush().await
    }
}

/// How a [`forward`] pump finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardOutcome {
    /// The peer closed the connection.
    Eof,
    /// The close signal fired.
    Closed,
    /// Reading from the transport or writing to the sink failed. The close
    /// signal has been triggered.
    Failed,
}

/// Copy chunks from `reader` into `sink` until end of stream, an error, or
/// `close` is cancelled.
///
/// Errors are logged and turned into a close request; nothing is retried.
/// The sink is handed back so callers can inspect or reuse it.
pub async fn forward<R, S>(
    mut reader: ByteReader<R>,
    mut sink: S,
    close: CancellationToken,
) -> (S, ForwardOutcome)
where
    R: AsyncRead + Unpin,
    S: ByteSink,
{
    loop {
        let next = tokio::select! {
            biased;
            _ = close.cancelled() => {
                tracing::debug!("close requested, stopping inbound pump");
                return (sink, ForwardOutcome::Closed);
            }
            next = reader.next() => next,
        };

        let chunk = match next {
            Some(Ok(chunk)) => chunk,
            Some(Err(e)) => {
                fail(&e, &close);
                return (sink, ForwardOutcome::Failed);
            }
            None => {
                tracing::debug!("peer closed the connection");
                return (sink, ForwardOutcome::Eof);
            }
        };

        tracing::trace!(len = chunk.len(), "forwarding chunk");
        if let Err(e) = sink.write_chunk(&chunk).await {
            fail(&CodecError::Io(e), &close);
            return (sink, ForwardOutcome::Failed);
        }
    }
}

fn fail(error: &CodecError, close: &CancellationToken) {
    tracing::error!(%error, "error on connection, closing");
    close.cancel();
}
