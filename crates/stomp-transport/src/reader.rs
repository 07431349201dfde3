//! Raw inbound byte reader.
//!
//! This module provides [`ByteReader`], a wrapper around a framed async
//! reader that produces a stream of unparsed byte chunks.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::Stream;
use pin_project_lite::pin_project;
use tokio::io::AsyncRead;
use tokio_util::codec::FramedRead;

use crate::codec::StompCodec;
use crate::error::CodecError;

pin_project! {
    /// An async stream of raw bytes received from the broker.
    ///
    /// Chunk boundaries follow whatever the underlying reads return; callers
    /// must not rely on them lining up with STOMP frames.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use futures::StreamExt;
    /// use transport::ByteReader;
    ///
    /// let mut reader = ByteReader::new(tcp_read_half);
    ///
    /// while let Some(chunk) = reader.next().await {
    ///     stdout.write_all(&chunk?).await?;
    /// }
    /// ```
    pub struct ByteReader<R> {
        #[pin]
        inner: FramedRead<R, StompCodec>,
    }
}

impl<R> ByteReader<R>
where
    R: AsyncRead + Unpin,
{
    /// Create a new reader from an async read source.
    pub fn new(reader: R) -> Self {
        Self {
            inner: FramedRead::new(reader, StompCodec::new()),
        }
    }

    /// Get a reference to the underlying reader.
    pub fn get_ref(&self) -> &R {
        self.inner.get_ref()
    }

    /// Consume the reader and return the underlying source.
    pub fn into_inner(self) -> R {
        self.inner.into_inner()
    }
}

impl<R> Stream for ByteReader<R>
where
    R: AsyncRead + Unpin,
{
    type Item = Result<Bytes, CodecError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.project().inner.poll_next(cx)
    }
}
