//! Transport abstraction and split functionality.
//!
//! This module provides the [`StompTransport`] trait for abstracting over
//! different async byte streams, the [`split`] function for creating
//! reader/writer pairs, and [`connect`] for opening a stream to a
//! [`ConnectionTarget`].

use std::io;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};

use crate::codec::StompCodec;
use crate::reader::ByteReader;
use crate::target::ConnectionTarget;
use crate::writer::FrameWriter;

/// A transport that can be split into separate read and write halves.
///
/// This trait abstracts over different async transports (TCP, unix sockets,
/// in-memory streams) so the session layer does not care which one it got.
pub trait StompTransport: Send + 'static {
    /// The read half type.
    type Read: AsyncRead + Unpin + Send + 'static;
    /// The write half type.
    type Write: AsyncWrite + Unpin + Send + 'static;

    /// Split the transport into separate read and write halves.
    fn into_split(self) -> (Self::Read, Self::Write);
}

impl StompTransport for TcpStream {
    type Read = OwnedReadHalf;
    type Write = OwnedWriteHalf;

    fn into_split(self) -> (Self::Read, Self::Write) {
        TcpStream::into_split(self)
    }
}

#[cfg(unix)]
impl StompTransport for tokio::net::UnixStream {
    type Read = tokio::net::unix::OwnedReadHalf;
    type Write = tokio::net::unix::OwnedWriteHalf;

    fn into_split(self) -> (Self::Read, Self::Write) {
        tokio::net::UnixStream::into_split(self)
    }
}

/// Split a transport into a raw byte reader and a frame writer.
///
/// The writer uses a codec with the default guest handshake; use
/// [`split_with_codec`] to send different CONNECT headers.
pub fn split<T: StompTransport>(transport: T) -> (ByteReader<T::Read>, FrameWriter<T::Write>) {
    split_with_codec(transport, StompCodec::new())
}

/// Split a transport, encoding outgoing frames with `codec`.
pub fn split_with_codec<T: StompTransport>(
    transport: T,
    codec: StompCodec,
) -> (ByteReader<T::Read>, FrameWriter<T::Write>) {
    let (read, write) = transport.into_split();
    (ByteReader::new(read), FrameWriter::with_codec(write, codec))
}

/// An open connection to a broker, over TCP or a Unix socket.
pub struct Connection {
    read: Box<dyn AsyncRead + Unpin + Send>,
    write: Box<dyn AsyncWrite + Unpin + Send>,
}

impl Connection {
    fn from_transport<T: StompTransport>(transport: T) -> Self {
        let (read, write) = transport.into_split();
        Self {
            read: Box::new(read),
            write: Box::new(write),
        }
    }
}

impl StompTransport for Connection {
    type Read = Box<dyn AsyncRead + Unpin + Send>;
    type Write = Box<dyn AsyncWrite + Unpin + Send>;

    fn into_split(self) -> (Self::Read, Self::Write) {
        (self.read, self.write)
    }
}

/// Open a connection to `target`.
///
/// There is no timeout here: an attempt that never resolves waits forever.
/// Wrap the call in `tokio::time::timeout` to bound it.
#[tracing::instrument(skip_all, fields(%target))]
pub async fn connect(target: &ConnectionTarget) -> io::Result<Connection> {
    let connection = match target {
        ConnectionTarget::Tcp { host, port } => {
            let port = target.tcp_port().ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("port {port} is out of range"),
                )
            })?;
            let stream = TcpStream::connect((host.as_str(), port)).await?;
            tracing::debug!(peer = ?stream.peer_addr().ok(), "tcp connection established");
            Connection::from_transport(stream)
        }
        #[cfg(unix)]
        ConnectionTarget::Unix { path } => {
            let stream = tokio::net::UnixStream::connect(path).await?;
            tracing::debug!("unix socket connection established");
            Connection::from_transport(stream)
        }
        #[cfg(not(unix))]
        ConnectionTarget::Unix { .. } => {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "unix domain sockets are not supported on this platform",
            ));
        }
    };
    Ok(connection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    use crate::command::Command;

    #[tokio::test]
    async fn connect_tcp() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let target = ConnectionTarget::Tcp {
            host: "127.0.0.1".to_string(),
            port: port.into(),
        };
        let (connection, accepted) = tokio::join!(connect(&target), listener.accept());
        let (mut server, _) = accepted.unwrap();

        let (mut reader, mut writer) = split(connection.unwrap());
        writer.send(Command::Connect).await.unwrap();

        let mut buf = vec![0u8; 128];
        let n = tokio::io::AsyncReadExt::read(&mut server, &mut buf).await.unwrap();
        assert!(buf[..n].starts_with(b"CONNECT\n"));

        server.write_all(b"CONNECTED\n\n\0").await.unwrap();
        let chunk = reader.next().await.unwrap().unwrap();
        assert_eq!(&chunk[..], b"CONNECTED\n\n\0");
    }

    #[tokio::test]
    async fn connect_tcp_refused() {
        // Grab a free port and release it again so nothing is listening
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };

        let target = ConnectionTarget::Tcp {
            host: "127.0.0.1".to_string(),
            port: port.into(),
        };
        assert!(connect(&target).await.is_err());
    }

    #[tokio::test]
    async fn connect_tcp_out_of_range_port() {
        for port in [70000, -1] {
            let target = ConnectionTarget::Tcp {
                host: "127.0.0.1".to_string(),
                port,
            };
            let err = connect(&target).await.err().unwrap();
            assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn connect_unix() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stomp.sock");
        let listener = tokio::net::UnixListener::bind(&path).unwrap();

        let target = ConnectionTarget::Unix { path };
        let (connection, accepted) = tokio::join!(connect(&target), listener.accept());
        let (mut server, _) = accepted.unwrap();

        let (mut reader, _writer) = split(connection.unwrap());
        server.write_all(b"\0\x01\x02").await.unwrap();
        drop(server);

        let chunk = reader.next().await.unwrap().unwrap();
        assert_eq!(&chunk[..], b"\0\x01\x02");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn connect_unix_missing_socket() {
        let dir = tempfile::tempdir().unwrap();
        let target = ConnectionTarget::Unix {
            path: dir.path().join("missing.sock"),
        };
        assert!(connect(&target).await.is_err());
    }
}
