//! In-memory transport for testing.

use tokio::io::{DuplexStream, duplex};

use crate::transport::StompTransport;

/// An in-memory transport for testing STOMP traffic.
///
/// `MemoryTransport` uses tokio's [`DuplexStream`] to provide a bidirectional
/// in-memory channel that can be split into read and write halves. One end
/// plays the client, the other a fake broker.
///
/// # Example
///
/// ```
/// use transport::testing::MemoryTransport;
/// use transport::split;
///
/// let (client, broker) = MemoryTransport::pair();
///
/// let (client_reader, client_writer) = split(client);
/// let (broker_reader, broker_writer) = split(broker);
///
/// // client_writer -> broker_reader and broker_writer -> client_reader
/// ```
pub struct MemoryTransport {
    read: DuplexStream,
    write: DuplexStream,
}

impl MemoryTransport {
    /// Create a connected pair of in-memory transports.
    ///
    /// Uses a default buffer size of 64KB for each direction.
    pub fn pair() -> (Self, Self) {
        Self::pair_with_buffer_size(64 * 1024)
    }

    /// Create a connected pair with a custom buffer size.
    ///
    /// Smaller buffers force writes to be split across several reads.
    pub fn pair_with_buffer_size(buffer_size: usize) -> (Self, Self) {
        let (a_to_b_write, a_to_b_read) = duplex(buffer_size);
        let (b_to_a_write, b_to_a_read) = duplex(buffer_size);

        let transport_a = MemoryTransport {
            read: b_to_a_read,
            write: a_to_b_write,
        };

        let transport_b = MemoryTransport {
            read: a_to_b_read,
            write: b_to_a_write,
        };

        (transport_a, transport_b)
    }

    /// Give back the raw streams, for tests that script one side by hand.
    pub fn into_streams(self) -> (DuplexStream, DuplexStream) {
        (self.read, self.write)
    }
}

impl StompTransport for MemoryTransport {
    type Read = DuplexStream;
    type Write = DuplexStream;

    fn into_split(self) -> (Self::Read, Self::Write) {
        (self.read, self.write)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;
    use crate::split;
    use crate::testing::encode_command;
    use futures::StreamExt;

    #[tokio::test]
    async fn memory_transport_roundtrip() {
        let (client, broker) = MemoryTransport::pair();

        let (mut client_reader, mut client_writer) = split(client);
        let (mut broker_reader, mut broker_writer) = split(broker);

        client_writer.send(Command::Connect).await.unwrap();
        let chunk = broker_reader.next().await.unwrap().unwrap();
        assert_eq!(&chunk[..], encode_command(Command::Connect));

        broker_writer.send(Command::Connected).await.unwrap();
        let chunk = client_reader.next().await.unwrap().unwrap();
        assert_eq!(&chunk[..], b"CONNECTED\n\n\0");
    }

    #[tokio::test]
    async fn small_buffer_splits_frames() {
        let (client, broker) = MemoryTransport::pair_with_buffer_size(8);

        let (_client_reader, mut client_writer) = split(client);
        let (mut broker_reader, _broker_writer) = split(broker);

        let send = tokio::spawn(async move {
            client_writer.send(Command::Connect).await.unwrap();
        });

        let expected = encode_command(Command::Connect);
        let mut received = Vec::new();
        let mut chunks = 0;
        while received.len() < expected.len() {
            let chunk = broker_reader.next().await.unwrap().unwrap();
            assert!(chunk.len() <= 8);
            received.extend_from_slice(&chunk);
            chunks += 1;
        }
        send.await.unwrap();

        assert_eq!(received, expected);
        assert!(chunks > 1);
    }

    #[tokio::test]
    async fn memory_transport_close_signals_eof() {
        let (client, broker) = MemoryTransport::pair();

        let (_client_reader, client_writer) = split(client);
        let (mut broker_reader, _broker_writer) = split(broker);

        drop(client_writer);

        let result = broker_reader.next().await;
        assert!(result.is_none());
    }
}
