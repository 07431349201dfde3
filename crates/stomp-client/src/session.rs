//! A single STOMP session: one connection, one handshake, one inbound pump.

use std::io::{self, BufRead};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncWrite;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use transport::{
    ByteSink, CodecError, Command, ConnectionTarget, ForwardOutcome, FrameWriter,
    Handshake, StompCodec, StompTransport,
};

/// Errors that end a session before or while it is set up.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("connecting to {target}")]
    Connect {
        target: ConnectionTarget,
        #[source]
        source: io::Error,
    },

    #[error("timed out after {timeout:?} connecting to {target}")]
    ConnectTimeout {
        target: ConnectionTarget,
        timeout: Duration,
    },

    #[error("sending {command} frame")]
    Send {
        command: Command,
        #[source]
        source: CodecError,
    },

    #[error("inbound pump task failed")]
    Pump(#[source] tokio::task::JoinError),

    #[error("write half shutdown task failed")]
    Shutdown(#[source] tokio::task::JoinError),
}

/// Connection lifecycle as seen by the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Connecting,
    Connected,
    Closing,
    Closed,
}

/// Knobs for opening a session.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Headers sent with the CONNECT frame.
    pub handshake: Handshake,
    /// Upper bound on connection establishment. `None` waits forever.
    pub connect_timeout: Option<Duration>,
}

/// Session over a connection opened with [`Session::open`].
pub type BrokerSession<S> = Session<Box<dyn AsyncWrite + Unpin + Send>, S>;

/// An established STOMP session.
///
/// The session owns the write half of the connection. The read half is
/// owned by a background task that copies every received byte into the
/// sink until the session is closed, the peer hangs up, or an error occurs.
///
/// A second task shuts down the write half as soon as a close is requested,
/// whether by [`Session::close`] or by the pump after a transport error.
pub struct Session<W, S> {
    writer: Arc<Mutex<FrameWriter<W>>>,
    pump: JoinHandle<(S, ForwardOutcome)>,
    shutdown: JoinHandle<()>,
    close: CancellationToken,
    state: SessionState,
}

impl<S> BrokerSession<S>
where
    S: ByteSink + 'static,
{
    /// Connect to `target` and start a session on the new connection.
    #[tracing::instrument(skip_all, fields(%target))]
    pub async fn open(
        target: &ConnectionTarget,
        sink: S,
        options: SessionOptions,
    ) -> Result<Self, SessionError> {
        let mut state = SessionState::Idle;
        transition(&mut state, SessionState::Connecting);

        let connecting = transport::connect(target);
        let connected = match options.connect_timeout {
            Some(timeout) => tokio::time::timeout(timeout, connecting)
                .await
                .map_err(|_| SessionError::ConnectTimeout {
                    target: target.clone(),
                    timeout,
                })?,
            None => connecting.await,
        };
        let connection = connected.map_err(|source| SessionError::Connect {
            target: target.clone(),
            source,
        })?;

        Session::establish(connection, sink, options.handshake, state).await
    }
}

impl<W, S> Session<W, S>
where
    W: AsyncWrite + Unpin + Send + 'static,
    S: ByteSink + 'static,
{
    /// Start a session on an already established transport.
    pub async fn start<T>(transport: T, sink: S, handshake: Handshake) -> Result<Self, SessionError>
    where
        T: StompTransport<Write = W>,
    {
        let mut state = SessionState::Idle;
        transition(&mut state, SessionState::Connecting);
        Session::establish(transport, sink, handshake, state).await
    }

    async fn establish<T>(
        transport: T,
        sink: S,
        handshake: Handshake,
        mut state: SessionState,
    ) -> Result<Self, SessionError>
    where
        T: StompTransport<Write = W>,
    {
        let (reader, writer) =
            transport::split_with_codec(transport, StompCodec::with_handshake(handshake));
        transition(&mut state, SessionState::Connected);

        let writer = Arc::new(Mutex::new(writer));
        let close = CancellationToken::new();
        let pump = tokio::spawn(transport::forward(reader, sink, close.clone()));
        let shutdown = tokio::spawn(shut_down_on_close(writer.clone(), close.clone()));

        let mut session = Session {
            writer,
            pump,
            shutdown,
            close,
            state,
        };
        if let Err(error) = session.send(Command::Connect).await {
            // stop the background tasks, the caller never gets the session
            session.close.cancel();
            return Err(error);
        }
        Ok(session)
    }

    async fn send(&mut self, command: Command) -> Result<(), SessionError> {
        tracing::debug!(%command, "sending frame");
        let mut writer = self.writer.lock().await;
        writer
            .send(command)
            .await
            .map_err(|source| SessionError::Send { command, source })
    }

    /// Current lifecycle state.
    ///
    /// A session whose pump hit an error reports [`SessionState::Closing`]
    /// until it is closed.
    pub fn state(&self) -> SessionState {
        if self.state == SessionState::Connected && self.close.is_cancelled() {
            SessionState::Closing
        } else {
            self.state
        }
    }

    /// Whether a close has been requested, by [`Session::close`] or by the
    /// pump after a transport error.
    pub fn is_close_requested(&self) -> bool {
        self.close.is_cancelled()
    }

    /// Resolves once a close has been requested.
    pub async fn close_requested(&self) {
        self.close.cancelled().await
    }

    /// Close the connection and wait for the pump to stop.
    ///
    /// Returns the sink and how the pump ended.
    #[tracing::instrument(skip(self))]
    pub async fn close(mut self) -> Result<(S, ForwardOutcome), SessionError> {
        transition(&mut self.state, SessionState::Closing);
        self.close.cancel();

        self.shutdown.await.map_err(SessionError::Shutdown)?;
        let (sink, outcome) = self.pump.await.map_err(SessionError::Pump)?;
        transition(&mut self.state, SessionState::Closed);
        tracing::debug!(?outcome, "inbound pump stopped");
        Ok((sink, outcome))
    }
}

/// Shut down the write half once `close` fires.
async fn shut_down_on_close<W>(writer: Arc<Mutex<FrameWriter<W>>>, close: CancellationToken)
where
    W: AsyncWrite + Unpin,
{
    close.cancelled().await;

    let mut writer = writer.lock().await;
    // The peer may already be gone; there is nothing left to do about it.
    if let Err(error) = writer.close().await {
        tracing::debug!(%error, "shutting down write half");
    }
    tracing::debug!("write half shut down");
}

fn transition(state: &mut SessionState, to: SessionState) {
    tracing::info!(from = ?*state, ?to, "session state change");
    *state = to;
}

/// Block until the operator enters a line or closes the input.
///
/// The line itself is discarded.
pub fn wait_for_termination(mut input: impl BufRead) -> io::Result<()> {
    let mut line = Vec::new();
    let n = input.read_until(b'\n', &mut line)?;
    if n == 0 {
        tracing::debug!("end of input");
    } else {
        tracing::debug!("termination line received");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use transport::testing::{MemoryTransport, encode_command, split_frames};

    #[tokio::test]
    async fn start_sends_exactly_one_connect() {
        let (client, broker) = MemoryTransport::pair();
        let (mut broker_read, _broker_write) = broker.into_streams();

        let session = Session::start(client, Vec::new(), Handshake::default())
            .await
            .unwrap();
        assert_eq!(session.state(), SessionState::Connected);

        let (_, outcome) = session.close().await.unwrap();
        assert_eq!(outcome, ForwardOutcome::Closed);

        let mut received = Vec::new();
        broker_read.read_to_end(&mut received).await.unwrap();
        assert_eq!(received, encode_command(Command::Connect));
        assert_eq!(split_frames(&received).len(), 1);
    }

    #[tokio::test]
    async fn inbound_bytes_reach_the_sink() {
        let (client, broker) = MemoryTransport::pair();
        let (_broker_read, mut broker_write) = broker.into_streams();
        let (sink, mut output) = tokio::io::duplex(1024);

        let session = Session::start(client, sink, Handshake::default())
            .await
            .unwrap();

        let reply = b"CONNECTED\nversion:1.2\n\n\0";
        broker_write.write_all(reply).await.unwrap();

        let mut seen = vec![0u8; reply.len()];
        output.read_exact(&mut seen).await.unwrap();
        assert_eq!(&seen, reply);

        session.close().await.unwrap();
    }

    #[tokio::test]
    async fn peer_hangup_is_not_an_error() {
        let (client, broker) = MemoryTransport::pair();
        let session = Session::start(client, Vec::new(), Handshake::default())
            .await
            .unwrap();

        drop(broker);
        // Give the pump a chance to observe the hang-up before closing
        tokio::task::yield_now().await;

        let (sink, outcome) = session.close().await.unwrap();
        assert!(matches!(outcome, ForwardOutcome::Eof | ForwardOutcome::Closed));
        assert!(sink.is_empty());
    }

    #[test]
    fn termination_on_line() {
        wait_for_termination(Cursor::new("anything at all\nmore\n")).unwrap();
    }

    #[test]
    fn termination_ignores_line_content() {
        wait_for_termination(Cursor::new(vec![0xff, 0xfe, b'\n'])).unwrap();
    }

    #[test]
    fn termination_on_end_of_input() {
        wait_for_termination(Cursor::new("")).unwrap();
    }
}
