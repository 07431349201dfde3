//! Connection target resolution.
//!
//! Positional arguments are sniffed to decide between a TCP endpoint and a
//! Unix domain socket. The rules, in order:
//!
//! 1. two arguments where the second is a port: `host port`
//! 2. one argument that is not a port: a socket path
//! 3. one argument that is a port: the default host on that port
//! 4. anything else: the default host and port
//!
//! A single integer argument is always a port, never a path, even when it is
//! out of range for TCP. Such a port is rejected when connecting.
// TODO: replace positional sniffing with explicit `--host`/`--port`/`--unix` flags.

use std::fmt;
use std::path::PathBuf;

/// Host used when none is given.
pub const DEFAULT_HOST: &str = "::1";

/// Standard STOMP port.
pub const DEFAULT_PORT: u16 = 61613;

/// Where to connect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionTarget {
    /// A TCP endpoint. The port is whatever integer was given; see
    /// [`ConnectionTarget::tcp_port`].
    Tcp { host: String, port: i64 },
    /// A Unix domain socket.
    Unix { path: PathBuf },
}

/// Fallback host and port for arguments that do not name them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Defaults {
    pub host: String,
    pub port: u16,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ConnectionTarget {
    /// Resolve arguments using the built-in defaults.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Self {
        Self::resolve(args, &Defaults::default())
    }

    /// Resolve arguments against the given defaults.
    ///
    /// This never fails: every input maps to some target.
    pub fn resolve<S: AsRef<str>>(args: &[S], defaults: &Defaults) -> Self {
        let args: Vec<&str> = args.iter().map(AsRef::as_ref).collect();

        let fallback = || ConnectionTarget::Tcp {
            host: defaults.host.clone(),
            port: defaults.port.into(),
        };

        let target = match args.as_slice() {
            [host, port] => match parse_port(port) {
                Some(port) => ConnectionTarget::Tcp {
                    host: host.to_string(),
                    port,
                },
                None => fallback(),
            },
            [single] => match parse_port(single) {
                Some(port) => ConnectionTarget::Tcp {
                    host: defaults.host.clone(),
                    port,
                },
                None => ConnectionTarget::Unix {
                    path: PathBuf::from(single),
                },
            },
            _ => fallback(),
        };

        tracing::debug!(?args, %target, "resolved connection target");
        target
    }

    /// The TCP port to dial, or `None` for a Unix socket or a port outside
    /// `0..=65535`.
    pub fn tcp_port(&self) -> Option<u16> {
        match self {
            ConnectionTarget::Tcp { port, .. } => u16::try_from(*port).ok(),
            ConnectionTarget::Unix { .. } => None,
        }
    }
}

fn parse_port(s: &str) -> Option<i64> {
    s.parse().ok()
}

impl fmt::Display for ConnectionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionTarget::Tcp { host, port } if host.contains(':') => {
                write!(f, "[{host}]:{port}")
            }
            ConnectionTarget::Tcp { host, port } => write!(f, "{host}:{port}"),
            ConnectionTarget::Unix { path } => write!(f, "unix:{}", path.display()),
        }
    }
}
