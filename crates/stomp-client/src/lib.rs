//! Session driver for the minimal STOMP client.
//!
//! Resolves where to connect, opens one connection, sends the CONNECT
//! handshake and streams everything the broker sends into a sink until the
//! session is closed.

pub mod args;
pub mod config;
pub mod session;

pub use args::Args;
pub use config::{Config, ConfigError};
pub use session::{
    BrokerSession, Session, SessionError, SessionOptions, SessionState, wait_for_termination,
};
