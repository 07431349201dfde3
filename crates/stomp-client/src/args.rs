//! Command line arguments.

use clap::Parser;
use transport::{ConnectionTarget, Defaults};

/// Connect to a STOMP broker, send CONNECT and print everything it sends back.
///
/// Press enter (or close stdin) to disconnect.
#[derive(Debug, Parser)]
#[command(version)]
pub struct Args {
    /// Broker host, a port on the default host, or a unix socket path
    pub target: Option<String>,

    /// Broker port, when the first argument is a host
    pub port: Option<String>,
}

impl Args {
    /// The positional arguments, in order.
    pub fn positional(&self) -> Vec<&str> {
        self.target
            .iter()
            .chain(self.port.iter())
            .map(String::as_str)
            .collect()
    }

    pub fn resolve(&self, defaults: &Defaults) -> ConnectionTarget {
        ConnectionTarget::resolve(&self.positional(), defaults)
    }
}
