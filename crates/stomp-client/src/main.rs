use clap::Parser;
use color_eyre::eyre::{self, Context};
use tracing_subscriber::EnvFilter;

use client::{Args, BrokerSession, Config, wait_for_termination};

/// Set to `1` or `true` to log JSON instead of plain text.
const LOG_JSON_ENV: &str = "STOMP_CLIENT_LOG_JSON";

fn init_tracing() {
    let json = std::env::var(LOG_JSON_ENV)
        .map(|val| val == "1" || val == "true")
        .unwrap_or(false);

    // stdout carries the broker's bytes, so logs go to stderr
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();
    }
}

fn main() -> eyre::Result<()> {
    color_eyre::install().context("installing color_eyre")?;
    init_tracing();

    let args = Args::parse();
    let config = Config::load().context("loading configuration")?;
    let target = args.resolve(&config.defaults());
    tracing::debug!(%target, "starting session");

    // One worker thread runs the connection while this thread waits on stdin
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .context("building tokio runtime")?;

    let session = runtime
        .block_on(BrokerSession::open(
            &target,
            tokio::io::stdout(),
            config.session_options(),
        ))
        .context("opening STOMP session")?;

    wait_for_termination(std::io::stdin().lock()).context("waiting for operator input")?;

    let (_, outcome) = runtime
        .block_on(session.close())
        .context("closing connection")?;
    tracing::debug!(?outcome, "connection closed");

    // Dropping the runtime blocks until its worker has shut down
    drop(runtime);

    println!("stomp-client disconnected");
    Ok(())
}
