//! vnckeys — entry point.
//!
//! Connects to an RFB (VNC) server and types a sequence of keys on it, then
//! disconnects.  Useful for scripting input against headless VMs, kiosk
//! machines, and install automation.
//!
//! # Usage
//!
//! ```text
//! vnckeys [OPTIONS] [TOKENS]...
//!
//! Options:
//!   --host <HOST>                Server hostname [default: localhost]
//!   --port <PORT>                Server TCP port [default: 5900]
//!   --password <PASSWORD>        Password for VNC authentication
//!   --keys <LIST>                Comma/semicolon-separated key names
//!   --settle-ms <MS>             Delay after each key event [default: 25]
//!   --connect-timeout-secs <S>   Connect + handshake bound [default: 10]
//!   --exclusive                  Do not request shared access
//! ```
//!
//! Positional tokens are typed character by character; a token starting with
//! `/` is instead a `,`/`;`-separated list of symbolic key names, and `//`
//! types a literal `/`.  Examples:
//!
//! ```text
//! vnckeys --host=10.0.0.5 --keys=enter
//! vnckeys 'hello world' /enter
//! vnckeys /control_left,c          # Ctrl is pressed and released, then c
//! vnckeys //                       # a single '/'
//! ```
//!
//! Exit status is zero only when every key event was delivered.

use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use vnckeys_client::application::replay_keys::run_session;
use vnckeys_client::infrastructure::rfb::{RfbConnector, SessionConfig};
use vnckeys_core::build_sequence;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Type keys on a remote machine over the RFB (VNC) protocol.
#[derive(Debug, Parser)]
#[command(
    name = "vnckeys",
    about = "Replay a keystroke sequence against an RFB/VNC server",
    version
)]
struct Cli {
    /// Hostname or IP address of the RFB server.
    #[arg(long, default_value = "localhost", env = "VNC_HOST")]
    host: String,

    /// TCP port of the RFB server.  Display `:N` listens on port 5900+N.
    #[arg(long, default_value_t = 5900, env = "VNC_PORT")]
    port: u16,

    /// Password for VNC authentication, if the server requires one.
    #[arg(long, env = "VNC_PASSWORD")]
    password: Option<String>,

    /// Comma- or semicolon-separated symbolic key names, typed before any
    /// positional tokens (e.g. `--keys=enter,tab;f5`).
    #[arg(long)]
    keys: Option<String>,

    /// Settle delay in milliseconds inserted after every key-down and key-up
    /// event, so the server registers discrete keystrokes.
    #[arg(long, default_value_t = 25)]
    settle_ms: u64,

    /// Upper bound in seconds on TCP connect plus protocol handshake.
    #[arg(long, default_value_t = 10)]
    connect_timeout_secs: u64,

    /// Request exclusive access, disconnecting any existing viewer.
    /// By default the session is shared.
    #[arg(long)]
    exclusive: bool,

    /// Key tokens: literal character strings, or `/`-prefixed symbolic-name
    /// lists (`/left,right`), or `//` for a literal slash.
    tokens: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // Resolve every token before touching the network; a single unknown key
    // fails the whole run with no connection attempt.
    let sequence = build_sequence(cli.keys.as_deref(), &cli.tokens)
        .context("could not resolve key arguments")?;
    info!(keys = sequence.len(), host = %cli.host, port = cli.port, "starting key replay");

    let connector = RfbConnector::new(SessionConfig {
        host: cli.host,
        port: cli.port,
        password: cli.password,
        shared: !cli.exclusive,
        connect_timeout: Duration::from_secs(cli.connect_timeout_secs),
    });

    run_session(
        &connector,
        &sequence,
        Duration::from_millis(cli.settle_ms),
    )
    .await
    .context("key replay failed")?;

    info!("all keys delivered");
    Ok(())
}
