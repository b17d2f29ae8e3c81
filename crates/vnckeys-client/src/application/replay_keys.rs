//! ReplayKeys use case: drives a key sequence through an RFB session.
//!
//! Two pieces live here:
//!
//! - [`dispatch_sequence`] — the dispatch sequencer.  Sends key-down and
//!   key-up events strictly in sequence order with a settle delay after each
//!   event.  The loop is a single sequential task, so no event for descriptor
//!   i+1 can start before both events and both delays of descriptor i have
//!   completed.
//! - [`run_session`] — the session controller.  Opens the session through a
//!   [`SessionConnector`], delegates to the sequencer, and always closes the
//!   session before returning, on every exit path.
//!
//! # Why the settle delay?
//!
//! RFB servers interpret key state transitions as discrete, time-sensitive
//! signals.  Sending down/up pairs back-to-back can cause the server's input
//! layer to coalesce or reorder them, producing wrong remote input.  The
//! delay magnitude is configurable; historical clients have shipped anything
//! from 25 ms to 250 ms per event.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::time;
use tracing::{debug, warn};
use vnckeys_core::KeyDescriptor;

/// Errors surfaced by a session or by the replay pipeline around it.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The TCP connection to the server could not be established.
    #[error("failed to connect to {host}:{port}: {source}")]
    Connect {
        host: String,
        port: u16,
        #[source]
        source: std::io::Error,
    },
    /// The server did not accept the connection within the configured bound.
    #[error("timed out connecting to {host}:{port} after {timeout:?}")]
    ConnectTimeout {
        host: String,
        port: u16,
        timeout: Duration,
    },
    /// The server rejected authentication, or required a password we don't have.
    #[error("authentication failed: {0}")]
    Auth(String),
    /// The server sent something outside the RFB handshake we support.
    #[error("protocol error: {0}")]
    Protocol(String),
    /// An I/O error occurred during the handshake.
    #[error("handshake I/O error: {0}")]
    Handshake(#[source] std::io::Error),
    /// An I/O error occurred while sending a key event mid-sequence.
    #[error("failed to send key event: {0}")]
    Dispatch(#[source] std::io::Error),
    /// An I/O error occurred while closing the session.
    #[error("error while closing session: {0}")]
    Close(#[source] std::io::Error),
}

/// An open, handshake-complete RFB session capable of sending key events.
///
/// The real implementation talks TCP ([`crate::infrastructure::rfb::RfbConnection`]);
/// tests use the recording mock ([`crate::infrastructure::mock::MockRfbSession`]).
#[async_trait]
pub trait RfbSession: Send {
    /// Sends one `KeyEvent` message.  `down` is `true` for press, `false`
    /// for release.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Dispatch`] if the event could not be sent.
    async fn send_key_event(&mut self, keysym: u32, down: bool) -> Result<(), SessionError>;

    /// Closes the session.  Called exactly once per session, on every
    /// outcome.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Close`] if teardown fails; callers log this
    /// rather than letting it shadow a prior substantive error.
    async fn close(&mut self) -> Result<(), SessionError>;
}

/// Opens sessions.  The seam that lets tests run the full controller without
/// a network.
#[async_trait]
pub trait SessionConnector: Send + Sync {
    /// The session type this connector produces.
    type Session: RfbSession;

    /// Connects and completes the handshake.
    ///
    /// # Errors
    ///
    /// Returns a connect-phase [`SessionError`]; no key events have been sent
    /// when this fails.
    async fn connect(&self) -> Result<Self::Session, SessionError>;
}

/// Sends every descriptor in `sequence` as a down/up event pair, in order.
///
/// After each event the task sleeps for `settle` before the next event.  A
/// send failure aborts the remainder of the sequence immediately; events
/// already delivered are not undone, so the remote key state may be left
/// inconsistent.  That is surfaced, never masked.
///
/// An empty sequence completes immediately with no events sent.
///
/// # Errors
///
/// Returns the first [`SessionError`] reported by the session.
pub async fn dispatch_sequence<S: RfbSession + ?Sized>(
    session: &mut S,
    sequence: &[KeyDescriptor],
    settle: Duration,
) -> Result<(), SessionError> {
    for descriptor in sequence {
        debug!(
            token = %descriptor.token,
            keysym = format_args!("0x{:04X}", descriptor.keysym),
            "sending key"
        );
        session.send_key_event(descriptor.keysym, true).await?;
        time::sleep(settle).await;
        session.send_key_event(descriptor.keysym, false).await?;
        time::sleep(settle).await;
    }
    Ok(())
}

/// Runs one complete replay session: connect, dispatch, close.
///
/// The close step runs unconditionally once a session exists.  A close
/// failure is logged at `warn` and never overrides the dispatch outcome; a
/// connect failure aborts before any dispatch is attempted.
///
/// # Errors
///
/// Returns the connect error if the handshake never completed, otherwise the
/// dispatch outcome.
pub async fn run_session<C: SessionConnector>(
    connector: &C,
    sequence: &[KeyDescriptor],
    settle: Duration,
) -> Result<(), SessionError> {
    let mut session = connector.connect().await?;

    let result = dispatch_sequence(&mut session, sequence, settle).await;

    if let Err(e) = session.close().await {
        warn!("session close failed: {e}");
    }

    result
}

// ── Tests ─────────────────────────────────────────────────────────────────────
