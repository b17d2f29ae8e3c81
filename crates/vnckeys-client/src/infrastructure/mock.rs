//! Mock RFB session for unit and integration testing.
//!
//! # Why a mock session?
//!
//! The real [`crate::infrastructure::rfb::RfbConnection`] needs a live RFB
//! server on the other end of a TCP socket.  The mock replaces the socket
//! with in-memory recording: every key event is pushed into a
//! `Mutex<Vec<(keysym, down)>>` in arrival order, so tests can assert exactly
//! what was sent and in what order.
//!
//! # Failure injection
//!
//! - [`MockConnector::fail_connect`] makes `connect` fail, for the
//!   no-dispatch-on-connect-error path.
//! - [`MockConnector::fail_at_event`] makes the nth `send_key_event` call
//!   (0-based, counting across the whole session) fail, for the
//!   abort-mid-sequence path.
//! - [`MockConnector::fail_close`] makes `close` fail, for the
//!   cleanup-never-shadows-the-outcome path.

use std::io;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::application::replay_keys::{RfbSession, SessionConnector, SessionError};

/// Shared record of everything a mock session did.
///
/// Tests hold an `Arc<MockSessionLog>` and inspect it after the session
/// controller has consumed the session itself.
#[derive(Default)]
pub struct MockSessionLog {
    /// Every `(keysym, down)` pair passed to `send_key_event`, in order.
    pub events: Mutex<Vec<(u32, bool)>>,
    /// Number of times `close` was called.
    pub close_calls: Mutex<usize>,
}

/// A session that records events instead of writing to a socket.
pub struct MockRfbSession {
    log: Arc<MockSessionLog>,
    /// Event index (0-based) at which `send_key_event` fails, if any.
    fail_at_event: Option<usize>,
    /// When `true`, `close` returns an error (after being counted).
    fail_close: bool,
    sent: usize,
}

#[async_trait]
impl RfbSession for MockRfbSession {
    async fn send_key_event(&mut self, keysym: u32, down: bool) -> Result<(), SessionError> {
        if self.fail_at_event == Some(self.sent) {
            return Err(SessionError::Dispatch(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "injected send failure",
            )));
        }
        self.sent += 1;
        self.log.events.lock().unwrap().push((keysym, down));
        Ok(())
    }

    async fn close(&mut self) -> Result<(), SessionError> {
        *self.log.close_calls.lock().unwrap() += 1;
        if self.fail_close {
            return Err(SessionError::Close(io::Error::new(
                io::ErrorKind::ConnectionReset,
                "injected close failure",
            )));
        }
        Ok(())
    }
}

/// Produces [`MockRfbSession`]s that all report into one shared log.
pub struct MockConnector {
    log: Arc<MockSessionLog>,
    fail_connect: bool,
    fail_at_event: Option<usize>,
    fail_close: bool,
}

impl MockConnector {
    /// Creates a connector whose sessions record into `log`.
    pub fn new(log: Arc<MockSessionLog>) -> Self {
        Self {
            log,
            fail_connect: false,
            fail_at_event: None,
            fail_close: false,
        }
    }

    /// Makes `connect` fail with a connection-refused error.
    pub fn fail_connect(mut self) -> Self {
        self.fail_connect = true;
        self
    }

    /// Makes the `index`th key event (0-based) fail.
    pub fn fail_at_event(mut self, index: usize) -> Self {
        self.fail_at_event = Some(index);
        self
    }

    /// Makes `close` fail.
    pub fn fail_close(mut self) -> Self {
        self.fail_close = true;
        self
    }
}

#[async_trait]
impl SessionConnector for MockConnector {
    type Session = MockRfbSession;

    async fn connect(&self) -> Result<Self::Session, SessionError> {
        if self.fail_connect {
            return Err(SessionError::Connect {
                host: "mock".to_string(),
                port: 5900,
                source: io::Error::new(io::ErrorKind::ConnectionRefused, "injected"),
            });
        }
        Ok(MockRfbSession {
            log: Arc::clone(&self.log),
            fail_at_event: self.fail_at_event,
            fail_close: self.fail_close,
            sent: 0,
        })
    }
}
