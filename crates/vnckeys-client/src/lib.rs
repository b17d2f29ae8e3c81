//! vnckeys-client library entry point.
//!
//! Re-exports the module tree so that integration tests in `tests/` and the
//! binary entry point in `main.rs` share the same code.
//!
//! # What does vnckeys do? (for beginners)
//!
//! `vnckeys` types keys on a remote machine.  It connects to an RFB (remote
//! framebuffer, a.k.a. VNC) server, performs the protocol handshake, and then
//! sends one key-press and one key-release event per requested key, with a
//! short settle delay between events so the server registers each transition
//! as a discrete keystroke.
//!
//! The pipeline, start to finish:
//!
//! 1. `main.rs` parses the CLI arguments into key tokens.
//! 2. `vnckeys-core` resolves the tokens into an ordered keysym sequence.
//! 3. The application layer opens a session via a [`application::replay_keys::SessionConnector`]
//!    and drives the sequence through it, strictly in order.
//! 4. The infrastructure layer supplies the real TCP/RFB session (and a mock
//!    recording session for tests).
//!
//! The session is always closed before the process reports its outcome,
//! whatever that outcome is.

/// Application layer: the dispatch sequencer and session controller.
pub mod application;

/// Infrastructure layer: the RFB network session and the test mock.
pub mod infrastructure;
