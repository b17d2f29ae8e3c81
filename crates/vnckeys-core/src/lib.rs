//! # vnckeys-core
//!
//! Pure library for vnc-sendkeys: textual key-descriptor resolution, key
//! sequence building, and RFB `KeyEvent` wire encoding.
//!
//! This crate is used by the `vnckeys-client` binary.  It has zero
//! dependencies on sockets, timers, or the OS, which keeps every function in
//! here trivially unit-testable.
//!
//! # What is a keysym? (for beginners)
//!
//! The RFB (remote framebuffer, a.k.a. VNC) protocol identifies keyboard keys
//! with X11 **KeySym** values, defined in X11/keysymdef.h.  Printable
//! characters use their character code directly (`0x61` is `a`), while
//! special keys live in the `0xFFxx` range (`0xFF0D` is Return, `0xFF1B` is
//! Escape).  The client sends one `KeyEvent` message per key transition:
//! down-flag set for press, cleared for release.
//!
//! The modules here map onto the replay pipeline, leaves first:
//!
//! - **`keysym`** – resolves a textual key descriptor (`"enter"`, `"bs"`,
//!   `"a"`) to its numeric keysym.
//! - **`sequence`** – expands the CLI's `--keys` option and positional
//!   arguments into an ordered list of resolved key descriptors.
//! - **`wire`** – encodes a keysym + press/release flag into the 8-byte RFB
//!   `KeyEvent` client message.

pub mod keysym;
pub mod sequence;
pub mod wire;

// Re-export the most-used items at the crate root so callers can write
// `vnckeys_core::build_sequence` instead of the full path.
pub use keysym::{resolve, KeyError};
pub use sequence::{build_sequence, KeyDescriptor};
pub use wire::{encode_key_event, KEY_EVENT_LEN};
