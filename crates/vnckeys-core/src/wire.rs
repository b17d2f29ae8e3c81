//! RFB `KeyEvent` client message encoding.
//!
//! Wire format (RFC 6143 §7.5.4):
//! ```text
//! [msg_type:1 = 4][down_flag:1][padding:2][keysym:4]
//! ```
//! Total message size: 8 bytes.  The keysym is big-endian, as are all
//! multi-byte integers in RFB.
//!
//! Encoding lives here rather than next to the socket so the exact bytes can
//! be asserted in unit tests without any I/O.

/// RFB client message type for a key event.
pub const KEY_EVENT_MSG_TYPE: u8 = 4;

/// Size in bytes of an encoded `KeyEvent` message.
pub const KEY_EVENT_LEN: usize = 8;

/// Encodes one `KeyEvent` message.
///
/// `down` is `true` for a key press and `false` for a key release.
pub fn encode_key_event(keysym: u32, down: bool) -> [u8; KEY_EVENT_LEN] {
    let mut buf = [0u8; KEY_EVENT_LEN];
    buf[0] = KEY_EVENT_MSG_TYPE;
    buf[1] = down as u8;
    // buf[2..4] is padding, already zero.
    buf[4..8].copy_from_slice(&keysym.to_be_bytes());
    buf
}

// ── Tests ─────────────────────────────────────────────────────────────────────
