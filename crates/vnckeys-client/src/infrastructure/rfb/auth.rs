//! VNC authentication challenge-response.
//!
//! The server sends a random 16-byte challenge; the client DES-encrypts it
//! with a key derived from the password and sends the 16-byte result back.
//!
//! The key derivation is the protocol's historical quirk: the password is
//! truncated or zero-padded to 8 bytes, and then **each byte's bits are
//! reversed** before being used as the DES key.  Every VNC implementation
//! since the original AT&T code does this, so interoperability requires it.

use des::cipher::generic_array::GenericArray;
use des::cipher::{BlockEncrypt, KeyInit};
use des::Des;

/// Derives the DES key from a password, VNC-style.
fn vnc_des_key(password: &str) -> [u8; 8] {
    let mut key = [0u8; 8];
    for (slot, byte) in key.iter_mut().zip(password.bytes()) {
        *slot = byte.reverse_bits();
    }
    key
}

/// Encrypts the server's 16-byte challenge with the password-derived key.
///
/// Both 8-byte halves are encrypted independently in ECB fashion, as the
/// protocol specifies.
pub(super) fn encrypt_challenge(password: &str, challenge: &[u8; 16]) -> [u8; 16] {
    let key = GenericArray::from(vnc_des_key(password));
    let cipher = Des::new(&key);

    let mut response = *challenge;
    for block in response.chunks_exact_mut(8) {
        cipher.encrypt_block(GenericArray::from_mut_slice(block));
    }
    response
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_bytes_are_bit_reversed() {
        // 'a' = 0x61 = 0110_0001 → reversed 1000_0110 = 0x86.
        assert_eq!(vnc_des_key("a"), [0x86, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_key_is_truncated_to_eight_bytes() {
        let key = vnc_des_key("abcdefghIGNORED");
        assert_eq!(key.len(), 8);
        assert_eq!(key[7], b'h'.reverse_bits());
    }

    #[test]
    fn test_empty_password_zero_key_matches_des_test_vector() {
        // DES of an all-zero block under an all-zero key is the classic
        // 8CA64DE9C1B123A7 test vector; with a 16-byte zero challenge both
        // halves come out identical.
        let response = encrypt_challenge("", &[0u8; 16]);
        let expected = [0x8C, 0xA6, 0x4D, 0xE9, 0xC1, 0xB1, 0x23, 0xA7];
        assert_eq!(&response[0..8], &expected);
        assert_eq!(&response[8..16], &expected);
    }

    #[test]
    fn test_halves_are_encrypted_independently() {
        let mut challenge = [0u8; 16];
        challenge[8] = 0xFF; // only the second half differs
        let response = encrypt_challenge("pw", &challenge);
        assert_ne!(&response[0..8], &response[8..16]);

        // First half matches the all-zero-challenge first half.
        let zero_response = encrypt_challenge("pw", &[0u8; 16]);
        assert_eq!(&response[0..8], &zero_response[0..8]);
    }
}
