//! Textual key descriptor to X11 KeySym resolution.
//!
//! KeySym values are defined in X11/keysymdef.h.
//! Reference: https://gitlab.freedesktop.org/xorg/proto/xorgproto/-/blob/master/include/X11/keysymdef.h
//!
//! Resolution has two paths, tried in order:
//!
//! 1. A fixed symbolic-name table (`"enter"`, `"page up"`, `"f5"`, …).
//!    Matching is case-sensitive, and several names are synonyms for the same
//!    keysym (`"bs"` and `"backspace"`, `"page up"` and `"page_up"`).
//! 2. A single-character fallback: any one-character token resolves to that
//!    character's Unicode scalar value.  This works because X11 keysyms for
//!    printable characters *are* their character codes (`0x61` = `a`).
//!
//! Anything else is an unknown key.

use thiserror::Error;

/// Errors produced while resolving key descriptors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    /// The token matched no symbolic name and is not a single character.
    #[error("unknown key: {0:?}")]
    UnknownKey(String),
}

/// Looks up a symbolic key name in the fixed table.
///
/// Returns `None` if `token` is not a recognised name.  Synonyms map to the
/// same keysym; both space- and underscore-separated spellings are accepted
/// for the two-word names.
pub fn lookup_named(token: &str) -> Option<u32> {
    let keysym = match token {
        "backspace" => 0xFF08,       // XK_BackSpace
        "bs" => 0xFF08,              // XK_BackSpace
        "tab" => 0xFF09,             // XK_Tab
        "return" => 0xFF0D,          // XK_Return
        "enter" => 0xFF0D,           // XK_Return
        "escape" => 0xFF1B,          // XK_Escape
        "insert" => 0xFF63,          // XK_Insert
        "delete" => 0xFFFF,          // XK_Delete
        "del" => 0xFFFF,             // XK_Delete
        "home" => 0xFF50,            // XK_Home
        "end" => 0xFF57,             // XK_End
        "page up" => 0xFF55,         // XK_Page_Up
        "page down" => 0xFF56,       // XK_Page_Down
        "page_up" => 0xFF55,         // XK_Page_Up
        "page_down" => 0xFF56,       // XK_Page_Down
        "left" => 0xFF51,            // XK_Left
        "up" => 0xFF52,              // XK_Up
        "right" => 0xFF53,           // XK_Right
        "down" => 0xFF54,            // XK_Down
        "f1" => 0xFFBE,              // XK_F1
        "f2" => 0xFFBF,              // XK_F2
        "f3" => 0xFFC0,              // XK_F3
        "f4" => 0xFFC1,              // XK_F4
        "f5" => 0xFFC2,              // XK_F5
        "f6" => 0xFFC3,              // XK_F6
        "f7" => 0xFFC4,              // XK_F7
        "f8" => 0xFFC5,              // XK_F8
        "f9" => 0xFFC6,              // XK_F9
        "f10" => 0xFFC7,             // XK_F10
        "f11" => 0xFFC8,             // XK_F11
        "f12" => 0xFFC9,             // XK_F12
        "shift left" => 0xFFE1,      // XK_Shift_L
        "shift right" => 0xFFE2,     // XK_Shift_R
        "shift_left" => 0xFFE1,      // XK_Shift_L
        "shift_right" => 0xFFE2,     // XK_Shift_R
        "control left" => 0xFFE3,    // XK_Control_L
        "control right" => 0xFFE4,   // XK_Control_R
        "control_left" => 0xFFE3,    // XK_Control_L
        "control_right" => 0xFFE4,   // XK_Control_R
        "meta left" => 0xFFE7,       // XK_Meta_L
        "meta right" => 0xFFE8,      // XK_Meta_R
        "meta_left" => 0xFFE7,       // XK_Meta_L
        "meta_right" => 0xFFE8,      // XK_Meta_R
        "alt" => 0xFFE9,             // XK_Alt_L
        "alt left" => 0xFFE9,        // XK_Alt_L
        "alt right" => 0xFFEA,       // XK_Alt_R
        "alt_left" => 0xFFE9,        // XK_Alt_L
        "alt_right" => 0xFFEA,       // XK_Alt_R
        "alt_gr" => 0xFFEA,          // XK_Alt_R
        _ => return None,
    };
    Some(keysym)
}

/// Resolves a textual key descriptor to a keysym.
///
/// Symbolic names win over the single-character fallback, so `"a"` and
/// `"delete"` both do what you expect (there is no one-character symbolic
/// name, so the paths never actually conflict).
///
/// # Errors
///
/// Returns [`KeyError::UnknownKey`] if `token` matches no symbolic name and
/// is not exactly one character.
pub fn resolve(token: &str) -> Result<u32, KeyError> {
    if let Some(keysym) = lookup_named(token) {
        return Ok(keysym);
    }
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c as u32),
        _ => Err(KeyError::UnknownKey(token.to_string())),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synonyms_resolve_to_same_keysym() {
        // Each pair is documented as equivalent.
        let pairs = [
            ("bs", "backspace"),
            ("return", "enter"),
            ("del", "delete"),
            ("page up", "page_up"),
            ("page down", "page_down"),
            ("shift left", "shift_left"),
            ("shift right", "shift_right"),
            ("control left", "control_left"),
            ("control right", "control_right"),
            ("meta left", "meta_left"),
            ("meta right", "meta_right"),
            ("alt", "alt_left"),
            ("alt right", "alt_gr"),
        ];
        for (a, b) in pairs {
            assert_eq!(resolve(a), resolve(b), "{a:?} and {b:?} must match");
        }
    }

    #[test]
    fn test_named_keys_use_x11_keysym_values() {
        assert_eq!(resolve("backspace"), Ok(0xFF08));
        assert_eq!(resolve("tab"), Ok(0xFF09));
        assert_eq!(resolve("enter"), Ok(0xFF0D));
        assert_eq!(resolve("escape"), Ok(0xFF1B));
        assert_eq!(resolve("insert"), Ok(0xFF63));
        assert_eq!(resolve("delete"), Ok(0xFFFF));
        assert_eq!(resolve("home"), Ok(0xFF50));
        assert_eq!(resolve("end"), Ok(0xFF57));
        assert_eq!(resolve("left"), Ok(0xFF51));
        assert_eq!(resolve("up"), Ok(0xFF52));
        assert_eq!(resolve("right"), Ok(0xFF53));
        assert_eq!(resolve("down"), Ok(0xFF54));
        assert_eq!(resolve("f1"), Ok(0xFFBE));
        assert_eq!(resolve("f12"), Ok(0xFFC9));
        assert_eq!(resolve("alt_gr"), Ok(0xFFEA));
    }

    #[test]
    fn test_single_character_falls_back_to_scalar_value() {
        assert_eq!(resolve("a"), Ok('a' as u32));
        assert_eq!(resolve("A"), Ok(0x41));
        assert_eq!(resolve("/"), Ok(0x2F));
        assert_eq!(resolve(" "), Ok(0x20));
        // Non-ASCII single characters use their Unicode scalar value.
        assert_eq!(resolve("ä"), Ok('ä' as u32));
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        // "Enter" is not in the table and is multi-character, so it fails.
        assert_eq!(
            resolve("Enter"),
            Err(KeyError::UnknownKey("Enter".to_string()))
        );
    }

    #[test]
    fn test_unknown_multi_character_token_fails() {
        assert_eq!(
            resolve("no-such-key"),
            Err(KeyError::UnknownKey("no-such-key".to_string()))
        );
        assert_eq!(resolve(""), Err(KeyError::UnknownKey(String::new())));
    }
}
