//! Expansion of raw CLI key arguments into an ordered key sequence.
//!
//! Two independent sources feed the sequence, always in this order:
//!
//! 1. The `--keys` option value, split on `,` or `;`, each piece resolved as
//!    a key descriptor.
//! 2. Each positional argument, expanded by the rule below.
//!
//! # Positional token expansion
//!
//! | Token shape | Meaning                                                  |
//! |-------------|----------------------------------------------------------|
//! | `//…`       | a single literal `/` key press                           |
//! | `/a,b;c`    | symbolic-name list: `a`, `b`, `c` resolved individually  |
//! | `hello`     | one key press per character: `h` `e` `l` `l` `o`         |
//!
//! The resulting order is exactly the order keys are typed on the remote
//! side, so every step here is order-preserving.  The build is atomic: one
//! unresolvable token fails the whole sequence and nothing is dispatched.

use crate::keysym::{resolve, KeyError};

/// A single key to press and release, with its resolved keysym.
///
/// Immutable once built; `token` is kept purely for logging and error
/// reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyDescriptor {
    /// The textual descriptor this entry was resolved from.
    pub token: String,
    /// The resolved X11 keysym sent on the wire.
    pub keysym: u32,
}

impl KeyDescriptor {
    fn new(token: impl Into<String>) -> Result<Self, KeyError> {
        let token = token.into();
        let keysym = resolve(&token)?;
        Ok(Self { token, keysym })
    }
}

/// Splits a `--keys`-style list on `,` and `;`.
fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split([',', ';'])
}

/// Expands one positional argument into descriptors, appending to `out`.
fn expand_positional(arg: &str, out: &mut Vec<KeyDescriptor>) -> Result<(), KeyError> {
    if arg.starts_with("//") {
        // Escape form: the whole token collapses to one literal slash.
        out.push(KeyDescriptor::new("/")?);
    } else if let Some(rest) = arg.strip_prefix('/') {
        for piece in split_list(rest) {
            out.push(KeyDescriptor::new(piece)?);
        }
    } else {
        for c in arg.chars() {
            out.push(KeyDescriptor::new(c.to_string())?);
        }
    }
    Ok(())
}

/// Builds the ordered key sequence from the CLI's two key sources.
///
/// `keys` is the raw `--keys` option value, if given; `positionals` are the
/// remaining arguments in their original order.  An absent or empty `keys`
/// value contributes nothing; an empty positional list contributes nothing;
/// both empty yields an empty (valid) sequence.
///
/// # Errors
///
/// Returns [`KeyError::UnknownKey`] for the first unresolvable token.  No
/// partial sequence is returned.
///
/// # Examples
///
/// ```rust
/// use vnckeys_core::build_sequence;
///
/// let seq = build_sequence(Some("enter"), &["hi".to_string()]).unwrap();
/// let syms: Vec<u32> = seq.iter().map(|d| d.keysym).collect();
/// assert_eq!(syms, vec![0xFF0D, 'h' as u32, 'i' as u32]);
/// ```
pub fn build_sequence(
    keys: Option<&str>,
    positionals: &[String],
) -> Result<Vec<KeyDescriptor>, KeyError> {
    let mut sequence = Vec::new();

    if let Some(value) = keys {
        if !value.is_empty() {
            for piece in split_list(value) {
                sequence.push(KeyDescriptor::new(piece)?);
            }
        }
    }

    for arg in positionals {
        expand_positional(arg, &mut sequence)?;
    }

    Ok(sequence)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
