//! Android key tables.
//!
//! Keycode events are forwarded verbatim, so only Text events need a table:
//! [`AsciiCharacterMap`] decomposes characters into [`KeyStroke`]s.

pub mod android;
pub mod ascii;

pub use ascii::AsciiCharacterMap;

use serde::{Deserialize, Serialize};

/// One raw key event produced while typing a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyStroke {
    /// [`android::KEY_ACTION_DOWN`] or [`android::KEY_ACTION_UP`].
    pub action: u8,
    pub keycode: i32,
    pub meta_state: i32,
}

impl KeyStroke {
    pub const fn new(action: u8, keycode: i32, meta_state: i32) -> Self {
        Self {
            action,
            keycode,
            meta_state,
        }
    }
}
