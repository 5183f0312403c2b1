//! Printable-ASCII to Android key stroke table for a US virtual keyboard.
//!
//! Text events arrive as strings, but the device only accepts key events.
//! Each character is looked up in `ASCII_TABLE`, indexed by its code point,
//! which yields the Android key code and whether Shift must be held.
//! Characters outside the table are unmappable and stop the text early.

use super::android::*;
use super::KeyStroke;

/// One table slot: key code plus "needs shift".
#[derive(Clone, Copy)]
struct AsciiKey {
    keycode: i32,
    shifted: bool,
}

const fn plain(keycode: i32) -> Option<AsciiKey> {
    Some(AsciiKey {
        keycode,
        shifted: false,
    })
}

const fn shifted(keycode: i32) -> Option<AsciiKey> {
    Some(AsciiKey {
        keycode,
        shifted: true,
    })
}

/// Maps printable ASCII plus `\t` and `\n` to key strokes.
#[derive(Debug, Clone, Copy, Default)]
pub struct AsciiCharacterMap;

impl AsciiCharacterMap {
    pub fn new() -> Self {
        Self
    }

    /// Returns the down/up strokes that type `c`, or `None` if `c` has no key.
    ///
    /// Shifted characters are wrapped in a Shift press and release, and the
    /// character's own strokes carry the shift meta state.
    pub fn strokes(&self, c: char) -> Option<Vec<KeyStroke>> {
        let index = usize::try_from(u32::from(c)).ok()?;
        let key = (*ASCII_TABLE.get(index)?)?;
        if !key.shifted {
            return Some(vec![
                KeyStroke::new(KEY_ACTION_DOWN, key.keycode, META_NONE),
                KeyStroke::new(KEY_ACTION_UP, key.keycode, META_NONE),
            ]);
        }
        let meta = META_SHIFT_ON | META_SHIFT_LEFT_ON;
        Some(vec![
            KeyStroke::new(KEY_ACTION_DOWN, KEYCODE_SHIFT_LEFT, meta),
            KeyStroke::new(KEY_ACTION_DOWN, key.keycode, meta),
            KeyStroke::new(KEY_ACTION_UP, key.keycode, meta),
            KeyStroke::new(KEY_ACTION_UP, KEYCODE_SHIFT_LEFT, META_NONE),
        ])
    }
}

const ASCII_TABLE: [Option<AsciiKey>; 128] = {
    let mut t: [Option<AsciiKey>; 128] = [None; 128];

    t[b'\t' as usize] = plain(KEYCODE_TAB);
    t[b'\n' as usize] = plain(KEYCODE_ENTER);
    t[b' ' as usize] = plain(KEYCODE_SPACE);

    // ── Letters ──────────────────────────────────────────────────────────────
    let mut i = 0;
    while i < 26 {
        t[b'a' as usize + i] = plain(KEYCODE_A + i as i32);
        t[b'A' as usize + i] = shifted(KEYCODE_A + i as i32);
        i += 1;
    }

    // ── Digits and their shifted symbols ─────────────────────────────────────
    let mut d = 0;
    while d < 10 {
        t[b'0' as usize + d] = plain(KEYCODE_0 + d as i32);
        d += 1;
    }
    t[b')' as usize] = shifted(KEYCODE_0);
    t[b'!' as usize] = shifted(KEYCODE_0 + 1);
    t[b'@' as usize] = plain(KEYCODE_AT);
    t[b'#' as usize] = plain(KEYCODE_POUND);
    t[b'$' as usize] = shifted(KEYCODE_0 + 4);
    t[b'%' as usize] = shifted(KEYCODE_0 + 5);
    t[b'^' as usize] = shifted(KEYCODE_0 + 6);
    t[b'&' as usize] = shifted(KEYCODE_0 + 7);
    t[b'*' as usize] = plain(KEYCODE_STAR);
    t[b'(' as usize] = shifted(KEYCODE_0 + 9);

    // ── Punctuation ──────────────────────────────────────────────────────────
    t[b'`' as usize] = plain(KEYCODE_GRAVE);
    t[b'~' as usize] = shifted(KEYCODE_GRAVE);
    t[b'-' as usize] = plain(KEYCODE_MINUS);
    t[b'_' as usize] = shifted(KEYCODE_MINUS);
    t[b'=' as usize] = plain(KEYCODE_EQUALS);
    t[b'+' as usize] = plain(KEYCODE_PLUS);
    t[b'[' as usize] = plain(KEYCODE_LEFT_BRACKET);
    t[b'{' as usize] = shifted(KEYCODE_LEFT_BRACKET);
    t[b']' as usize] = plain(KEYCODE_RIGHT_BRACKET);
    t[b'}' as usize] = shifted(KEYCODE_RIGHT_BRACKET);
    t[b'\\' as usize] = plain(KEYCODE_BACKSLASH);
    t[b'|' as usize] = shifted(KEYCODE_BACKSLASH);
    t[b';' as usize] = plain(KEYCODE_SEMICOLON);
    t[b':' as usize] = shifted(KEYCODE_SEMICOLON);
    t[b'\'' as usize] = plain(KEYCODE_APOSTROPHE);
    t[b'"' as usize] = shifted(KEYCODE_APOSTROPHE);
    t[b',' as usize] = plain(KEYCODE_COMMA);
    t[b'<' as usize] = shifted(KEYCODE_COMMA);
    t[b'.' as usize] = plain(KEYCODE_PERIOD);
    t[b'>' as usize] = shifted(KEYCODE_PERIOD);
    t[b'/' as usize] = plain(KEYCODE_SLASH);
    t[b'?' as usize] = shifted(KEYCODE_SLASH);

    t
};
