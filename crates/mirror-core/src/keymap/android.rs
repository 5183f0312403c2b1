//! Android input constants used on the wire and at the injection boundary.
//!
//! Values mirror `android.view.KeyEvent`, `android.view.MotionEvent`, and
//! `android.view.InputDevice`.  Peers put them on the wire unchanged, so
//! they are plain integers rather than enums: an unknown code must still be
//! forwarded verbatim.

// ── Key actions ───────────────────────────────────────────────────────────────

pub const KEY_ACTION_DOWN: u8 = 0;
pub const KEY_ACTION_UP: u8 = 1;

// ── Key codes ─────────────────────────────────────────────────────────────────

pub const KEYCODE_BACK: i32 = 4;
pub const KEYCODE_0: i32 = 7;
pub const KEYCODE_9: i32 = 16;
pub const KEYCODE_STAR: i32 = 17;
pub const KEYCODE_POUND: i32 = 18;
pub const KEYCODE_POWER: i32 = 26;
pub const KEYCODE_A: i32 = 29;
pub const KEYCODE_Z: i32 = 54;
pub const KEYCODE_COMMA: i32 = 55;
pub const KEYCODE_PERIOD: i32 = 56;
pub const KEYCODE_SHIFT_LEFT: i32 = 59;
pub const KEYCODE_TAB: i32 = 61;
pub const KEYCODE_SPACE: i32 = 62;
pub const KEYCODE_ENTER: i32 = 66;
pub const KEYCODE_GRAVE: i32 = 68;
pub const KEYCODE_MINUS: i32 = 69;
pub const KEYCODE_EQUALS: i32 = 70;
pub const KEYCODE_LEFT_BRACKET: i32 = 71;
pub const KEYCODE_RIGHT_BRACKET: i32 = 72;
pub const KEYCODE_BACKSLASH: i32 = 73;
pub const KEYCODE_SEMICOLON: i32 = 74;
pub const KEYCODE_APOSTROPHE: i32 = 75;
pub const KEYCODE_SLASH: i32 = 76;
pub const KEYCODE_AT: i32 = 77;
pub const KEYCODE_PLUS: i32 = 81;

// ── Meta state flags ──────────────────────────────────────────────────────────

pub const META_NONE: i32 = 0;
pub const META_SHIFT_ON: i32 = 0x01;
pub const META_SHIFT_LEFT_ON: i32 = 0x40;

// ── Motion actions ────────────────────────────────────────────────────────────

pub const MOTION_ACTION_DOWN: u16 = 0;
pub const MOTION_ACTION_UP: u16 = 1;
pub const MOTION_ACTION_MOVE: u16 = 2;
pub const MOTION_ACTION_POINTER_DOWN: u16 = 5;
pub const MOTION_ACTION_SCROLL: u16 = 8;

/// Bits of a motion action that hold the action itself; the high byte
/// carries the pointer index for POINTER_DOWN / POINTER_UP.
pub const MOTION_ACTION_MASK: u16 = 0x00FF;
pub const MOTION_ACTION_POINTER_INDEX_SHIFT: u16 = 8;

/// Strips the pointer index from a motion action.
pub const fn masked_action(action: u16) -> u16 {
    action & MOTION_ACTION_MASK
}

// ── Input sources ─────────────────────────────────────────────────────────────

pub const SOURCE_KEYBOARD: u32 = 0x0000_0101;
pub const SOURCE_TOUCHSCREEN: u32 = 0x0000_1002;
pub const SOURCE_MOUSE: u32 = 0x0000_2002;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_and_digit_ranges_are_contiguous() {
        assert_eq!(KEYCODE_Z - KEYCODE_A, 25);
        assert_eq!(KEYCODE_9 - KEYCODE_0, 9);
    }

    #[test]
    fn test_masked_action_strips_pointer_index() {
        let pointer_down_index_2 = (2 << MOTION_ACTION_POINTER_INDEX_SHIFT) | MOTION_ACTION_POINTER_DOWN;
        assert_eq!(masked_action(pointer_down_index_2), MOTION_ACTION_POINTER_DOWN);
        assert_eq!(masked_action(MOTION_ACTION_DOWN), MOTION_ACTION_DOWN);
    }
}
