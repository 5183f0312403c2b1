//! All control-channel event types.
//!
//! Events follow the wire format of the mirroring peer: one tag byte followed
//! by a fixed or length-prefixed payload.  All multi-byte integers are
//! big-endian.
//!
//! ```text
//! tag 0  Keycode  [action:1][keycode:4][meta_state:4]
//! tag 1  Text     [len:2][utf8:len]                        len <= 300
//! tag 2  Mouse    [action:2][count:1]{[x:2][y:2][id:1]}*count[width:2][height:2]
//! tag 3  Scroll   [x:2][y:2][width:2][height:2][h_scroll:4][v_scroll:4]
//! tag 4  Command  [action:1]
//! ```

use serde::{Deserialize, Serialize};

// ── Protocol constants ────────────────────────────────────────────────────────

/// Maximum length in bytes of the UTF-8 payload of a Text event.
pub const TEXT_MAX_LENGTH: usize = 300;

/// Payload bytes following the tag of a Keycode event.
pub const KEYCODE_PAYLOAD_LENGTH: usize = 9;

/// Fixed bytes of a Mouse event before the point records (action + count).
pub const MOUSE_HEADER_LENGTH: usize = 3;

/// Bytes of one point record inside a Mouse event (x, y, id).
pub const POINTER_RECORD_LENGTH: usize = 5;

/// Bytes of the trailing reporting resolution (width, height).
pub const SCREEN_SIZE_LENGTH: usize = 4;

/// Payload bytes following the tag of a Scroll event.
pub const SCROLL_PAYLOAD_LENGTH: usize = 16;

/// Payload bytes following the tag of a Command event.
pub const COMMAND_PAYLOAD_LENGTH: usize = 1;

/// Length prefix of a Text event.
pub const TEXT_LENGTH_PREFIX: usize = 2;

// ── Event type tags ───────────────────────────────────────────────────────────

/// The tag byte that opens every event frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum EventType {
    Keycode = 0,
    Text = 1,
    Mouse = 2,
    Scroll = 3,
    Command = 4,
}

impl TryFrom<u8> for EventType {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, ()> {
        match value {
            0 => Ok(EventType::Keycode),
            1 => Ok(EventType::Text),
            2 => Ok(EventType::Mouse),
            3 => Ok(EventType::Scroll),
            4 => Ok(EventType::Command),
            _ => Err(()),
        }
    }
}

// ── Command actions ───────────────────────────────────────────────────────────

/// Command actions carried by [`CommandEvent::action`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum CommandAction {
    /// Press BACK when the display is on, POWER otherwise.
    BackOrScreenOn = 0,
}

impl TryFrom<u8> for CommandAction {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, ()> {
        match value {
            0 => Ok(CommandAction::BackOrScreenOn),
            _ => Err(()),
        }
    }
}

// ── Geometry ──────────────────────────────────────────────────────────────────

/// A position in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: u16,
    pub y: u16,
}

impl Point {
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: u16,
    pub height: u16,
}

impl Size {
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// A point together with the reporting resolution it was computed against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub point: Point,
    pub screen_size: Size,
}

/// One touch contact inside a [`MouseEvent`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointerSample {
    /// Contact position in the event's reporting resolution.
    pub point: Point,
    /// Pointer identifier, stable from touch-down to touch-up.
    pub id: u8,
}

impl PointerSample {
    pub const fn new(x: u16, y: u16, id: u8) -> Self {
        Self {
            point: Point::new(x, y),
            id,
        }
    }
}

// ── Per-event payload structs ─────────────────────────────────────────────────

/// KEYCODE (0): a raw key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeycodeEvent {
    /// Android `KeyEvent.ACTION_*`.
    pub action: u8,
    /// Android `KeyEvent.KEYCODE_*`.
    pub keycode: i32,
    /// Android `KeyEvent.META_*` bitmask.
    pub meta_state: i32,
}

/// TEXT (1): text to be typed on the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEvent {
    /// At most [`TEXT_MAX_LENGTH`] bytes once UTF-8 encoded.
    pub text: String,
}

/// MOUSE (2): a multi-touch motion sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MouseEvent {
    /// Android `MotionEvent.ACTION_*`, including the pointer index in the high byte.
    pub action: u16,
    /// Every active contact, in wire order.
    pub points: Vec<PointerSample>,
    /// Resolution the peer used to compute the coordinates.
    pub screen_size: Size,
}

/// SCROLL (3): a scroll-wheel motion at a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrollEvent {
    pub position: Position,
    pub h_scroll: i32,
    pub v_scroll: i32,
}

/// COMMAND (4): a high-level command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandEvent {
    /// Raw action byte; see [`CommandAction`] for the recognised values.
    pub action: u8,
}

// ── Top-level event enum ──────────────────────────────────────────────────────

/// One decoded unit of the control protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlEvent {
    Keycode(KeycodeEvent),
    Text(TextEvent),
    Mouse(MouseEvent),
    Scroll(ScrollEvent),
    Command(CommandEvent),
}

impl ControlEvent {
    /// Returns the tag byte that identifies this event on the wire.
    pub fn event_type(&self) -> EventType {
        match self {
            ControlEvent::Keycode(_) => EventType::Keycode,
            ControlEvent::Text(_) => EventType::Text,
            ControlEvent::Mouse(_) => EventType::Mouse,
            ControlEvent::Scroll(_) => EventType::Scroll,
            ControlEvent::Command(_) => EventType::Command,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_try_from_accepts_all_known_tags() {
        for (byte, expected) in [
            (0u8, EventType::Keycode),
            (1, EventType::Text),
            (2, EventType::Mouse),
            (3, EventType::Scroll),
            (4, EventType::Command),
        ] {
            assert_eq!(EventType::try_from(byte), Ok(expected));
            assert_eq!(expected as u8, byte);
        }
    }

    #[test]
    fn test_event_type_try_from_rejects_unknown_tag() {
        assert!(EventType::try_from(5).is_err());
        assert!(EventType::try_from(0xFF).is_err());
    }

    #[test]
    fn test_command_action_back_or_screen_on_is_zero() {
        assert_eq!(CommandAction::try_from(0), Ok(CommandAction::BackOrScreenOn));
        assert!(CommandAction::try_from(1).is_err());
    }

    #[test]
    fn test_control_event_reports_its_event_type() {
        let event = ControlEvent::Command(CommandEvent { action: 0 });
        assert_eq!(event.event_type(), EventType::Command);

        let event = ControlEvent::Text(TextEvent { text: "hi".into() });
        assert_eq!(event.event_type(), EventType::Text);
    }

    #[test]
    fn test_largest_text_frame_fits_minimum_buffer() {
        // tag + length prefix + max text must stay well below the 1 KiB frame buffer.
        assert!(1 + TEXT_LENGTH_PREFIX + TEXT_MAX_LENGTH < 1024);
    }
}
