//! Binary codec for control-channel events.
//!
//! Wire format:
//! ```text
//! [tag:1][payload:N]
//! ```
//! There is no outer length field: the payload length follows from the tag
//! and, for Text and Mouse, from a length/count field inside the payload.
//! All multi-byte integers are big-endian.

use thiserror::Error;

use crate::protocol::events::{
    CommandEvent, ControlEvent, EventType, KeycodeEvent, MouseEvent, Point, Position,
    ScrollEvent, Size, TextEvent, COMMAND_PAYLOAD_LENGTH, KEYCODE_PAYLOAD_LENGTH,
    MOUSE_HEADER_LENGTH, POINTER_RECORD_LENGTH, SCREEN_SIZE_LENGTH, SCROLL_PAYLOAD_LENGTH,
    TEXT_LENGTH_PREFIX, TEXT_MAX_LENGTH,
};
use crate::protocol::frame_buffer::{ByteCursor, FRAME_BUFFER_CAPACITY};
use crate::protocol::pointer_pool::PointerPool;

/// Largest contact count whose Mouse frame still fits in the receive buffer.
pub const MAX_MOUSE_POINTERS: usize =
    (FRAME_BUFFER_CAPACITY - 1 - MOUSE_HEADER_LENGTH - SCREEN_SIZE_LENGTH) / POINTER_RECORD_LENGTH;

/// Errors that can occur during event encoding or decoding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Not enough bytes are buffered yet.  This is the only recoverable
    /// variant: the decoder rewinds and waits for more data.
    #[error("insufficient data: need at least {needed} bytes, got {available}")]
    InsufficientData { needed: usize, available: usize },

    /// The tag byte does not name any event type.
    #[error("unknown event type: 0x{0:02X}")]
    UnknownEventType(u8),

    /// A Text event declares more bytes than the protocol allows.
    #[error("text length {length} exceeds maximum of {max} bytes")]
    TextTooLong { length: usize, max: usize },

    /// A frame can never fit into the receive buffer.
    #[error("frame of {needed} bytes exceeds the {capacity}-byte receive buffer")]
    FrameTooLarge { needed: usize, capacity: usize },

    /// A Mouse event carries more contacts than the one-byte count can express.
    #[error("too many pointers: {0} (maximum 255)")]
    TooManyPointers(usize),
}

impl ProtocolError {
    /// `true` for errors that mean "wait for more bytes" rather than a
    /// corrupted stream.
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, ProtocolError::InsufficientData { .. })
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Encodes a [`ControlEvent`] into its wire representation, tag included.
///
/// # Errors
///
/// Returns [`ProtocolError::TextTooLong`] for text over [`TEXT_MAX_LENGTH`]
/// bytes and [`ProtocolError::TooManyPointers`] for more than 255 contacts.
///
/// # Examples
///
/// ```rust
/// use mirror_core::protocol::{decode_event, encode_event};
/// use mirror_core::protocol::events::{CommandEvent, ControlEvent};
///
/// let event = ControlEvent::Command(CommandEvent { action: 0 });
/// let bytes = encode_event(&event).unwrap();
/// assert_eq!(bytes, vec![4, 0]);
/// let (decoded, consumed) = decode_event(&bytes).unwrap();
/// assert_eq!(decoded, event);
/// assert_eq!(consumed, 2);
/// ```
pub fn encode_event(event: &ControlEvent) -> Result<Vec<u8>, ProtocolError> {
    let mut buf = Vec::with_capacity(16);
    buf.push(event.event_type() as u8);
    match event {
        ControlEvent::Keycode(e) => encode_keycode(&mut buf, e),
        ControlEvent::Text(e) => encode_text(&mut buf, e)?,
        ControlEvent::Mouse(e) => encode_mouse(&mut buf, e)?,
        ControlEvent::Scroll(e) => encode_scroll(&mut buf, e),
        ControlEvent::Command(e) => buf.push(e.action),
    }
    Ok(buf)
}

/// Decodes one [`ControlEvent`] from the beginning of `bytes`.
///
/// Returns the event and the number of bytes consumed.  Mouse points are
/// freshly allocated; the streaming path in
/// [`EventDecoder`](crate::protocol::decoder::EventDecoder) uses a
/// [`PointerPool`] instead.
///
/// # Errors
///
/// Returns [`ProtocolError::InsufficientData`] if `bytes` holds only part of
/// an event, or a framing error if the bytes are malformed.
pub fn decode_event(bytes: &[u8]) -> Result<(ControlEvent, usize), ProtocolError> {
    let mut pool = PointerPool::with_max_pooled(0);
    let mut cursor = ByteCursor::new(bytes);
    let event = read_event(&mut cursor, &mut pool)?;
    Ok((event, cursor.consumed()))
}

/// Reads one event from `cursor`, drawing Mouse point arrays from `pool`.
///
/// On [`ProtocolError::InsufficientData`] the cursor may have moved; callers
/// discard it and retry from the original position (see
/// [`FrameBuffer::try_decode_unit`](crate::protocol::frame_buffer::FrameBuffer::try_decode_unit)).
pub fn read_event(
    cursor: &mut ByteCursor<'_>,
    pool: &mut PointerPool,
) -> Result<ControlEvent, ProtocolError> {
    let tag = cursor.get_u8()?;
    let event_type = EventType::try_from(tag).map_err(|_| ProtocolError::UnknownEventType(tag))?;
    match event_type {
        EventType::Keycode => read_keycode(cursor).map(ControlEvent::Keycode),
        EventType::Text => read_text(cursor).map(ControlEvent::Text),
        EventType::Mouse => read_mouse(cursor, pool).map(ControlEvent::Mouse),
        EventType::Scroll => read_scroll(cursor).map(ControlEvent::Scroll),
        EventType::Command => read_command(cursor).map(ControlEvent::Command),
    }
}

// ── Per-event encode helpers ──────────────────────────────────────────────────

fn encode_keycode(buf: &mut Vec<u8>, e: &KeycodeEvent) {
    buf.push(e.action);
    buf.extend_from_slice(&e.keycode.to_be_bytes());
    buf.extend_from_slice(&e.meta_state.to_be_bytes());
}

fn encode_text(buf: &mut Vec<u8>, e: &TextEvent) -> Result<(), ProtocolError> {
    let bytes = e.text.as_bytes();
    if bytes.len() > TEXT_MAX_LENGTH {
        return Err(ProtocolError::TextTooLong {
            length: bytes.len(),
            max: TEXT_MAX_LENGTH,
        });
    }
    buf.extend_from_slice(&(bytes.len() as u16).to_be_bytes());
    buf.extend_from_slice(bytes);
    Ok(())
}

fn encode_mouse(buf: &mut Vec<u8>, e: &MouseEvent) -> Result<(), ProtocolError> {
    let count = u8::try_from(e.points.len())
        .map_err(|_| ProtocolError::TooManyPointers(e.points.len()))?;
    buf.extend_from_slice(&e.action.to_be_bytes());
    buf.push(count);
    for sample in &e.points {
        buf.extend_from_slice(&sample.point.x.to_be_bytes());
        buf.extend_from_slice(&sample.point.y.to_be_bytes());
        buf.push(sample.id);
    }
    encode_size(buf, e.screen_size);
    Ok(())
}

fn encode_scroll(buf: &mut Vec<u8>, e: &ScrollEvent) {
    buf.extend_from_slice(&e.position.point.x.to_be_bytes());
    buf.extend_from_slice(&e.position.point.y.to_be_bytes());
    encode_size(buf, e.position.screen_size);
    buf.extend_from_slice(&e.h_scroll.to_be_bytes());
    buf.extend_from_slice(&e.v_scroll.to_be_bytes());
}

fn encode_size(buf: &mut Vec<u8>, size: Size) {
    buf.extend_from_slice(&size.width.to_be_bytes());
    buf.extend_from_slice(&size.height.to_be_bytes());
}

// ── Per-event decode helpers ──────────────────────────────────────────────────

fn read_keycode(c: &mut ByteCursor<'_>) -> Result<KeycodeEvent, ProtocolError> {
    c.require(KEYCODE_PAYLOAD_LENGTH)?;
    let action = c.get_u8()?;
    let keycode = c.get_i32()?;
    let meta_state = c.get_i32()?;
    Ok(KeycodeEvent {
        action,
        keycode,
        meta_state,
    })
}

fn read_text(c: &mut ByteCursor<'_>) -> Result<TextEvent, ProtocolError> {
    c.require(TEXT_LENGTH_PREFIX)?;
    let length = c.get_u16()? as usize;
    // Checked before waiting for the payload: a bogus prefix must not stall
    // the connection until 64 KiB have arrived.
    if length > TEXT_MAX_LENGTH {
        return Err(ProtocolError::TextTooLong {
            length,
            max: TEXT_MAX_LENGTH,
        });
    }
    let bytes = c.get_slice(length)?;
    let text = String::from_utf8_lossy(bytes).into_owned();
    Ok(TextEvent { text })
}

fn read_mouse(c: &mut ByteCursor<'_>, pool: &mut PointerPool) -> Result<MouseEvent, ProtocolError> {
    c.require(MOUSE_HEADER_LENGTH)?;
    let action = c.get_u16()?;
    let count = c.get_u8()? as usize;

    let body = count * POINTER_RECORD_LENGTH + SCREEN_SIZE_LENGTH;
    let frame = 1 + MOUSE_HEADER_LENGTH + body;
    if frame > FRAME_BUFFER_CAPACITY {
        return Err(ProtocolError::FrameTooLarge {
            needed: frame,
            capacity: FRAME_BUFFER_CAPACITY,
        });
    }
    // Every check happens before the pool lends out an array, so the
    // reads below cannot fail.
    c.require(body)?;

    let mut points = pool.acquire(count);
    for sample in points.iter_mut() {
        sample.point.x = c.get_u16()?;
        sample.point.y = c.get_u16()?;
        sample.id = c.get_u8()?;
    }
    let screen_size = read_size(c)?;
    Ok(MouseEvent {
        action,
        points,
        screen_size,
    })
}

fn read_scroll(c: &mut ByteCursor<'_>) -> Result<ScrollEvent, ProtocolError> {
    c.require(SCROLL_PAYLOAD_LENGTH)?;
    let point = Point::new(c.get_u16()?, c.get_u16()?);
    let screen_size = read_size(c)?;
    let h_scroll = c.get_i32()?;
    let v_scroll = c.get_i32()?;
    Ok(ScrollEvent {
        position: Position { point, screen_size },
        h_scroll,
        v_scroll,
    })
}

fn read_command(c: &mut ByteCursor<'_>) -> Result<CommandEvent, ProtocolError> {
    c.require(COMMAND_PAYLOAD_LENGTH)?;
    Ok(CommandEvent { action: c.get_u8()? })
}

fn read_size(c: &mut ByteCursor<'_>) -> Result<Size, ProtocolError> {
    let width = c.get_u16()?;
    let height = c.get_u16()?;
    Ok(Size { width, height })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::events::PointerSample;

    fn round_trip(event: &ControlEvent) -> ControlEvent {
        let encoded = encode_event(event).expect("encode failed");
        let (decoded, consumed) = decode_event(&encoded).expect("decode failed");
        assert_eq!(consumed, encoded.len(), "consumed bytes should equal total encoded size");
        decoded
    }

    // ── Keycode ──────────────────────────────────────────────────────────────

    #[test]
    fn test_keycode_wire_layout_matches_reference_bytes() {
        let bytes = [0x00, 0x01, 0x00, 0x00, 0x00, 0x13, 0x00, 0x00, 0x00, 0x01];

        let (event, consumed) = decode_event(&bytes).unwrap();

        assert_eq!(consumed, 10);
        assert_eq!(
            event,
            ControlEvent::Keycode(KeycodeEvent {
                action: 1,
                keycode: 19,
                meta_state: 1,
            })
        );
    }

    #[test]
    fn test_keycode_negative_fields_round_trip() {
        let event = ControlEvent::Keycode(KeycodeEvent {
            action: 0xFF,
            keycode: -1,
            meta_state: i32::MIN,
        });
        assert_eq!(round_trip(&event), event);
    }

    // ── Text ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_text_round_trip_preserves_multibyte_utf8() {
        let event = ControlEvent::Text(TextEvent {
            text: "héllo wörld ✓".to_string(),
        });
        assert_eq!(round_trip(&event), event);
    }

    #[test]
    fn test_text_at_max_length_round_trips() {
        let event = ControlEvent::Text(TextEvent {
            text: "x".repeat(TEXT_MAX_LENGTH),
        });
        assert_eq!(round_trip(&event), event);
    }

    #[test]
    fn test_text_over_max_length_is_rejected_before_payload_arrives() {
        // Only the tag and the length prefix are present.
        let bytes = [0x01, 0x01, 0x2D]; // length 301

        let result = decode_event(&bytes);

        assert_eq!(
            result,
            Err(ProtocolError::TextTooLong { length: 301, max: TEXT_MAX_LENGTH })
        );
    }

    #[test]
    fn test_encode_text_over_max_length_fails() {
        let event = ControlEvent::Text(TextEvent {
            text: "y".repeat(TEXT_MAX_LENGTH + 1),
        });
        assert!(matches!(encode_event(&event), Err(ProtocolError::TextTooLong { .. })));
    }

    #[test]
    fn test_text_with_invalid_utf8_is_decoded_lossily() {
        let bytes = [0x01, 0x00, 0x02, 0x61, 0xFF];

        let (event, _) = decode_event(&bytes).unwrap();

        assert_eq!(event, ControlEvent::Text(TextEvent { text: "a\u{FFFD}".into() }));
    }

    // ── Mouse ────────────────────────────────────────────────────────────────

    #[test]
    fn test_mouse_two_points_decodes_reference_layout() {
        let bytes = [
            0x02, // tag
            0x00, 0x02, // action MOVE
            0x02, // count
            0x00, 0x0A, 0x00, 0x14, 0x00, // (10, 20) id 0
            0x00, 0x1E, 0x00, 0x28, 0x01, // (30, 40) id 1
            0x04, 0x38, 0x07, 0x80, // 1080 x 1920
        ];

        let (event, consumed) = decode_event(&bytes).unwrap();

        assert_eq!(consumed, bytes.len());
        assert_eq!(
            event,
            ControlEvent::Mouse(MouseEvent {
                action: 2,
                points: vec![PointerSample::new(10, 20, 0), PointerSample::new(30, 40, 1)],
                screen_size: Size::new(1080, 1920),
            })
        );
    }

    #[test]
    fn test_mouse_zero_points_still_carries_screen_size() {
        let event = ControlEvent::Mouse(MouseEvent {
            action: 1,
            points: vec![],
            screen_size: Size::new(720, 1280),
        });
        let encoded = encode_event(&event).unwrap();
        assert_eq!(encoded.len(), 1 + MOUSE_HEADER_LENGTH + SCREEN_SIZE_LENGTH);
        assert_eq!(round_trip(&event), event);
    }

    #[test]
    fn test_mouse_action_with_pointer_index_round_trips() {
        // ACTION_POINTER_DOWN (5) for pointer index 1.
        let event = ControlEvent::Mouse(MouseEvent {
            action: 0x0105,
            points: vec![PointerSample::new(1, 2, 0), PointerSample::new(3, 4, 7)],
            screen_size: Size::new(1080, 2340),
        });
        assert_eq!(round_trip(&event), event);
    }

    #[test]
    fn test_mouse_missing_trailing_size_is_insufficient_data() {
        let bytes = [0x02, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x02, 0x00, 0x04];

        let result = decode_event(&bytes);

        assert!(matches!(result, Err(ProtocolError::InsufficientData { .. })));
    }

    #[test]
    fn test_mouse_frame_larger_than_buffer_is_rejected() {
        // 255 contacts need 1 + 3 + 255 * 5 + 4 = 1283 bytes.
        let bytes = [0x02, 0x00, 0x02, 0xFF];

        let result = decode_event(&bytes);

        assert_eq!(
            result,
            Err(ProtocolError::FrameTooLarge { needed: 1283, capacity: FRAME_BUFFER_CAPACITY })
        );
    }

    #[test]
    fn test_max_mouse_pointers_fills_all_but_one_byte_of_the_buffer() {
        assert_eq!(MAX_MOUSE_POINTERS, 203);
        let frame = 1
            + MOUSE_HEADER_LENGTH
            + MAX_MOUSE_POINTERS * POINTER_RECORD_LENGTH
            + SCREEN_SIZE_LENGTH;
        assert_eq!(frame, 1023);
    }

    #[test]
    fn test_encode_mouse_with_more_than_255_points_fails() {
        let event = ControlEvent::Mouse(MouseEvent {
            action: 2,
            points: vec![PointerSample::default(); 256],
            screen_size: Size::new(1, 1),
        });
        assert_eq!(encode_event(&event), Err(ProtocolError::TooManyPointers(256)));
    }

    // ── Scroll ───────────────────────────────────────────────────────────────

    #[test]
    fn test_scroll_round_trip() {
        let event = ControlEvent::Scroll(ScrollEvent {
            position: Position {
                point: Point::new(540, 960),
                screen_size: Size::new(1080, 1920),
            },
            h_scroll: -1,
            v_scroll: 3,
        });
        let encoded = encode_event(&event).unwrap();
        assert_eq!(encoded.len(), 1 + SCROLL_PAYLOAD_LENGTH);
        assert_eq!(round_trip(&event), event);
    }

    // ── Command ──────────────────────────────────────────────────────────────

    #[test]
    fn test_command_with_unrecognised_action_still_decodes() {
        // Unknown actions are a dispatch concern, not a framing error.
        let (event, consumed) = decode_event(&[0x04, 0x09]).unwrap();
        assert_eq!(event, ControlEvent::Command(CommandEvent { action: 9 }));
        assert_eq!(consumed, 2);
    }

    // ── Error conditions ─────────────────────────────────────────────────────

    #[test]
    fn test_decode_empty_bytes_returns_insufficient_data() {
        let result = decode_event(&[]);
        assert!(matches!(result, Err(ProtocolError::InsufficientData { .. })));
    }

    #[test]
    fn test_decode_unknown_tag_returns_error() {
        let result = decode_event(&[0x05, 0x00, 0x00]);
        assert_eq!(result, Err(ProtocolError::UnknownEventType(0x05)));
    }

    #[test]
    fn test_every_truncation_of_a_valid_frame_is_insufficient_data() {
        let event = ControlEvent::Scroll(ScrollEvent {
            position: Position {
                point: Point::new(1, 2),
                screen_size: Size::new(3, 4),
            },
            h_scroll: 5,
            v_scroll: 6,
        });
        let encoded = encode_event(&event).unwrap();

        for len in 0..encoded.len() {
            let result = decode_event(&encoded[..len]);
            assert!(
                result.as_ref().is_err_and(ProtocolError::is_insufficient_data),
                "prefix of {len} bytes should need more data, got {result:?}"
            );
        }
    }
}
