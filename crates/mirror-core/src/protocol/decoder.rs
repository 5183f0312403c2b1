//! Streaming event decoder: a [`FrameBuffer`] plus a [`PointerPool`].

use tokio::io::AsyncRead;
use tracing::trace;

use crate::protocol::codec::{read_event, ProtocolError};
use crate::protocol::events::ControlEvent;
use crate::protocol::frame_buffer::{BufferError, FrameBuffer};
use crate::protocol::pointer_pool::PointerPool;

/// Turns an arbitrarily chunked byte stream into [`ControlEvent`]s.
///
/// The decoder owns no transport.  Callers alternate between
/// [`next_event`](Self::next_event) and [`refill`](Self::refill):
///
/// ```rust
/// use mirror_core::protocol::decoder::EventDecoder;
///
/// let mut decoder = EventDecoder::new();
/// decoder.fill_from_slice(&[0x04]);
/// assert_eq!(decoder.next_event().unwrap(), None); // Command needs one more byte
/// decoder.fill_from_slice(&[0x00]);
/// assert!(decoder.next_event().unwrap().is_some());
/// ```
#[derive(Default)]
pub struct EventDecoder {
    buffer: FrameBuffer,
    pool: PointerPool,
}

impl EventDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a decoder that draws Mouse point arrays from `pool`.
    pub fn with_pool(pool: PointerPool) -> Self {
        Self {
            buffer: FrameBuffer::new(),
            pool,
        }
    }

    /// Attempts to decode one event from the buffered bytes.
    ///
    /// Returns `Ok(None)` when the buffer holds only a prefix of the next
    /// event; in that case no bytes are consumed.
    ///
    /// # Errors
    ///
    /// Any [`ProtocolError`] other than `InsufficientData`.  The stream is
    /// unusable afterwards.
    pub fn next_event(&mut self) -> Result<Option<ControlEvent>, ProtocolError> {
        let pool = &mut self.pool;
        let event = self.buffer.try_decode_unit(|cursor| read_event(cursor, pool))?;
        if let Some(event) = &event {
            trace!(event_type = ?event.event_type(), "decoded control event");
        }
        Ok(event)
    }

    /// Reads more bytes from `source` into the buffer.
    pub async fn refill<R>(&mut self, source: &mut R) -> Result<usize, BufferError>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        self.buffer.refill(source).await
    }

    /// Copies in-memory bytes into the buffer; returns how many fit.
    pub fn fill_from_slice(&mut self, bytes: &[u8]) -> usize {
        self.buffer.fill_from_slice(bytes)
    }

    /// `true` when the buffer is full of undecodable bytes.
    pub fn is_full(&self) -> bool {
        self.buffer.is_full()
    }

    /// Buffered bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.buffer.remaining()
    }

    /// Returns a handled event's storage to the decoder.
    ///
    /// Only Mouse events own pooled storage; other variants are dropped.
    pub fn recycle(&mut self, event: ControlEvent) {
        if let ControlEvent::Mouse(mouse) = event {
            self.pool.release(mouse.points);
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::codec::{encode_event, MAX_MOUSE_POINTERS};
    use crate::protocol::frame_buffer::FRAME_BUFFER_CAPACITY;
    use crate::protocol::events::{
        CommandEvent, KeycodeEvent, MouseEvent, PointerSample, Size, TextEvent,
    };

    fn mouse(points: Vec<PointerSample>) -> ControlEvent {
        ControlEvent::Mouse(MouseEvent {
            action: 2,
            points,
            screen_size: Size::new(1080, 1920),
        })
    }

    #[test]
    fn test_keycode_fed_one_byte_at_a_time_is_emitted_once_complete() {
        // Arrange
        let bytes = [0x00, 0x01, 0x00, 0x00, 0x00, 0x13, 0x00, 0x00, 0x00, 0x01];
        let mut decoder = EventDecoder::new();

        // Act / Assert: nothing for the first nine bytes.
        for byte in &bytes[..9] {
            decoder.fill_from_slice(&[*byte]);
            assert_eq!(decoder.next_event().unwrap(), None);
        }
        decoder.fill_from_slice(&bytes[9..]);
        assert_eq!(
            decoder.next_event().unwrap(),
            Some(ControlEvent::Keycode(KeycodeEvent {
                action: 1,
                keycode: 19,
                meta_state: 1,
            }))
        );
        assert_eq!(decoder.remaining(), 0);
    }

    #[test]
    fn test_multiple_events_in_one_chunk_decode_in_order() {
        let mut bytes = encode_event(&ControlEvent::Command(CommandEvent { action: 0 })).unwrap();
        bytes.extend(encode_event(&ControlEvent::Text(TextEvent { text: "ok".into() })).unwrap());
        let mut decoder = EventDecoder::new();
        decoder.fill_from_slice(&bytes);

        assert_eq!(
            decoder.next_event().unwrap(),
            Some(ControlEvent::Command(CommandEvent { action: 0 }))
        );
        assert_eq!(
            decoder.next_event().unwrap(),
            Some(ControlEvent::Text(TextEvent { text: "ok".into() }))
        );
        assert_eq!(decoder.next_event().unwrap(), None);
    }

    #[test]
    fn test_unknown_tag_is_fatal() {
        let mut decoder = EventDecoder::new();
        decoder.fill_from_slice(&[0x07]);

        assert_eq!(decoder.next_event(), Err(ProtocolError::UnknownEventType(7)));
    }

    #[test]
    fn test_recycled_mouse_points_are_reused_by_the_next_event() {
        // Arrange
        let event = mouse(vec![PointerSample::new(1, 2, 0), PointerSample::new(3, 4, 1)]);
        let bytes = encode_event(&event).unwrap();
        let mut decoder = EventDecoder::new();
        decoder.fill_from_slice(&bytes);
        let first = decoder.next_event().unwrap().unwrap();
        let first_ptr = match &first {
            ControlEvent::Mouse(m) => m.points.as_ptr(),
            other => panic!("expected mouse, got {other:?}"),
        };
        decoder.recycle(first);

        // Act
        decoder.fill_from_slice(&bytes);
        let second = decoder.next_event().unwrap().unwrap();

        // Assert
        match &second {
            ControlEvent::Mouse(m) => {
                assert_eq!(m.points.as_ptr(), first_ptr);
                assert_eq!(m.points, vec![PointerSample::new(1, 2, 0), PointerSample::new(3, 4, 1)]);
            }
            other => panic!("expected mouse, got {other:?}"),
        }
    }

    #[test]
    fn test_short_mouse_frame_does_not_take_from_the_pool() {
        let bytes = encode_event(&mouse(vec![PointerSample::new(9, 9, 0)])).unwrap();
        let mut decoder = EventDecoder::new();

        decoder.fill_from_slice(&bytes[..bytes.len() - 1]);
        assert_eq!(decoder.next_event().unwrap(), None);
        decoder.fill_from_slice(&bytes[bytes.len() - 1..]);
        let event = decoder.next_event().unwrap();

        assert_eq!(event, Some(mouse(vec![PointerSample::new(9, 9, 0)])));
    }

    #[test]
    fn test_largest_mouse_frame_that_fits_the_buffer_decodes() {
        // Arrange: 203 contacts encode to 1023 bytes.
        let points: Vec<PointerSample> = (0..MAX_MOUSE_POINTERS)
            .map(|i| PointerSample::new(i as u16, i as u16, i as u8))
            .collect();
        let bytes = encode_event(&mouse(points.clone())).unwrap();
        assert_eq!(bytes.len(), FRAME_BUFFER_CAPACITY - 1);
        let mut decoder = EventDecoder::new();
        decoder.fill_from_slice(&bytes);

        // Act
        let event = decoder.next_event().unwrap();

        // Assert
        assert_eq!(event, Some(mouse(points)));
        assert_eq!(decoder.remaining(), 0);
    }

    #[test]
    fn test_one_contact_past_the_limit_is_frame_too_large() {
        let points = vec![PointerSample::default(); MAX_MOUSE_POINTERS + 1];
        let bytes = encode_event(&mouse(points)).unwrap();
        let mut decoder = EventDecoder::new();
        decoder.fill_from_slice(&bytes[..FRAME_BUFFER_CAPACITY]);

        let result = decoder.next_event();

        assert_eq!(
            result,
            Err(ProtocolError::FrameTooLarge { needed: 1028, capacity: FRAME_BUFFER_CAPACITY })
        );
    }

    #[tokio::test]
    async fn test_refill_then_decode_from_async_source() {
        let bytes = encode_event(&ControlEvent::Command(CommandEvent { action: 0 })).unwrap();
        let mut source: &[u8] = &bytes;
        let mut decoder = EventDecoder::new();

        decoder.refill(&mut source).await.unwrap();

        assert_eq!(
            decoder.next_event().unwrap(),
            Some(ControlEvent::Command(CommandEvent { action: 0 }))
        );
    }
}
