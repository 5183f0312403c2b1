//! Fixed-capacity receive buffer for the control stream.
//!
//! The peer writes events back to back with no outer framing, and the
//! transport hands them over in whatever chunks the socket produces.  A single
//! read may therefore end in the middle of an event.  [`FrameBuffer`] keeps
//! the unconsumed tail of the stream and lets the decoder make
//! *all-or-nothing* attempts against it:
//!
//! ```text
//!  0          position              limit                capacity
//!  |  consumed  |   readable bytes    |     free space     |
//! ```
//!
//! - [`FrameBuffer::refill`] moves the readable bytes to the front and reads
//!   new bytes into the free space.
//! - [`FrameBuffer::try_decode_unit`] hands a [`ByteCursor`] over the readable
//!   bytes to a decode function.  `position` only advances when the function
//!   succeeds, so a short read leaves the buffer exactly as it was and the same
//!   bytes are parsed again after the next refill.

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::protocol::codec::ProtocolError;

/// Size of the receive buffer in bytes.
///
/// Large enough for the biggest Text frame (1 + 2 + 300 bytes) with margin.
pub const FRAME_BUFFER_CAPACITY: usize = 1024;

/// Errors raised while moving bytes from the transport into the buffer.
#[derive(Debug, Error)]
pub enum BufferError {
    /// The transport reported an orderly close (zero-length read).
    #[error("control stream closed by peer")]
    EndOfStream,

    /// The buffer holds `capacity` unconsumed bytes and none of them form an
    /// event, so reading more can never make progress.
    #[error("frame buffer full: {capacity} bytes buffered without a decodable event")]
    Full { capacity: usize },

    /// The transport read failed.
    #[error("I/O error while refilling frame buffer: {0}")]
    Io(#[from] std::io::Error),
}

// ── ByteCursor ────────────────────────────────────────────────────────────────

/// Read-only, big-endian cursor over the readable region of a [`FrameBuffer`].
///
/// Every getter checks the remaining length and reports
/// [`ProtocolError::InsufficientData`] instead of panicking.
#[derive(Debug)]
pub struct ByteCursor<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> ByteCursor<'a> {
    /// Creates a cursor at the start of `bytes`.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    /// Number of bytes not yet read.
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    /// Number of bytes read so far.
    pub fn consumed(&self) -> usize {
        self.offset
    }

    /// Fails with [`ProtocolError::InsufficientData`] unless at least
    /// `needed` bytes remain.
    pub fn require(&self, needed: usize) -> Result<(), ProtocolError> {
        let available = self.remaining();
        if available < needed {
            Err(ProtocolError::InsufficientData { needed, available })
        } else {
            Ok(())
        }
    }

    pub fn get_u8(&mut self) -> Result<u8, ProtocolError> {
        let [b] = self.take::<1>()?;
        Ok(b)
    }

    pub fn get_u16(&mut self) -> Result<u16, ProtocolError> {
        self.take::<2>().map(u16::from_be_bytes)
    }

    pub fn get_i32(&mut self) -> Result<i32, ProtocolError> {
        self.take::<4>().map(i32::from_be_bytes)
    }

    /// Returns the next `len` bytes as a slice borrowed from the buffer.
    pub fn get_slice(&mut self, len: usize) -> Result<&'a [u8], ProtocolError> {
        self.require(len)?;
        let slice = &self.bytes[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], ProtocolError> {
        self.require(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.bytes[self.offset..self.offset + N]);
        self.offset += N;
        Ok(out)
    }
}

// ── FrameBuffer ───────────────────────────────────────────────────────────────

/// Fixed-size buffer holding the not-yet-decoded tail of the control stream.
///
/// Invariant outside [`refill`](Self::refill): `position <= limit <= capacity`.
pub struct FrameBuffer {
    raw: Box<[u8]>,
    /// First byte not yet consumed by a successful decode.
    position: usize,
    /// One past the last valid byte.
    limit: usize,
}

impl FrameBuffer {
    /// Creates an empty buffer of [`FRAME_BUFFER_CAPACITY`] bytes.
    pub fn new() -> Self {
        Self {
            raw: vec![0u8; FRAME_BUFFER_CAPACITY].into_boxed_slice(),
            position: 0,
            limit: 0,
        }
    }

    /// Total size of the buffer in bytes.
    pub fn capacity(&self) -> usize {
        self.raw.len()
    }

    /// Number of buffered bytes not yet consumed by a decode.
    pub fn remaining(&self) -> usize {
        self.limit - self.position
    }

    /// `true` when the whole capacity is occupied by unconsumed bytes.
    ///
    /// If no event can be decoded in this state the stream cannot make
    /// progress and the connection must be failed.
    pub fn is_full(&self) -> bool {
        self.remaining() == self.capacity()
    }

    /// Moves the unconsumed bytes to the front of the buffer.
    fn compact(&mut self) {
        if self.position > 0 {
            self.raw.copy_within(self.position..self.limit, 0);
            self.limit -= self.position;
            self.position = 0;
        }
    }

    /// Compacts the buffer and performs one read from `source` into the free
    /// space.
    ///
    /// Returns the number of bytes read.
    ///
    /// # Errors
    ///
    /// - [`BufferError::Full`] if there is no free space even after compaction.
    /// - [`BufferError::EndOfStream`] if `source` returns a zero-length read.
    /// - [`BufferError::Io`] if the read itself fails.
    pub async fn refill<R>(&mut self, source: &mut R) -> Result<usize, BufferError>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        if self.is_full() {
            return Err(BufferError::Full {
                capacity: self.capacity(),
            });
        }
        self.compact();
        let read = source.read(&mut self.raw[self.limit..]).await?;
        if read == 0 {
            return Err(BufferError::EndOfStream);
        }
        self.limit += read;
        Ok(read)
    }

    /// Compacts the buffer and copies as much of `bytes` as fits.
    ///
    /// Returns the number of bytes copied.  Useful when the bytes are already
    /// in memory (benchmarks, replay of captured sessions).
    pub fn fill_from_slice(&mut self, bytes: &[u8]) -> usize {
        self.compact();
        let count = bytes.len().min(self.capacity() - self.limit);
        self.raw[self.limit..self.limit + count].copy_from_slice(&bytes[..count]);
        self.limit += count;
        count
    }

    /// Runs one all-or-nothing decode attempt over the readable bytes.
    ///
    /// - `Ok(Some(value))`: `decode` succeeded; its bytes are consumed.
    /// - `Ok(None)`: `decode` reported [`ProtocolError::InsufficientData`];
    ///   nothing is consumed.
    /// - `Err(e)`: any other protocol error; nothing is consumed.
    pub fn try_decode_unit<T, F>(&mut self, decode: F) -> Result<Option<T>, ProtocolError>
    where
        F: FnOnce(&mut ByteCursor<'_>) -> Result<T, ProtocolError>,
    {
        let mut cursor = ByteCursor::new(&self.raw[self.position..self.limit]);
        match decode(&mut cursor) {
            Ok(value) => {
                self.position += cursor.consumed();
                Ok(Some(value))
            }
            Err(ProtocolError::InsufficientData { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
