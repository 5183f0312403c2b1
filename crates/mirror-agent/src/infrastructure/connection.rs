//! Control-channel connection for the agent.
//!
//! Architecture:
//! - The bootstrap accepts one peer and splits the TCP stream.
//! - The write half carries the [`DeviceInfo`] handshake, then belongs to the
//!   video stream.
//! - The read half is wrapped in a [`ControlConnection`], which decodes
//!   control events for the dispatcher.

use async_trait::async_trait;
use mirror_core::protocol::{
    BufferError, ControlEvent, DeviceInfo, EventDecoder, PointerPool,
};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::{debug, trace};

pub use crate::application::dispatch_events::ConnectionError;
use crate::application::dispatch_events::EventSource;

impl From<BufferError> for ConnectionError {
    fn from(e: BufferError) -> Self {
        match e {
            BufferError::EndOfStream => ConnectionError::Closed,
            BufferError::Full { capacity } => ConnectionError::BufferExhausted { capacity },
            BufferError::Io(e) => ConnectionError::Io(e),
        }
    }
}

/// Decodes control events from the read half of the peer connection.
pub struct ControlConnection<R> {
    reader: R,
    decoder: EventDecoder,
}

impl<R> ControlConnection<R>
where
    R: AsyncRead + Unpin + Send,
{
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            decoder: EventDecoder::new(),
        }
    }

    /// Creates a connection whose decoder pools point arrays for up to
    /// `max_pooled` contacts.
    pub fn with_pooled_pointers(reader: R, max_pooled: usize) -> Self {
        Self {
            reader,
            decoder: EventDecoder::with_pool(PointerPool::with_max_pooled(max_pooled)),
        }
    }

    /// Consumes the connection and returns the transport.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

#[async_trait]
impl<R> EventSource for ControlConnection<R>
where
    R: AsyncRead + Unpin + Send,
{
    /// Decodes the next event, reading from the transport only when the
    /// buffered bytes do not hold a complete one.
    async fn receive_event(&mut self) -> Result<ControlEvent, ConnectionError> {
        loop {
            if let Some(event) = self.decoder.next_event()? {
                return Ok(event);
            }
            let read = self.decoder.refill(&mut self.reader).await?;
            trace!(read, buffered = self.decoder.remaining(), "control stream refilled");
        }
    }

    fn recycle(&mut self, event: ControlEvent) {
        self.decoder.recycle(event);
    }
}

/// Writes the device-info handshake to the peer.
///
/// # Errors
///
/// Returns the underlying I/O error if the write fails.
pub async fn send_device_info<W>(writer: &mut W, info: &DeviceInfo) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    writer.write_all(&info.encode()).await?;
    writer.flush().await?;
    debug!(name = %info.name, width = info.frame_size.width, height = info.frame_size.height, "device info sent");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
