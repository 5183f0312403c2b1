//! Control-channel protocol: event types, framing, and the streaming decoder.

pub mod codec;
pub mod decoder;
pub mod events;
pub mod frame_buffer;
pub mod handshake;
pub mod pointer_pool;

pub use codec::{decode_event, encode_event, read_event, ProtocolError, MAX_MOUSE_POINTERS};
pub use decoder::EventDecoder;
pub use events::*;
pub use frame_buffer::{BufferError, ByteCursor, FrameBuffer, FRAME_BUFFER_CAPACITY};
pub use handshake::DeviceInfo;
pub use pointer_pool::{PointerPool, DEFAULT_MAX_POOLED_POINTERS};
