//! # mirror-core
//!
//! Shared library for the screen-mirroring agent containing the control
//! protocol codec, the streaming decoder, and Android input tables.
//!
//! It has no dependencies on OS APIs or network sockets; bytes come in
//! through any `tokio::io::AsyncRead`.
//!
//! # Architecture overview
//!
//! A remote peer watches the device screen and sends back a stream of input
//! events (key presses, text, touches, scrolls, commands).  The agent on the
//! device decodes that stream and injects the events locally.
//!
//! - **`protocol`** – How bytes travel over the control channel.  Events are
//!   packed back to back with a one-byte tag and no outer length, so the
//!   decoder works against a fixed [`FrameBuffer`](protocol::FrameBuffer)
//!   and only consumes bytes once a whole event is present.
//!
//! - **`keymap`** – Android key codes, motion actions, and input sources, plus
//!   the table that turns text characters into key strokes.

pub mod keymap;
pub mod protocol;

pub use keymap::{AsciiCharacterMap, KeyStroke};
pub use protocol::codec::{decode_event, encode_event, ProtocolError};
pub use protocol::decoder::EventDecoder;
pub use protocol::events::ControlEvent;
pub use protocol::handshake::DeviceInfo;
