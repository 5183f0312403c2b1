//! mirror-agent library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does mirror-agent do?
//!
//! The agent runs on the mirrored device.  A remote peer watches the video
//! stream and sends back input on the same TCP connection.  The agent:
//!
//! 1. Accepts the peer and writes a device-info handshake (name and frame size).
//! 2. Decodes the control events that follow (keys, text, touches, scrolls,
//!    commands) with `mirror_core`'s streaming decoder.
//! 3. Maps touch coordinates from the video frame to the physical display.
//! 4. Injects the resulting key and motion events through an `InputInjector`.

/// Application layer: use cases for the agent.
pub mod application;

/// Infrastructure layer: connection, device geometry, injectors, and config.
pub mod infrastructure;
