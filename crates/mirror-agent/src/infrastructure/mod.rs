//! Infrastructure layer for the agent.
//!
//! Contains the adapters around the dispatch use case: the peer connection,
//! device geometry, input injectors, and configuration.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `mirror_core`, but MUST NOT be imported by the `application` layer.
//!
//! # Sub-modules
//!
//! - **`config`** – TOML configuration with per-field defaults.
//! - **`connection`** – Decodes control events from the peer's byte stream and
//!   writes the device-info handshake.
//! - **`device`** – Scales peer coordinates to the physical display.
//! - **`input_injection`** – `InputInjector` implementations (recording mock,
//!   logging dry run) and the text-to-keys adapter.

pub mod config;
pub mod connection;
pub mod device;
pub mod input_injection;
