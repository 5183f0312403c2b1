//! Application layer use cases for the agent.
//!
//! - **`dispatch_events`** – Pulls decoded [`ControlEvent`]s from the control
//!   connection and injects them as device input.  The actual platform calls
//!   are made by an `InputInjector` implementation that is injected at
//!   construction time, together with the coordinate, character, and display
//!   collaborators.
//!
//! [`ControlEvent`]: mirror_core::protocol::ControlEvent

pub mod dispatch_events;
