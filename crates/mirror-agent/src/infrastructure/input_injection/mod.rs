//! Input injection adapters.
//!
//! Real injection goes through platform input APIs that only exist on the
//! device.  The adapters here cover everything else:
//!
//! - **`mock`** – records every injection in memory for tests.
//! - **`logging`** – a dry-run injector that logs each event and simulates
//!   the display power state.

pub mod logging;
pub mod mock;

use mirror_core::keymap::{AsciiCharacterMap, KeyStroke};

use crate::application::dispatch_events::CharacterMapper;

impl CharacterMapper for AsciiCharacterMap {
    fn strokes(&self, c: char) -> Option<Vec<KeyStroke>> {
        AsciiCharacterMap::strokes(self, c)
    }
}
