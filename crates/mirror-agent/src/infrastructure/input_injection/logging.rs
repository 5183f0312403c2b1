//! Dry-run injector that logs every event instead of delivering it.
//!
//! Used by the bootstrap binary when no platform injector is available, so a
//! peer can be exercised end to end on any host.  The display power state is
//! simulated: each released POWER key toggles it.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use mirror_core::keymap::android::{KEYCODE_POWER, KEY_ACTION_UP};
use tracing::{debug, info};

use crate::application::dispatch_events::{
    DisplayState, InjectionError, InputInjector, KeyInjection, MotionInjection,
};

#[derive(Debug)]
pub struct LoggingInputInjector {
    screen_on: AtomicBool,
    injected: AtomicU64,
}

impl LoggingInputInjector {
    pub fn new(screen_on: bool) -> Self {
        Self {
            screen_on: AtomicBool::new(screen_on),
            injected: AtomicU64::new(0),
        }
    }

    /// Number of events accepted so far.
    pub fn injected(&self) -> u64 {
        self.injected.load(Ordering::Relaxed)
    }
}

impl InputInjector for LoggingInputInjector {
    fn inject_key(&self, key: KeyInjection) -> Result<(), InjectionError> {
        debug!(
            action = key.action,
            keycode = key.keycode,
            meta_state = key.meta_state,
            at_ms = key.event_time.as_millis() as u64,
            "inject key"
        );
        if key.keycode == KEYCODE_POWER && key.action == KEY_ACTION_UP {
            let was_on = self.screen_on.fetch_xor(true, Ordering::Relaxed);
            info!(screen_on = !was_on, "display power toggled");
        }
        self.injected.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn inject_motion(&self, motion: &MotionInjection) -> Result<(), InjectionError> {
        debug!(
            action = motion.action,
            source = motion.source,
            pointers = ?motion.pointers,
            h_scroll = motion.h_scroll,
            v_scroll = motion.v_scroll,
            gesture_ms = (motion.event_time.saturating_sub(motion.down_time)).as_millis() as u64,
            "inject motion"
        );
        self.injected.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

impl DisplayState for LoggingInputInjector {
    fn is_screen_on(&self) -> bool {
        self.screen_on.load(Ordering::Relaxed)
    }
}
