//! Mock input injector for tests.
//!
//! The real injectors talk to the platform input service, which requires a
//! device and cannot be observed from test code.  [`RecordingInjector`]
//! pushes every injected event into a `Mutex<Vec<...>>` so assertions can
//! inspect exactly what was injected and in what order.
//!
//! # Usage in tests
//!
//! ```ignore
//! let injector = Arc::new(RecordingInjector::new());
//! let mut dispatcher = EventDispatcher::new(injector.clone(), mapper, chars, injector.clone());
//!
//! dispatcher.handle_event(&event);
//!
//! assert_eq!(injector.keys().len(), 2);
//! ```
//!
//! Set `should_fail` to simulate platform failures.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::application::dispatch_events::{
    DisplayState, InjectionError, InputInjector, KeyInjection, MotionInjection,
};

/// A mock injector that records all calls without touching the platform.
///
/// Also acts as the [`DisplayState`] so tests can drive the screen-on logic.
#[derive(Debug, Default)]
pub struct RecordingInjector {
    /// Every key event passed to `inject_key`.
    pub keys: Mutex<Vec<KeyInjection>>,
    /// Every motion event passed to `inject_motion`.
    pub motions: Mutex<Vec<MotionInjection>>,
    /// Reported by `is_screen_on`.
    pub screen_on: AtomicBool,
    /// When `true`, every injection returns [`InjectionError::Platform`].
    pub should_fail: bool,
}

impl RecordingInjector {
    /// Creates an injector with empty records, the screen on, and `should_fail = false`.
    pub fn new() -> Self {
        Self {
            screen_on: AtomicBool::new(true),
            ..Self::default()
        }
    }

    /// Creates an injector whose simulated display is off.
    pub fn with_screen_off() -> Self {
        Self::default()
    }

    /// Creates an injector that rejects every event.
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::new()
        }
    }

    /// Snapshot of the recorded key events.
    pub fn keys(&self) -> Vec<KeyInjection> {
        self.keys.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Snapshot of the recorded motion events.
    pub fn motions(&self) -> Vec<MotionInjection> {
        self.motions.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Key codes of the recorded key events, in order.
    pub fn keycodes(&self) -> Vec<i32> {
        self.keys().iter().map(|k| k.keycode).collect()
    }
}

impl InputInjector for RecordingInjector {
    fn inject_key(&self, key: KeyInjection) -> Result<(), InjectionError> {
        if self.should_fail {
            return Err(InjectionError::Platform("mock failure".into()));
        }
        self.keys.lock().unwrap_or_else(|e| e.into_inner()).push(key);
        Ok(())
    }

    fn inject_motion(&self, motion: &MotionInjection) -> Result<(), InjectionError> {
        if self.should_fail {
            return Err(InjectionError::Platform("mock failure".into()));
        }
        self.motions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(motion.clone());
        Ok(())
    }
}

impl DisplayState for RecordingInjector {
    fn is_screen_on(&self) -> bool {
        self.screen_on.load(Ordering::Relaxed)
    }
}
