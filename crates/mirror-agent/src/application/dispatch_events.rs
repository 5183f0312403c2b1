//! EventDispatcher: turns decoded control events into device input.
//!
//! The dispatcher sits at the application layer.  It pulls events from an
//! [`EventSource`], resolves coordinates and characters through injected
//! collaborators, and hands the resulting key and motion events to an
//! [`InputInjector`].  Platform-specific implementations live in the
//! infrastructure layer.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use mirror_core::keymap::android::{
    masked_action, KEYCODE_BACK, KEYCODE_POWER, KEY_ACTION_DOWN, KEY_ACTION_UP, META_NONE,
    MOTION_ACTION_DOWN, MOTION_ACTION_SCROLL, SOURCE_KEYBOARD, SOURCE_MOUSE, SOURCE_TOUCHSCREEN,
};
use mirror_core::keymap::KeyStroke;
use mirror_core::protocol::{
    CommandAction, CommandEvent, ControlEvent, KeycodeEvent, MouseEvent, Point, ProtocolError,
    ScrollEvent, Size, TextEvent,
};
use thiserror::Error;
use tracing::{debug, error, info, warn};

// ── Errors ────────────────────────────────────────────────────────────────────

/// Error type for a single injection attempt.
#[derive(Debug, Error)]
pub enum InjectionError {
    #[error("platform error: {0}")]
    Platform(String),
}

/// Why an [`EventSource`] could not produce the next event.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// The peer closed the stream.  This is the normal way a session ends.
    #[error("control stream closed")]
    Closed,

    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The receive buffer filled up without yielding an event.
    #[error("receive buffer of {capacity} bytes exhausted without a decodable event")]
    BufferExhausted { capacity: usize },
}

/// Fatal reasons for the dispatch loop to stop.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("control connection failed: {0}")]
    Connection(#[source] ConnectionError),
}

// ── Collaborator ports ────────────────────────────────────────────────────────

/// A raw key event ready for injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInjection {
    /// Time since the dispatcher started when the key went down.
    pub down_time: Duration,
    pub event_time: Duration,
    pub action: u8,
    pub keycode: i32,
    pub repeat: i32,
    pub meta_state: i32,
    pub source: u32,
}

/// One contact of a [`MotionInjection`], in device-physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InjectedPointer {
    pub id: u8,
    pub point: Point,
}

/// A touch or scroll motion ready for injection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MotionInjection {
    /// Time since the dispatcher started when the current gesture began.
    pub down_time: Duration,
    pub event_time: Duration,
    pub action: u16,
    pub pointers: Vec<InjectedPointer>,
    pub source: u32,
    pub h_scroll: i32,
    pub v_scroll: i32,
}

/// Platform-agnostic input injection.
///
/// Each supported platform provides an implementation in the infrastructure layer.
#[cfg_attr(test, mockall::automock)]
pub trait InputInjector: Send + Sync {
    fn inject_key(&self, key: KeyInjection) -> Result<(), InjectionError>;

    fn inject_motion(&self, motion: &MotionInjection) -> Result<(), InjectionError>;
}

/// Maps a point in the peer's reporting resolution to a device-physical point.
#[cfg_attr(test, mockall::automock)]
pub trait CoordinateMapper: Send + Sync {
    /// Returns `None` when the point cannot be mapped (out of range).
    fn map(&self, point: Point, screen_size: Size) -> Option<Point>;
}

/// Decomposes a character into raw key strokes.
#[cfg_attr(test, mockall::automock)]
pub trait CharacterMapper: Send + Sync {
    /// Returns `None` when the character cannot be typed.
    fn strokes(&self, c: char) -> Option<Vec<KeyStroke>>;
}

/// Reports whether the device display is powered on.
#[cfg_attr(test, mockall::automock)]
pub trait DisplayState: Send + Sync {
    fn is_screen_on(&self) -> bool;
}

/// A stream of decoded control events.
#[async_trait]
pub trait EventSource: Send {
    /// Waits for the next complete event.
    ///
    /// # Errors
    ///
    /// [`ConnectionError::Closed`] when the peer hangs up; anything else is
    /// a fatal transport or framing failure.
    async fn receive_event(&mut self) -> Result<ControlEvent, ConnectionError>;

    /// Gives a handled event back so its storage can be reused.
    fn recycle(&mut self, event: ControlEvent) {
        drop(event);
    }
}

// ── Outcomes ──────────────────────────────────────────────────────────────────

/// Why an event was not injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// A coordinate could not be mapped to the device.
    OutOfRange,
    /// The injector rejected the event.
    InjectionFailed,
    /// The command action byte is not recognised.
    UnknownCommand(u8),
}

/// Result of handling one event.  None of these stop the dispatch loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Injected,
    Dropped(DropReason),
    /// Text injection stopped early after typing `typed` of `total` characters.
    PartialFailure { typed: usize, total: usize },
}

// ── Dispatcher ────────────────────────────────────────────────────────────────

/// The Dispatch Events use case.
///
/// Owns the per-connection injection state: the start time of the current
/// touch gesture and a reusable motion buffer.
pub struct EventDispatcher {
    injector: Arc<dyn InputInjector>,
    mapper: Arc<dyn CoordinateMapper>,
    characters: Arc<dyn CharacterMapper>,
    display: Arc<dyn DisplayState>,
    origin: Instant,
    last_mouse_down: Duration,
    motion: MotionInjection,
}

impl EventDispatcher {
    pub fn new(
        injector: Arc<dyn InputInjector>,
        mapper: Arc<dyn CoordinateMapper>,
        characters: Arc<dyn CharacterMapper>,
        display: Arc<dyn DisplayState>,
    ) -> Self {
        Self {
            injector,
            mapper,
            characters,
            display,
            origin: Instant::now(),
            last_mouse_down: Duration::ZERO,
            motion: MotionInjection::default(),
        }
    }

    /// Runs the decode/dispatch loop until the source closes.
    ///
    /// Wakes the display first.  Per-event failures are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] on any source failure other than a clean close.
    pub async fn run<S>(&mut self, source: &mut S) -> Result<(), DispatchError>
    where
        S: EventSource + ?Sized,
    {
        self.turn_screen_on();
        loop {
            let event = match source.receive_event().await {
                Ok(event) => event,
                Err(ConnectionError::Closed) => {
                    info!("control stream closed; stopping dispatch");
                    return Ok(());
                }
                Err(e) => {
                    error!("control stream failed: {e}");
                    return Err(DispatchError::Connection(e));
                }
            };
            self.handle_event(&event);
            source.recycle(event);
        }
    }

    /// Presses POWER if the display is off.
    ///
    /// Returns `true` when no press was needed or the press was injected.
    pub fn turn_screen_on(&mut self) -> bool {
        if self.display.is_screen_on() {
            return true;
        }
        info!("display is off; pressing POWER");
        self.press_key(KEYCODE_POWER)
    }

    /// Injects one event and reports what happened.
    pub fn handle_event(&mut self, event: &ControlEvent) -> DispatchOutcome {
        let outcome = match event {
            ControlEvent::Keycode(e) => self.handle_keycode(e),
            ControlEvent::Text(e) => self.handle_text(e),
            ControlEvent::Mouse(e) => self.handle_mouse(e),
            ControlEvent::Scroll(e) => self.handle_scroll(e),
            ControlEvent::Command(e) => self.handle_command(e),
        };
        match outcome {
            DispatchOutcome::Injected => debug!(event_type = ?event.event_type(), "event injected"),
            DispatchOutcome::Dropped(reason) => {
                warn!(event_type = ?event.event_type(), ?reason, "event dropped")
            }
            DispatchOutcome::PartialFailure { typed, total } => {
                warn!(typed, total, "text injection stopped early")
            }
        }
        outcome
    }

    fn handle_keycode(&mut self, e: &KeycodeEvent) -> DispatchOutcome {
        if self.inject_key_now(e.action, e.keycode, e.meta_state) {
            DispatchOutcome::Injected
        } else {
            DispatchOutcome::Dropped(DropReason::InjectionFailed)
        }
    }

    fn handle_text(&mut self, e: &TextEvent) -> DispatchOutcome {
        let total = e.text.chars().count();
        for (typed, c) in e.text.chars().enumerate() {
            if !self.inject_char(c) {
                return DispatchOutcome::PartialFailure { typed, total };
            }
        }
        DispatchOutcome::Injected
    }

    fn inject_char(&mut self, c: char) -> bool {
        let Some(strokes) = self.characters.strokes(c) else {
            debug!(?c, "character has no key mapping");
            return false;
        };
        for (sent, stroke) in strokes.iter().enumerate() {
            if !self.inject_key_now(stroke.action, stroke.keycode, stroke.meta_state) {
                self.release_held_keys(&strokes[..sent]);
                return false;
            }
        }
        true
    }

    /// Sends the missing UP for every key pressed in `sent` but not yet
    /// released, innermost first, so no modifier stays held on the device.
    fn release_held_keys(&mut self, sent: &[KeyStroke]) {
        for (i, pressed) in sent.iter().enumerate().rev() {
            let released = sent[i + 1..]
                .iter()
                .any(|s| s.action == KEY_ACTION_UP && s.keycode == pressed.keycode);
            if pressed.action == KEY_ACTION_DOWN && !released {
                self.inject_key_now(KEY_ACTION_UP, pressed.keycode, META_NONE);
            }
        }
    }

    fn handle_mouse(&mut self, e: &MouseEvent) -> DispatchOutcome {
        let now = self.uptime();
        if masked_action(e.action) == MOTION_ACTION_DOWN {
            self.last_mouse_down = now;
        }

        self.motion.pointers.clear();
        for sample in &e.points {
            let Some(point) = self.mapper.map(sample.point, e.screen_size) else {
                return DispatchOutcome::Dropped(DropReason::OutOfRange);
            };
            self.motion.pointers.push(InjectedPointer { id: sample.id, point });
        }

        self.motion.down_time = self.last_mouse_down;
        self.motion.event_time = now;
        self.motion.action = e.action;
        self.motion.source = SOURCE_TOUCHSCREEN;
        self.motion.h_scroll = 0;
        self.motion.v_scroll = 0;
        self.inject_motion()
    }

    fn handle_scroll(&mut self, e: &ScrollEvent) -> DispatchOutcome {
        let now = self.uptime();
        let Some(point) = self.mapper.map(e.position.point, e.position.screen_size) else {
            return DispatchOutcome::Dropped(DropReason::OutOfRange);
        };

        self.motion.pointers.clear();
        self.motion.pointers.push(InjectedPointer { id: 0, point });
        self.motion.down_time = self.last_mouse_down;
        self.motion.event_time = now;
        self.motion.action = MOTION_ACTION_SCROLL;
        self.motion.source = SOURCE_MOUSE;
        self.motion.h_scroll = e.h_scroll;
        self.motion.v_scroll = e.v_scroll;
        self.inject_motion()
    }

    fn handle_command(&mut self, e: &CommandEvent) -> DispatchOutcome {
        match CommandAction::try_from(e.action) {
            Ok(CommandAction::BackOrScreenOn) => {
                let keycode = if self.display.is_screen_on() {
                    KEYCODE_BACK
                } else {
                    KEYCODE_POWER
                };
                if self.press_key(keycode) {
                    DispatchOutcome::Injected
                } else {
                    DispatchOutcome::Dropped(DropReason::InjectionFailed)
                }
            }
            Err(()) => DispatchOutcome::Dropped(DropReason::UnknownCommand(e.action)),
        }
    }

    fn inject_motion(&mut self) -> DispatchOutcome {
        match self.injector.inject_motion(&self.motion) {
            Ok(()) => DispatchOutcome::Injected,
            Err(e) => {
                warn!("motion injection failed: {e}");
                DispatchOutcome::Dropped(DropReason::InjectionFailed)
            }
        }
    }

    /// Injects a full press (down then up) with no modifiers.
    fn press_key(&mut self, keycode: i32) -> bool {
        self.inject_key_now(KEY_ACTION_DOWN, keycode, META_NONE)
            && self.inject_key_now(KEY_ACTION_UP, keycode, META_NONE)
    }

    fn inject_key_now(&mut self, action: u8, keycode: i32, meta_state: i32) -> bool {
        let now = self.uptime();
        let key = KeyInjection {
            down_time: now,
            event_time: now,
            action,
            keycode,
            repeat: 0,
            meta_state,
            source: SOURCE_KEYBOARD,
        };
        match self.injector.inject_key(key) {
            Ok(()) => true,
            Err(e) => {
                warn!(keycode, "key injection failed: {e}");
                false
            }
        }
    }

    fn uptime(&self) -> Duration {
        self.origin.elapsed()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
