/// Input state tracker.
///
/// Tracks which keys are currently held down, enabling:
///   - Continuous running and climbing while a key is held
///   - Edge-triggered jump and fire (only on the initial press)
///
/// Uses crossterm's keyboard enhancement for Release events when available.
/// Falls back to timeout-based release detection on terminals that don't support it.
///
/// `Controls` merges keyboard and gamepad into the simulation's `InputSource`.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, poll};

use crate::domain::entity::{InputSource, Key};
use super::gamepad::{Action, Dir, GamepadState};

/// After this duration without a Press/Repeat event, consider the key released.
/// Only used when the terminal doesn't report Release events.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,

    /// Keys that went from released to held during the last drain.
    fresh_presses: Vec<KeyCode>,

    /// Raw key events collected during drain, for meta-key handling.
    pub raw_events: Vec<KeyEvent>,

    /// Only true when keyboard enhancement is confirmed working.
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            honor_release: false,
        }
    }

    /// Drain all pending terminal events and update key states.
    /// Call this once per frame, before the simulation tick.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.record(key, Instant::now());
            }
        }

        self.expire(Instant::now());
    }

    fn record(&mut self, key: KeyEvent, now: Instant) {
        self.raw_events.push(key);
        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                self.last_active.remove(&key.code);
            }
            // Unconfirmed release reports are unreliable; the timeout handles it
            KeyEventKind::Release => {}
            _ => {
                let was_held = self.held_at(key.code, now);
                self.last_active.insert(key.code, now);
                if !was_held {
                    self.fresh_presses.push(key.code);
                }
            }
        }
    }

    fn expire(&mut self, now: Instant) {
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    pub fn is_held(&self, code: KeyCode) -> bool {
        self.held_at(code, Instant::now())
    }

    pub fn any_held(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.is_held(*c))
    }

    /// Was this key freshly pressed this frame? (edge trigger)
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&code)
    }

    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    /// Check if any raw event this frame has Ctrl+C
    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }

    fn held_at(&self, code: KeyCode, now: Instant) -> bool {
        self.last_active
            .get(&code)
            .map(|t| now.duration_since(*t) < HOLD_TIMEOUT)
            .unwrap_or(false)
    }
}

// ── Bindings ──

/// Keyboard keys bound to each gameplay key.
pub fn keys_for(key: Key) -> &'static [KeyCode] {
    match key {
        Key::Left => &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')],
        Key::Right => &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')],
        Key::Up => &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')],
        Key::Down => &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')],
        Key::Jump => &[KeyCode::Char(' '), KeyCode::Char('z'), KeyCode::Char('Z')],
        Key::Fire => &[KeyCode::Char('f'), KeyCode::Char('F'), KeyCode::Char('x'), KeyCode::Char('X')],
        Key::Confirm => &[KeyCode::Enter],
        Key::Cancel => &[KeyCode::Esc],
    }
}

fn pad_dir(key: Key) -> Option<Dir> {
    match key {
        Key::Left => Some(Dir::Left),
        Key::Right => Some(Dir::Right),
        Key::Up => Some(Dir::Up),
        Key::Down => Some(Dir::Down),
        _ => None,
    }
}

fn pad_action(key: Key) -> Option<Action> {
    match key {
        Key::Jump => Some(Action::Jump),
        Key::Fire => Some(Action::Fire),
        Key::Confirm => Some(Action::Confirm),
        Key::Cancel => Some(Action::Cancel),
        _ => None,
    }
}

/// Keyboard plus gamepad, as seen by the simulation.
pub struct Controls<'a> {
    pub keyboard: &'a InputState,
    pub gamepad: &'a GamepadState,
}

impl InputSource for Controls<'_> {
    fn is_down(&self, key: Key) -> bool {
        self.keyboard.any_held(keys_for(key))
            || pad_dir(key).is_some_and(|d| self.gamepad.dir_held(d))
            || pad_action(key).is_some_and(|a| self.gamepad.held(a))
    }

    fn was_pressed(&self, key: Key) -> bool {
        self.keyboard.any_pressed(keys_for(key))
            || pad_action(key).is_some_and(|a| self.gamepad.pressed(a))
    }
}
