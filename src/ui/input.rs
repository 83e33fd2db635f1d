/// Input state tracker.
///
/// Tracks which keys are currently held, enabling:
///   - Continuous movement while an arrow key is held (with Shift for
///     the fast variant)
///   - Edge-triggered jump (only fires on a fresh press)
///
/// Terminals without key-release reporting get timeout-based release:
/// a key with no Press/Repeat event for a short window counts as
/// released.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEventKind, KeyModifiers};

use crate::domain::hero::{FrameInput, MoveIntent};

/// After this long without a Press/Repeat event the key counts as
/// released.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

pub struct InputState {
    /// Last Press/Repeat timestamp and modifiers for each active key.
    held: HashMap<KeyCode, (Instant, KeyModifiers)>,
    /// Keys that went from released to held during the latest drain.
    fresh: Vec<KeyCode>,
    /// Ctrl-C seen during the latest drain.
    ctrl_c: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            held: HashMap::with_capacity(8),
            fresh: Vec::with_capacity(4),
            ctrl_c: false,
        }
    }

    /// Drain all pending terminal events. Call once per frame, before
    /// the simulation tick.
    pub fn drain_events(&mut self) {
        self.fresh.clear();
        self.ctrl_c = false;

        while poll(Duration::ZERO).unwrap_or(false) {
            let key = match event::read() {
                Ok(Event::Key(key)) => key,
                _ => continue,
            };

            if key.modifiers.contains(KeyModifiers::CONTROL)
                && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
            {
                self.ctrl_c = true;
            }

            match key.kind {
                KeyEventKind::Release => {
                    self.held.remove(&key.code);
                }
                _ => {
                    let was_held = self.is_held(key.code);
                    self.held.insert(key.code, (Instant::now(), key.modifiers));
                    if !was_held {
                        self.fresh.push(key.code);
                    }
                }
            }
        }

        // Timeout expiry for terminals that never send Release.
        let now = Instant::now();
        self.held
            .retain(|_, (t, _)| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    /// The frame's control intents for the simulation: held arrows map
    /// to movement (Shift = fast), no arrow held means stop, and a
    /// fresh Space press triggers the jump.
    pub fn frame_input(&self) -> FrameInput {
        let movement = if let Some((_, mods)) = self.held.get(&KeyCode::Right) {
            if mods.contains(KeyModifiers::SHIFT) {
                MoveIntent::FastRight
            } else {
                MoveIntent::Right
            }
        } else if let Some((_, mods)) = self.held.get(&KeyCode::Left) {
            if mods.contains(KeyModifiers::SHIFT) {
                MoveIntent::FastLeft
            } else {
                MoveIntent::Left
            }
        } else {
            MoveIntent::Stop
        };

        FrameInput {
            movement,
            jump: self.was_pressed(KeyCode::Char(' ')),
        }
    }

    pub fn is_held(&self, code: KeyCode) -> bool {
        self.held
            .get(&code)
            .map(|(t, _)| t.elapsed() < HOLD_TIMEOUT)
            .unwrap_or(false)
    }

    /// Was this key freshly pressed this frame? (edge trigger)
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh.contains(&code)
    }

    pub fn quit_requested(&self) -> bool {
        self.ctrl_c || self.was_pressed(KeyCode::Char('q'))
    }
}
