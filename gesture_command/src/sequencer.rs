//! Command stream → discrete keyboard/mouse actions.
//!
//! The sequencer remembers the previous [`Command`] and only emits what
//! changed: movement keys are pressed and released on edges, fire clicks on
//! a rising edge subject to a cooldown, and pointer motion passes through
//! when it is large enough to matter.

use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::command::Command;
use crate::config::SequencerConfig;

// ════════════════════════════════════════════════════════════════════════════
// Keys and buttons
// ════════════════════════════════════════════════════════════════════════════

/// A keyboard key, identified by the character it types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Key(pub char);

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// The four held movement intents, in the order they are sequenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    Forward,
    Backward,
    Left,
    Right,
}

impl Movement {
    pub const ALL: [Movement; 4] =
        [Movement::Forward, Movement::Backward, Movement::Left, Movement::Right];

    fn of(self, cmd: &Command) -> bool {
        match self {
            Movement::Forward  => cmd.forward,
            Movement::Backward => cmd.backward,
            Movement::Left     => cmd.left,
            Movement::Right    => cmd.right,
        }
    }
}

/// Which key each movement intent holds down.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct KeyMap {
    pub forward:  char,
    pub backward: char,
    pub left:     char,
    pub right:    char,
}

impl Default for KeyMap {
    fn default() -> Self {
        KeyMap { forward: 'w', backward: 's', left: 'a', right: 'd' }
    }
}

impl KeyMap {
    pub fn key(&self, movement: Movement) -> Key {
        Key(match movement {
            Movement::Forward  => self.forward,
            Movement::Backward => self.backward,
            Movement::Left     => self.left,
            Movement::Right    => self.right,
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// InputAction / InputSink
// ════════════════════════════════════════════════════════════════════════════

/// One primitive input event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum InputAction {
    Press(Key),
    Release(Key),
    Click(MouseButton),
    MovePointer { dx: f32, dy: f32 },
}

impl InputAction {
    pub fn dispatch(&self, sink: &mut dyn InputSink) {
        match *self {
            InputAction::Press(key)              => sink.press(key),
            InputAction::Release(key)            => sink.release(key),
            InputAction::Click(button)           => sink.click(button),
            InputAction::MovePointer { dx, dy }  => sink.move_pointer(dx, dy),
        }
    }
}

/// The OS-facing end of the pipeline.
///
/// Implementations are best-effort: a failed injection is logged and
/// dropped, never reported back to the sequencer.
pub trait InputSink {
    fn press(&mut self, key: Key);
    fn release(&mut self, key: Key);
    fn click(&mut self, button: MouseButton);
    fn move_pointer(&mut self, dx: f32, dy: f32);
}

/// Records actions in order; useful for tests and dry runs.
impl InputSink for Vec<InputAction> {
    fn press(&mut self, key: Key)            { self.push(InputAction::Press(key)); }
    fn release(&mut self, key: Key)          { self.push(InputAction::Release(key)); }
    fn click(&mut self, button: MouseButton) { self.push(InputAction::Click(button)); }
    fn move_pointer(&mut self, dx: f32, dy: f32) {
        self.push(InputAction::MovePointer { dx, dy });
    }
}

// ════════════════════════════════════════════════════════════════════════════
// InputSequencer
// ════════════════════════════════════════════════════════════════════════════

/// Turns successive commands into edge-triggered input actions.
///
/// Per frame, in order:
///
/// 1. Movement keys whose intent changed are pressed (now true) or released
///    (now false).  With no previous command every key counts as changed,
///    so the first frame puts all four keys in a known state.
/// 2. `brake` releases all four movement keys, every frame it is set.
/// 3. A rising edge on `fire` clicks, unless the last click was less than
///    the cooldown ago; a suppressed edge is dropped, not deferred.
/// 4. Pointer deltas above [`crate::command::POINTER_EPSILON`] on either
///    axis become one relative move.
pub struct InputSequencer {
    keys:        KeyMap,
    fire_button: MouseButton,
    cooldown:    Duration,
    prev:        Option<Command>,
    last_fire:   Option<Instant>,
}

impl InputSequencer {
    pub fn new(config: &SequencerConfig) -> Self {
        Self {
            keys:        config.keys.clone(),
            fire_button: config.fire_button,
            cooldown:    config.fire_cooldown(),
            prev:        None,
            last_fire:   None,
        }
    }

    pub fn previous(&self) -> Option<&Command> {
        self.prev.as_ref()
    }

    /// Diff `cmd` against the previous command and return the actions to emit.
    pub fn apply(&mut self, cmd: &Command, now: Instant) -> Vec<InputAction> {
        let mut actions = Vec::new();
        let prev = self.prev;

        for movement in Movement::ALL {
            let on = movement.of(cmd);
            if prev.map(|p| movement.of(&p)) != Some(on) {
                let key = self.keys.key(movement);
                actions.push(if on { InputAction::Press(key) } else { InputAction::Release(key) });
            }
        }

        if cmd.brake {
            for movement in Movement::ALL {
                actions.push(InputAction::Release(self.keys.key(movement)));
            }
        }

        let rising = cmd.fire && !prev.is_some_and(|p| p.fire);
        if rising {
            let cooled = self
                .last_fire
                .map_or(true, |t| now.saturating_duration_since(t) >= self.cooldown);
            if cooled {
                actions.push(InputAction::Click(self.fire_button));
                self.last_fire = Some(now);
            } else {
                debug!("fire suppressed by cooldown");
            }
        }

        if cmd.has_pointer_motion() {
            actions.push(InputAction::MovePointer { dx: cmd.pointer_dx, dy: cmd.pointer_dy });
        }

        self.prev = Some(*cmd);
        actions
    }

    /// [`apply`](Self::apply) and send the result straight to `sink`.
    /// Returns the number of actions dispatched.
    pub fn apply_to(&mut self, cmd: &Command, now: Instant, sink: &mut dyn InputSink) -> usize {
        let actions = self.apply(cmd, now);
        for action in &actions {
            action.dispatch(sink);
        }
        actions.len()
    }

    /// Release whatever movement keys the last command was holding and
    /// forget it.  Used when the control loop stops.
    pub fn release_held(&mut self) -> Vec<InputAction> {
        let Some(prev) = self.prev.take() else {
            return Vec::new();
        };
        Movement::ALL
            .into_iter()
            .filter(|m| m.of(&prev))
            .map(|m| InputAction::Release(self.keys.key(m)))
            .collect()
    }
}
