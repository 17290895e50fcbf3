//! The merged per-frame control intent.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Threshold below which a pointer delta counts as "no motion".
pub const POINTER_EPSILON: f32 = 0.01;

/// High-level control intents for one frame.
///
/// The booleans are independent: nothing stops two strategies from asking
/// for `forward` and `backward` at once.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Command {
    pub forward:    bool,
    pub backward:   bool,
    pub left:       bool,
    pub right:      bool,
    pub brake:      bool,
    pub fire:       bool,
    /// Relative pointer motion, pixels per frame.
    pub pointer_dx: f32,
    pub pointer_dy: f32,
}

impl Command {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn is_idle(&self) -> bool {
        *self == Self::default()
    }

    pub fn has_pointer_motion(&self) -> bool {
        self.pointer_dx.abs() > POINTER_EPSILON || self.pointer_dy.abs() > POINTER_EPSILON
    }

    /// OR the booleans and sum the pointer deltas of `other` into `self`.
    pub fn merge(&mut self, other: &Command) {
        self.forward    |= other.forward;
        self.backward   |= other.backward;
        self.left       |= other.left;
        self.right      |= other.right;
        self.brake      |= other.brake;
        self.fire       |= other.fire;
        self.pointer_dx += other.pointer_dx;
        self.pointer_dy += other.pointer_dy;
    }
}

/// Short status line, e.g. `Forward | Fire | Pan dx=3.0, dy=-1.2`, or `Idle`.
impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = Vec::new();
        for (on, label) in [
            (self.forward,  "Forward"),
            (self.backward, "Backward"),
            (self.left,     "Left"),
            (self.right,    "Right"),
            (self.brake,    "Brake"),
            (self.fire,     "Fire"),
        ] {
            if on { parts.push(label.to_string()); }
        }
        if self.has_pointer_motion() {
            parts.push(format!("Pan dx={:.1}, dy={:.1}", self.pointer_dx, self.pointer_dy));
        }
        if parts.is_empty() {
            write!(f, "Idle")
        } else {
            write!(f, "{}", parts.join(" | "))
        }
    }
}
