//! Gesture strategies — one classifier per body cue.
//!
//! Each strategy looks at a single [`FramePose`] and answers with a
//! [`Command`] carrying only the intents it is responsible for.  A strategy
//! that cannot see the keypoints it needs answers [`Command::idle`].

use std::time::Instant;

use crate::command::Command;
use crate::pose::FramePose;

mod bend_motion;
mod gun_pose;
mod hand_pan;
mod hand_turn;
mod panic;
mod shoulder_pan;

pub use bend_motion::BendMotionStrategy;
pub use gun_pose::GunPoseStrategy;
pub use hand_pan::HandPanStrategy;
pub use hand_turn::HandTurnStrategy;
pub use panic::PanicStrategy;
pub use shoulder_pan::ShoulderPanStrategy;

// ════════════════════════════════════════════════════════════════════════════
// GestureStrategy trait
// ════════════════════════════════════════════════════════════════════════════

/// Anything that maps one frame's pose to a [`Command`].
///
/// Called exactly once per frame.  Stateful strategies keep their state in
/// private fields and only touch it from `evaluate`.
pub trait GestureStrategy: Send {
    fn name(&self) -> &'static str;

    fn evaluate(&mut self, pose: &FramePose, now: Instant) -> Command;

    /// True when the most recent `evaluate` demands that the merged pointer
    /// deltas be forced to zero, whatever other strategies asked for.
    fn overrides_pointer(&self) -> bool {
        false
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Test helpers
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
pub(crate) mod testutil {
    use crate::pose::{FramePose, Keypoint, KeypointId};

    pub const W: u32 = 640;
    pub const H: u32 = 480;

    pub fn frame() -> FramePose {
        FramePose::new(W, H)
    }

    pub fn wrists(lx: i32, ly: i32, rx: i32, ry: i32) -> FramePose {
        frame()
            .with(KeypointId::LeftWrist, Keypoint::at(lx, ly))
            .with(KeypointId::RightWrist, Keypoint::at(rx, ry))
    }

    /// Both wrists at `(cx + dx, cy + dy)`, measured from frame centre.
    pub fn hands_offset(dx: i32, dy: i32) -> FramePose {
        let x = (W / 2) as i32 + dx;
        let y = (H / 2) as i32 + dy;
        wrists(x, y, x, y)
    }
}
