use std::time::Instant;

use tracing::debug;

use crate::command::Command;
use crate::config::HandTurnConfig;
use crate::geometry::wrist_centroid;
use crate::pose::FramePose;

use super::GestureStrategy;

/// Latched left/right turning from the horizontal hand position.
///
/// Offsets are measured from the frame centre and fall into three zones:
///
/// ```text
///  ◄── latch left ──┤ hold ├── dead-zone ──┤ hold ├── latch right ──►
///              -(dz+h)   -dz      0       dz    dz+h
/// ```
///
/// Only the outer zones change the latch; everywhere else the last latched
/// direction is repeated, so the turn survives the hands drifting back
/// toward the middle.
#[derive(Debug, Clone)]
pub struct HandTurnStrategy {
    dead_zone_px:  f32,
    hysteresis_px: f32,
    invert_x:      bool,
    latched_left:  bool,
    latched_right: bool,
}

impl HandTurnStrategy {
    pub fn new(config: &HandTurnConfig) -> Self {
        Self {
            dead_zone_px:  config.dead_zone_px,
            hysteresis_px: config.hysteresis_px,
            invert_x:      config.invert_x,
            latched_left:  false,
            latched_right: false,
        }
    }

    /// Currently latched `(left, right)`.
    pub fn latch(&self) -> (bool, bool) {
        (self.latched_left, self.latched_right)
    }
}

impl GestureStrategy for HandTurnStrategy {
    fn name(&self) -> &'static str { "hand_turn" }

    fn evaluate(&mut self, pose: &FramePose, _now: Instant) -> Command {
        let mut cmd = Command::idle();
        let Some(hands) = wrist_centroid(pose) else {
            return cmd;
        };

        let offset = hands.x - pose.center().x;
        let outer  = self.dead_zone_px + self.hysteresis_px;

        if offset > outer || offset < -outer {
            let mut go_right = offset > 0.0;
            if self.invert_x {
                go_right = !go_right;
            }
            if (self.latched_left, self.latched_right) != (!go_right, go_right) {
                debug!(offset, right = go_right, "turn latched");
            }
            self.latched_left  = !go_right;
            self.latched_right = go_right;
        }

        cmd.left  = self.latched_left;
        cmd.right = self.latched_right;
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::testutil::{frame, hands_offset};

    fn turn() -> HandTurnStrategy {
        HandTurnStrategy::new(&HandTurnConfig {
            dead_zone_px:  40.0,
            hysteresis_px: 20.0,
            invert_x:      false,
        })
    }

    fn lr(cmd: Command) -> (bool, bool) {
        (cmd.left, cmd.right)
    }

    #[test]
    fn dead_zone_without_latch_is_neutral() {
        let mut s = turn();
        assert_eq!(lr(s.evaluate(&hands_offset(39, 0), Instant::now())), (false, false));
    }

    #[test]
    fn beyond_band_latches_right() {
        let mut s = turn();
        assert_eq!(lr(s.evaluate(&hands_offset(61, 0), Instant::now())), (false, true));
    }

    #[test]
    fn beyond_band_latches_left() {
        let mut s = turn();
        assert_eq!(lr(s.evaluate(&hands_offset(-61, 0), Instant::now())), (true, false));
    }

    #[test]
    fn band_holds_previous_latch() {
        let mut s = turn();
        let now = Instant::now();
        s.evaluate(&hands_offset(61, 0), now);
        assert_eq!(lr(s.evaluate(&hands_offset(45, 0), now)), (false, true));
    }

    #[test]
    fn band_without_latch_stays_neutral() {
        let mut s = turn();
        assert_eq!(lr(s.evaluate(&hands_offset(45, 0), Instant::now())), (false, false));
    }

    #[test]
    fn dead_zone_keeps_latch() {
        let mut s = turn();
        let now = Instant::now();
        s.evaluate(&hands_offset(-80, 0), now);
        assert_eq!(lr(s.evaluate(&hands_offset(39, 0), now)), (true, false));
        assert_eq!(lr(s.evaluate(&hands_offset(0, 0), now)), (true, false));
    }

    #[test]
    fn band_edge_is_inside_band() {
        let mut s = turn();
        assert_eq!(lr(s.evaluate(&hands_offset(60, 0), Instant::now())), (false, false));
    }

    #[test]
    fn crossing_over_relatches() {
        let mut s = turn();
        let now = Instant::now();
        s.evaluate(&hands_offset(100, 0), now);
        assert_eq!(lr(s.evaluate(&hands_offset(-100, 0), now)), (true, false));
    }

    #[test]
    fn invert_swaps_direction_and_holds_steadily() {
        let mut s = HandTurnStrategy::new(&HandTurnConfig { invert_x: true, ..HandTurnConfig::default() });
        let now = Instant::now();
        assert_eq!(lr(s.evaluate(&hands_offset(80, 0), now)), (true, false));
        // Repeated frames in the band must not flip the inverted latch.
        assert_eq!(lr(s.evaluate(&hands_offset(50, 0), now)), (true, false));
        assert_eq!(lr(s.evaluate(&hands_offset(50, 0), now)), (true, false));
    }

    #[test]
    fn no_wrists_is_idle_and_keeps_latch() {
        let mut s = turn();
        let now = Instant::now();
        s.evaluate(&hands_offset(100, 0), now);
        assert!(s.evaluate(&frame(), now).is_idle());
        assert_eq!(s.latch(), (false, true));
        assert_eq!(lr(s.evaluate(&hands_offset(0, 0), now)), (false, true));
    }
}
