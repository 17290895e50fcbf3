use std::time::Instant;

use crate::command::Command;
use crate::config::HandPanConfig;
use crate::filter::EmaFilter;
use crate::geometry::wrist_centroid;
use crate::pose::{FramePose, Point};

use super::GestureStrategy;

/// Pixels of output per pixel of wrist motion (before sensitivity) in
/// velocity mode.
const VELOCITY_GAIN: f32 = 0.15;

/// Camera pan from the hands' position.
///
/// * **Position mode** (default): the offset of the wrist centroid from the
///   neutral point, normalised by half the frame size, becomes a pointer
///   speed of up to `max_px_per_frame × sensitivity`.
/// * **Velocity mode**: frame-to-frame wrist motion is scaled directly.
///
/// Offsets inside a square dead-zone produce no motion and are not fed to
/// the smoothing filters.  Output is EMA-smoothed per axis, optionally
/// y-inverted, then clamped to `±max_px_per_frame`.
///
/// The neutral point starts at the frame centre and can be moved with
/// [`set_neutral`](Self::set_neutral) (see [`crate::calibration`]).
#[derive(Debug, Clone)]
pub struct HandPanStrategy {
    sensitivity:      f32,
    dead_zone_px:     f32,
    max_px_per_frame: f32,
    invert_y:         bool,
    use_velocity:     bool,
    ema_dx:           EmaFilter,
    ema_dy:           EmaFilter,
    neutral:          Option<Point>,
    last_avg:         Option<Point>,
}

impl HandPanStrategy {
    pub fn new(config: &HandPanConfig) -> Self {
        Self {
            sensitivity:      config.sensitivity,
            dead_zone_px:     config.dead_zone_px,
            max_px_per_frame: config.max_px_per_frame,
            invert_y:         config.invert_y,
            use_velocity:     config.use_velocity,
            ema_dx:           EmaFilter::new(config.ema_alpha),
            ema_dy:           EmaFilter::new(config.ema_alpha),
            neutral:          None,
            last_avg:         None,
        }
    }

    /// The reference point offsets are measured from, once established.
    pub fn neutral(&self) -> Option<Point> {
        self.neutral
    }

    pub fn set_neutral(&mut self, point: Point) {
        self.neutral = Some(point);
    }

    fn clamp(&self, v: f32) -> f32 {
        v.clamp(-self.max_px_per_frame, self.max_px_per_frame)
    }
}

impl GestureStrategy for HandPanStrategy {
    fn name(&self) -> &'static str { "hand_pan" }

    fn evaluate(&mut self, pose: &FramePose, _now: Instant) -> Command {
        let mut cmd = Command::idle();
        if !pose.has_area() {
            return cmd;
        }
        let Some(avg) = wrist_centroid(pose) else {
            return cmd;
        };

        // `neutral_center` has no effect here: both settings seed from the
        // frame centre.
        let neutral = *self.neutral.get_or_insert_with(|| pose.center());

        let (offset_x, offset_y) = match self.last_avg {
            Some(last) if self.use_velocity => (avg.x - last.x, avg.y - last.y),
            _ => (avg.x - neutral.x, avg.y - neutral.y),
        };

        if offset_x.abs() <= self.dead_zone_px && offset_y.abs() <= self.dead_zone_px {
            return cmd;
        }

        let (dx, dy) = if self.use_velocity {
            let gain = self.sensitivity * VELOCITY_GAIN;
            (offset_x * gain, offset_y * gain)
        } else {
            let half = pose.center();
            let speed = self.max_px_per_frame * self.sensitivity;
            (offset_x / half.x * speed, offset_y / half.y * speed)
        };

        let dx = self.ema_dx.update(dx);
        let mut dy = self.ema_dy.update(dy);
        if self.invert_y {
            dy = -dy;
        }

        cmd.pointer_dx = self.clamp(dx);
        cmd.pointer_dy = self.clamp(dy);

        self.last_avg = Some(avg);
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::testutil::{frame, hands_offset, wrists};

    fn pan(cfg: HandPanConfig) -> HandPanStrategy {
        HandPanStrategy::new(&cfg)
    }

    fn base() -> HandPanConfig {
        HandPanConfig {
            sensitivity:      1.2,
            dead_zone_px:     25.0,
            max_px_per_frame: 30.0,
            invert_y:         false,
            use_velocity:     false,
            ema_alpha:        0.3,
            neutral_center:   true,
        }
    }

    #[test]
    fn dead_zone_edge_is_still() {
        let mut s = pan(base());
        let cmd = s.evaluate(&hands_offset(25, 0), Instant::now());
        assert!(cmd.is_idle());
    }

    #[test]
    fn just_outside_dead_zone_moves() {
        let mut s = pan(base());
        let cmd = s.evaluate(&hands_offset(26, 0), Instant::now());
        // 26 / 320 × 30 × 1.2
        assert!((cmd.pointer_dx - 2.925).abs() < 1e-4);
        assert_eq!(cmd.pointer_dy, 0.0);
        assert!(cmd.pointer_dx.abs() <= 30.0);
    }

    #[test]
    fn far_offset_is_clamped() {
        let mut s = pan(HandPanConfig { sensitivity: 2.0, ..base() });
        let cmd = s.evaluate(&hands_offset(320, -240), Instant::now());
        assert_eq!(cmd.pointer_dx, 30.0);
        assert_eq!(cmd.pointer_dy, -30.0);
    }

    #[test]
    fn dead_zone_is_square() {
        // x inside the zone, y outside: both axes still produce output.
        let mut s = pan(HandPanConfig { ema_alpha: 1.0, ..base() });
        let cmd = s.evaluate(&hands_offset(10, 120), Instant::now());
        assert!(cmd.pointer_dx > 0.0);
        assert!((cmd.pointer_dy - 120.0 / 240.0 * 36.0).abs() < 1e-4);
    }

    #[test]
    fn invert_y_flips_vertical() {
        let mut s = pan(HandPanConfig { invert_y: true, ema_alpha: 1.0, ..base() });
        let cmd = s.evaluate(&hands_offset(0, 120), Instant::now());
        assert!(cmd.pointer_dy < 0.0);
        assert_eq!(cmd.pointer_dx, 0.0);
    }

    #[test]
    fn output_is_smoothed() {
        let mut s = pan(HandPanConfig { ema_alpha: 0.5, ..base() });
        let now = Instant::now();
        let first  = s.evaluate(&hands_offset(160, 0), now).pointer_dx;
        let second = s.evaluate(&hands_offset(320, 0), now).pointer_dx;
        // raw 18 then 36, smoothed to 27
        assert!((first - 18.0).abs() < 1e-4);
        assert!((second - 27.0).abs() < 1e-4);
    }

    #[test]
    fn no_wrists_leaves_state_alone() {
        let mut s = pan(base());
        assert!(s.evaluate(&frame(), Instant::now()).is_idle());
        assert_eq!(s.neutral(), None);
    }

    #[test]
    fn zero_sized_frame_is_ignored() {
        let mut s = pan(HandPanConfig { ema_alpha: 1.0, ..base() });
        let now = Instant::now();
        let mut degenerate = hands_offset(40, 0);
        degenerate.width = 0;
        assert!(s.evaluate(&degenerate, now).is_idle());
        assert_eq!(s.neutral(), None);

        // Later frames measure from the real centre at the normal speed.
        let mut last = Command::idle();
        for _ in 0..29 {
            last = s.evaluate(&hands_offset(40, 0), now);
        }
        assert_eq!(s.neutral(), Some(Point::new(320.0, 240.0)));
        // 40 / 320 × 30 × 1.2
        assert!((last.pointer_dx - 4.5).abs() < 1e-4);
    }

    #[test]
    fn neutral_seeds_from_frame_center() {
        let mut s = pan(base());
        s.evaluate(&hands_offset(0, 0), Instant::now());
        assert_eq!(s.neutral(), Some(Point::new(320.0, 240.0)));
    }

    #[test]
    fn neutral_center_flag_has_no_effect() {
        // Both settings seed the neutral point from the frame centre.
        let now = Instant::now();
        let mut on  = pan(HandPanConfig { neutral_center: true,  ..base() });
        let mut off = pan(HandPanConfig { neutral_center: false, ..base() });
        for dx in [0, 40, 90, -70] {
            let pose = hands_offset(dx, 30);
            assert_eq!(on.evaluate(&pose, now), off.evaluate(&pose, now));
        }
        assert_eq!(on.neutral(), off.neutral());
    }

    #[test]
    fn set_neutral_moves_reference() {
        let mut s = pan(base());
        s.set_neutral(Point::new(420.0, 240.0));
        assert!(s.evaluate(&hands_offset(100, 0), Instant::now()).is_idle());
    }

    #[test]
    fn velocity_mode_tracks_motion() {
        let mut s = pan(HandPanConfig {
            use_velocity: true,
            sensitivity:  1.0,
            ema_alpha:    1.0,
            ..base()
        });
        let now = Instant::now();
        // First sample has no history: offset from neutral, velocity gain.
        let first = s.evaluate(&hands_offset(100, 0), now);
        assert!((first.pointer_dx - 15.0).abs() < 1e-4);

        let moved = s.evaluate(&hands_offset(140, 0), now);
        assert!((moved.pointer_dx - 6.0).abs() < 1e-4);

        // Holding still is inside the dead-zone.
        assert!(s.evaluate(&hands_offset(140, 0), now).is_idle());
    }

    #[test]
    fn single_wrist_is_enough() {
        let mut s = pan(HandPanConfig { ema_alpha: 1.0, ..base() });
        let mut pose = wrists(480, 240, 0, 0);
        pose.keypoints.remove(&crate::pose::KeypointId::RightWrist);
        let cmd = s.evaluate(&pose, Instant::now());
        assert!((cmd.pointer_dx - 18.0).abs() < 1e-4);
    }
}
