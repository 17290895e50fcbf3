use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::command::Command;
use crate::config::PanicConfig;
use crate::pose::{FramePose, KeypointId};

use super::GestureStrategy;

/// Kill-switch: both wrists held above the head brakes and stops panning.
///
/// The gesture has to be held for `duration` before it engages.  Losing
/// sight of a wrist or the nose, or lowering either hand, restarts the
/// timer from scratch.
#[derive(Debug, Clone)]
pub struct PanicStrategy {
    duration: Duration,
    started:  Option<Instant>,
    engaged:  bool,
}

impl PanicStrategy {
    pub fn new(config: &PanicConfig) -> Self {
        Self {
            duration: config.duration(),
            started:  None,
            engaged:  false,
        }
    }

    pub fn is_engaged(&self) -> bool {
        self.engaged
    }

    fn disarm(&mut self) {
        if self.engaged {
            info!("panic released");
        }
        self.started = None;
        self.engaged = false;
    }
}

impl GestureStrategy for PanicStrategy {
    fn name(&self) -> &'static str { "panic" }

    fn evaluate(&mut self, pose: &FramePose, now: Instant) -> Command {
        let mut cmd = Command::idle();
        let (Some(lw), Some(rw), Some(nose)) = (
            pose.get(KeypointId::LeftWrist),
            pose.get(KeypointId::RightWrist),
            pose.get(KeypointId::Nose),
        ) else {
            self.disarm();
            return cmd;
        };

        let hands_up = lw.y < nose.y && rw.y < nose.y;
        if !hands_up {
            self.disarm();
            return cmd;
        }

        let started = *self.started.get_or_insert_with(|| {
            debug!("panic gesture started");
            now
        });
        if now.saturating_duration_since(started) >= self.duration {
            if !self.engaged {
                info!("panic engaged");
            }
            self.engaged = true;
            cmd.brake = true;
            cmd.pointer_dx = 0.0;
            cmd.pointer_dy = 0.0;
        }
        cmd
    }

    fn overrides_pointer(&self) -> bool {
        self.engaged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::Keypoint;
    use crate::strategy::testutil::wrists;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn hands_up() -> FramePose {
        wrists(280, 40, 360, 40).with(KeypointId::Nose, Keypoint::at(320, 100))
    }

    fn hands_down() -> FramePose {
        wrists(280, 300, 360, 300).with(KeypointId::Nose, Keypoint::at(320, 100))
    }

    fn kill_switch() -> PanicStrategy {
        PanicStrategy::new(&PanicConfig { duration_sec: 0.8 })
    }

    #[test]
    fn triggers_exactly_at_duration() {
        let mut s = kill_switch();
        let t0 = Instant::now();
        assert!(!s.evaluate(&hands_up(), t0).brake);
        assert!(!s.evaluate(&hands_up(), t0 + ms(799)).brake);

        let cmd = s.evaluate(&hands_up(), t0 + ms(800));
        assert!(cmd.brake);
        assert_eq!((cmd.pointer_dx, cmd.pointer_dy), (0.0, 0.0));
        assert!(s.overrides_pointer());

        assert!(s.evaluate(&hands_up(), t0 + ms(1500)).brake);
    }

    #[test]
    fn early_break_resets_timer() {
        let mut s = kill_switch();
        let t0 = Instant::now();
        s.evaluate(&hands_up(), t0);
        s.evaluate(&hands_up(), t0 + ms(790));
        assert!(!s.evaluate(&hands_down(), t0 + ms(795)).brake);

        // Second hold is timed from its own start.
        let t1 = t0 + ms(900);
        assert!(!s.evaluate(&hands_up(), t1).brake);
        assert!(!s.evaluate(&hands_up(), t1 + ms(700)).brake);
        assert!(s.evaluate(&hands_up(), t1 + ms(800)).brake);
    }

    #[test]
    fn one_hand_down_is_not_panic() {
        let mut s = kill_switch();
        let t0 = Instant::now();
        let pose = wrists(280, 40, 360, 300).with(KeypointId::Nose, Keypoint::at(320, 100));
        s.evaluate(&pose, t0);
        assert!(s.evaluate(&pose, t0 + ms(2000)).is_idle());
    }

    #[test]
    fn wrist_level_with_nose_is_not_above() {
        let mut s = kill_switch();
        let t0 = Instant::now();
        let pose = wrists(280, 100, 360, 40).with(KeypointId::Nose, Keypoint::at(320, 100));
        s.evaluate(&pose, t0);
        assert!(!s.evaluate(&pose, t0 + ms(2000)).brake);
    }

    #[test]
    fn missing_nose_resets_timer() {
        let mut s = kill_switch();
        let t0 = Instant::now();
        s.evaluate(&hands_up(), t0);
        assert!(s.evaluate(&wrists(280, 40, 360, 40), t0 + ms(500)).is_idle());
        assert!(!s.evaluate(&hands_up(), t0 + ms(900)).brake);
        assert!(s.evaluate(&hands_up(), t0 + ms(1700)).brake);
    }

    #[test]
    fn release_clears_override() {
        let mut s = kill_switch();
        let t0 = Instant::now();
        s.evaluate(&hands_up(), t0);
        s.evaluate(&hands_up(), t0 + ms(900));
        assert!(s.is_engaged());
        s.evaluate(&hands_down(), t0 + ms(950));
        assert!(!s.is_engaged());
        assert!(!s.overrides_pointer());
    }
}
