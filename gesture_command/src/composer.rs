//! Runs every strategy against the same frame and folds the answers into
//! one [`Command`].

use std::time::Instant;

use tracing::trace;

use crate::calibration;
use crate::command::Command;
use crate::config::Config;
use crate::pose::{FramePose, Point};
use crate::strategy::{
    BendMotionStrategy, GestureStrategy, GunPoseStrategy, HandPanStrategy,
    HandTurnStrategy, PanicStrategy, ShoulderPanStrategy,
};

/// Merges strategy outputs: booleans OR together, pointer deltas add up.
///
/// All strategies run every frame, even once an intent is already set, so
/// stateful strategies never miss an update.  If any strategy reports a
/// pointer override for the frame, the merged deltas are forced to zero.
///
/// The Hand-Pan strategy lives in its own typed slot so that
/// [`calibrate`](Self::calibrate) can reach it directly.
pub struct StrategyComposer {
    strategies: Vec<Box<dyn GestureStrategy>>,
    hand_pan:   Option<HandPanStrategy>,
}

impl StrategyComposer {
    pub fn new(strategies: Vec<Box<dyn GestureStrategy>>) -> Self {
        Self { strategies, hand_pan: None }
    }

    /// Builder-style: install the calibratable pan strategy.
    pub fn with_hand_pan(mut self, pan: HandPanStrategy) -> Self {
        self.hand_pan = Some(pan);
        self
    }

    /// Build the strategy set enabled in `config.pipeline`.
    pub fn from_config(config: &Config) -> Self {
        let p = &config.pipeline;
        let mut strategies: Vec<Box<dyn GestureStrategy>> = Vec::new();
        if p.bend_motion {
            strategies.push(Box::new(BendMotionStrategy::new(&config.bend_motion)));
        }
        if p.gun_pose {
            strategies.push(Box::new(GunPoseStrategy::new(&config.gun_pose)));
        }
        if p.hand_turn {
            strategies.push(Box::new(HandTurnStrategy::new(&config.hand_turn)));
        }
        if p.panic {
            strategies.push(Box::new(PanicStrategy::new(&config.panic)));
        }
        if p.shoulder_pan {
            strategies.push(Box::new(ShoulderPanStrategy::new(&config.shoulder_pan)));
        }
        let composer = Self::new(strategies);
        if p.hand_pan {
            composer.with_hand_pan(HandPanStrategy::new(&config.hand_pan))
        } else {
            composer
        }
    }

    /// Names of the active strategies, in evaluation order.
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies
            .iter()
            .map(|s| s.name())
            .chain(self.hand_pan.as_ref().map(|s| s.name()))
            .collect()
    }

    pub fn hand_pan(&self) -> Option<&HandPanStrategy> {
        self.hand_pan.as_ref()
    }

    pub fn evaluate(&mut self, pose: &FramePose, now: Instant) -> Command {
        let mut merged = Command::idle();
        let mut zero_pointer = false;

        for strategy in self.strategies.iter_mut() {
            fold(strategy.as_mut(), pose, now, &mut merged, &mut zero_pointer);
        }
        if let Some(pan) = self.hand_pan.as_mut() {
            fold(pan, pose, now, &mut merged, &mut zero_pointer);
        }

        if zero_pointer {
            merged.pointer_dx = 0.0;
            merged.pointer_dy = 0.0;
        }
        merged
    }

    /// Re-centre the Hand-Pan neutral point on the wrists visible in `pose`.
    ///
    /// Returns the new neutral point, or `None` when there is no pan strategy
    /// or no wrist in view.
    pub fn calibrate(&mut self, pose: &FramePose) -> Option<Point> {
        let pan = self.hand_pan.as_mut()?;
        calibration::calibrate(pan, pose)
    }
}

fn fold(
    strategy:     &mut dyn GestureStrategy,
    pose:         &FramePose,
    now:          Instant,
    merged:       &mut Command,
    zero_pointer: &mut bool,
) {
    let sub = strategy.evaluate(pose, now);
    if !sub.is_idle() {
        trace!(strategy = strategy.name(), "{}", sub);
    }
    merged.merge(&sub);
    *zero_pointer |= strategy.overrides_pointer();
}
