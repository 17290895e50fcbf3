use std::time::Instant;

use crate::command::Command;
use crate::config::BendMotionConfig;
use crate::pose::{FramePose, KeypointId};

use super::GestureStrategy;

/// Forward/backward from torso lean.
///
/// Compares mean shoulder depth with mean hip depth.  Depth grows more
/// negative toward the camera, so shoulders ahead of hips means "lean in".
#[derive(Debug, Clone)]
pub struct BendMotionStrategy {
    lean_threshold: f32,
}

impl BendMotionStrategy {
    pub fn new(config: &BendMotionConfig) -> Self {
        Self { lean_threshold: config.lean_threshold }
    }
}

impl GestureStrategy for BendMotionStrategy {
    fn name(&self) -> &'static str { "bend_motion" }

    fn evaluate(&mut self, pose: &FramePose, _now: Instant) -> Command {
        let mut cmd = Command::idle();
        let (Some(ls), Some(rs), Some(lh), Some(rh)) = (
            pose.get(KeypointId::LeftShoulder),
            pose.get(KeypointId::RightShoulder),
            pose.get(KeypointId::LeftHip),
            pose.get(KeypointId::RightHip),
        ) else {
            return cmd;
        };

        let shoulders_z = (ls.z + rs.z) / 2.0;
        let hips_z      = (lh.z + rh.z) / 2.0;
        let delta       = shoulders_z - hips_z;

        if delta < -self.lean_threshold {
            cmd.forward = true;
        } else if delta > self.lean_threshold {
            cmd.backward = true;
        }
        cmd
    }
}
