use std::time::Instant;

use crate::command::Command;
use crate::config::ShoulderPanConfig;
use crate::pose::{FramePose, KeypointId};

use super::GestureStrategy;

/// Horizontal pan from shoulder twist.
///
/// Right shoulder further back than the left pans right, and vice versa.
#[derive(Debug, Clone)]
pub struct ShoulderPanStrategy {
    z_sensitivity:    f32,
    dead_zone_z:      f32,
    max_px_per_frame: f32,
}

impl ShoulderPanStrategy {
    pub fn new(config: &ShoulderPanConfig) -> Self {
        Self {
            z_sensitivity:    config.z_sensitivity_px_per_unit,
            dead_zone_z:      config.dead_zone_z,
            max_px_per_frame: config.max_px_per_frame,
        }
    }
}

impl GestureStrategy for ShoulderPanStrategy {
    fn name(&self) -> &'static str { "shoulder_pan" }

    fn evaluate(&mut self, pose: &FramePose, _now: Instant) -> Command {
        let mut cmd = Command::idle();
        let (Some(ls), Some(rs)) = (
            pose.get(KeypointId::LeftShoulder),
            pose.get(KeypointId::RightShoulder),
        ) else {
            return cmd;
        };

        let delta_z = rs.z - ls.z;
        if delta_z.abs() <= self.dead_zone_z {
            return cmd;
        }

        cmd.pointer_dx = (delta_z * self.z_sensitivity)
            .clamp(-self.max_px_per_frame, self.max_px_per_frame);
        cmd
    }
}
