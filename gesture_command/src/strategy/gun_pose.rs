use std::time::Instant;

use crate::command::Command;
use crate::config::GunPoseConfig;
use crate::geometry::{angle_at, distance};
use crate::pose::{FramePose, KeypointId};

use super::GestureStrategy;

/// Fire when both elbows are bent and the wrists are held together,
/// as if gripping a pistol in front of the chest.
///
/// No debouncing here; the sequencer's rising-edge cooldown handles that.
#[derive(Debug, Clone)]
pub struct GunPoseStrategy {
    elbow_bent_threshold_deg: f32,
    wrist_distance_px:        f32,
}

impl GunPoseStrategy {
    pub fn new(config: &GunPoseConfig) -> Self {
        Self {
            elbow_bent_threshold_deg: config.elbow_bent_threshold_deg,
            wrist_distance_px:        config.wrist_distance_px,
        }
    }
}

impl GestureStrategy for GunPoseStrategy {
    fn name(&self) -> &'static str { "gun_pose" }

    fn evaluate(&mut self, pose: &FramePose, _now: Instant) -> Command {
        let mut cmd = Command::idle();
        let (Some(ls), Some(rs), Some(le), Some(re), Some(lw), Some(rw)) = (
            pose.get(KeypointId::LeftShoulder),
            pose.get(KeypointId::RightShoulder),
            pose.get(KeypointId::LeftElbow),
            pose.get(KeypointId::RightElbow),
            pose.get(KeypointId::LeftWrist),
            pose.get(KeypointId::RightWrist),
        ) else {
            return cmd;
        };

        let bent = |angle: Option<f32>| angle.is_some_and(|a| a < self.elbow_bent_threshold_deg);
        let elbows_bent = bent(angle_at(Some(ls), Some(le), Some(lw)))
            && bent(angle_at(Some(rs), Some(re), Some(rw)));
        let hands_together = distance(lw, rw) < self.wrist_distance_px;

        cmd.fire = elbows_bent && hands_together;
        cmd
    }
}
