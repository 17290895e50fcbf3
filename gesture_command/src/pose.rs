//! Per-frame pose data delivered by the external pose estimator.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════════════════
// KeypointId
// ════════════════════════════════════════════════════════════════════════════

/// The fixed keypoint vocabulary the strategies read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeypointId {
    Nose,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
}

impl KeypointId {
    pub const ALL: [KeypointId; 9] = [
        KeypointId::Nose,
        KeypointId::LeftShoulder,
        KeypointId::RightShoulder,
        KeypointId::LeftElbow,
        KeypointId::RightElbow,
        KeypointId::LeftWrist,
        KeypointId::RightWrist,
        KeypointId::LeftHip,
        KeypointId::RightHip,
    ];

    pub fn name(self) -> &'static str {
        match self {
            KeypointId::Nose          => "nose",
            KeypointId::LeftShoulder  => "left_shoulder",
            KeypointId::RightShoulder => "right_shoulder",
            KeypointId::LeftElbow     => "left_elbow",
            KeypointId::RightElbow    => "right_elbow",
            KeypointId::LeftWrist     => "left_wrist",
            KeypointId::RightWrist    => "right_wrist",
            KeypointId::LeftHip       => "left_hip",
            KeypointId::RightHip      => "right_hip",
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Keypoint
// ════════════════════════════════════════════════════════════════════════════

/// A single detected landmark.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    /// Pixel column.
    pub x: i32,
    /// Pixel row (smaller = higher on screen).
    pub y: i32,
    /// Depth estimate; more negative is closer to the camera.
    #[serde(default)]
    pub z: f32,
    /// Detection confidence, 0.0–1.0.
    #[serde(default = "full_visibility")]
    pub visibility: f32,
}

fn full_visibility() -> f32 { 1.0 }

impl Keypoint {
    pub fn new(x: i32, y: i32, z: f32, visibility: f32) -> Self {
        Self { x, y, z, visibility }
    }

    /// Keypoint at `(x, y)` with zero depth and full confidence.
    pub fn at(x: i32, y: i32) -> Self {
        Self::new(x, y, 0.0, 1.0)
    }

    pub fn point(&self) -> Point {
        Point::new(self.x as f32, self.y as f32)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Point
// ════════════════════════════════════════════════════════════════════════════

/// A 2-D pixel position with sub-pixel precision (averages, neutral points).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FramePose
// ════════════════════════════════════════════════════════════════════════════

/// All keypoints detected in one frame, plus the frame size.
///
/// Keypoints that were not detected are simply absent from the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FramePose {
    pub width:     u32,
    pub height:    u32,
    #[serde(default)]
    pub keypoints: HashMap<KeypointId, Keypoint>,
}

impl FramePose {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, keypoints: HashMap::new() }
    }

    /// Builder-style insert, handy for constructing frames in sources and tests.
    pub fn with(mut self, id: KeypointId, kp: Keypoint) -> Self {
        self.keypoints.insert(id, kp);
        self
    }

    pub fn get(&self, id: KeypointId) -> Option<&Keypoint> {
        self.keypoints.get(&id)
    }

    pub fn center(&self) -> Point {
        Point::new(self.width as f32 / 2.0, self.height as f32 / 2.0)
    }

    /// Whether both dimensions are non-zero.  Offsets are normalised by the
    /// frame size, so a degenerate frame carries no usable geometry.
    pub fn has_area(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Drop keypoints whose visibility is below `threshold`.
    pub fn retain_visible(&mut self, threshold: f32) {
        self.keypoints.retain(|_, kp| kp.visibility >= threshold);
    }
}
