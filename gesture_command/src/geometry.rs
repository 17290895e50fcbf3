//! 2-D keypoint geometry.

use crate::pose::{FramePose, Keypoint, KeypointId, Point};

/// Angle in degrees at vertex `b` between rays `b→a` and `b→c`.
///
/// `None` when any point is missing or either ray has zero length.
pub fn angle_at(a: Option<&Keypoint>, b: Option<&Keypoint>, c: Option<&Keypoint>) -> Option<f32> {
    let (a, b, c) = (a?.point(), b?.point(), c?.point());
    let v1 = (a.x - b.x, a.y - b.y);
    let v2 = (c.x - b.x, c.y - b.y);

    let dot  = v1.0 * v2.0 + v1.1 * v2.1;
    let mag1 = (v1.0 * v1.0 + v1.1 * v1.1).sqrt();
    let mag2 = (v2.0 * v2.0 + v2.1 * v2.1).sqrt();
    if mag1 == 0.0 || mag2 == 0.0 {
        return None;
    }

    let cos_a = (dot / (mag1 * mag2)).clamp(-1.0, 1.0);
    Some(cos_a.acos().to_degrees())
}

/// Euclidean pixel distance.
pub fn distance(a: &Keypoint, b: &Keypoint) -> f32 {
    let (a, b) = (a.point(), b.point());
    let (dx, dy) = (a.x - b.x, a.y - b.y);
    (dx * dx + dy * dy).sqrt()
}

/// Mean position of whichever wrists are present.
pub fn wrist_centroid(pose: &FramePose) -> Option<Point> {
    let wrists: Vec<Point> = [KeypointId::LeftWrist, KeypointId::RightWrist]
        .iter()
        .filter_map(|&id| pose.get(id))
        .map(Keypoint::point)
        .collect();
    if wrists.is_empty() {
        return None;
    }
    let n = wrists.len() as f32;
    let x = wrists.iter().map(|p| p.x).sum::<f32>() / n;
    let y = wrists.iter().map(|p| p.y).sum::<f32>() / n;
    Some(Point::new(x, y))
}
