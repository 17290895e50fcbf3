//! On-demand re-centring of the Hand-Pan neutral point.
//!
//! Triggered from outside the frame loop (a key press, a replay event).  The
//! player holds their hands where "no pan" should be, and the current wrist
//! centroid becomes the new reference.  Hand-Turn is unaffected; it always
//! measures from the frame centre.

use tracing::{debug, info};

use crate::geometry::wrist_centroid;
use crate::pose::{FramePose, Point};
use crate::strategy::HandPanStrategy;

/// Move `pan`'s neutral point to the wrists visible in `pose`.
///
/// Returns the new neutral point, or `None` (leaving `pan` untouched) when
/// no wrist is in view.
pub fn calibrate(pan: &mut HandPanStrategy, pose: &FramePose) -> Option<Point> {
    let Some(neutral) = wrist_centroid(pose) else {
        debug!("calibration skipped: no wrists visible");
        return None;
    };
    pan.set_neutral(neutral);
    info!(x = neutral.x, y = neutral.y, "pan neutral calibrated");
    Some(neutral)
}
