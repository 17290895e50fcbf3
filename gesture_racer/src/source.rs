//! Pose sources: anything that produces [`PoseEvent`]s for the control loop.
//!
//! The control loop only sees a `Receiver<PoseEvent>`; it does not care
//! whether frames come from a replay file, stdin, or the built-in demo.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use gesture_command::{FramePose, Keypoint, KeypointId};

// ════════════════════════════════════════════════════════════════════════════
// PoseEvent
// ════════════════════════════════════════════════════════════════════════════

/// One record from a pose source.
///
/// Serialized externally tagged, one JSON object per line:
///
/// ```text
/// {"frame": {"width": 640, "height": 480, "keypoints": {"nose": {"x": 320, "y": 90}}}}
/// "calibrate"
/// "quit"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoseEvent {
    /// Keypoints for one camera frame.
    Frame(FramePose),
    /// Re-centre the pan neutral point on the wrists of the latest frame.
    Calibrate,
    /// Stop the control loop.
    Quit,
}

// ════════════════════════════════════════════════════════════════════════════
// PoseSource trait
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver [`PoseEvent`]s over a channel.
///
/// `run` owns the source for its whole life and returns when the source is
/// exhausted or the receiver hangs up.
pub trait PoseSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<PoseEvent>);
}

/// Spawn a pose source on its own thread and return the receiving end.
pub fn spawn_pose_source<S: PoseSource>(source: S) -> Receiver<PoseEvent> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || Box::new(source).run(tx));
    rx
}

/// Delay between frames at `fps`; `None` when `fps` is zero (unpaced).
pub fn frame_interval(fps: u32) -> Option<Duration> {
    (fps > 0).then(|| Duration::from_nanos(1_000_000_000 / fps as u64))
}

// ════════════════════════════════════════════════════════════════════════════
// ReplaySource — newline-delimited JSON
// ════════════════════════════════════════════════════════════════════════════

/// Replays recorded [`PoseEvent`]s, one JSON value per line.
///
/// Blank lines and lines starting with `#` are ignored.  A line that does
/// not parse is logged and skipped.  At end of input a final
/// [`PoseEvent::Quit`] is sent.
pub struct ReplaySource {
    reader:   Box<dyn BufRead + Send>,
    label:    String,
    interval: Option<Duration>,
}

impl ReplaySource {
    /// Open `path` for replay; `-` reads standard input.
    pub fn open<P: AsRef<Path>>(path: P, fps: u32) -> Result<Self> {
        let path = path.as_ref();
        if path == Path::new("-") {
            return Ok(Self::from_reader(BufReader::new(io::stdin()), "<stdin>", fps));
        }
        let file = File::open(path)
            .with_context(|| format!("opening replay {}", path.display()))?;
        Ok(Self::from_reader(BufReader::new(file), &path.display().to_string(), fps))
    }

    pub fn from_reader<R: BufRead + Send + 'static>(reader: R, label: &str, fps: u32) -> Self {
        Self {
            reader:   Box::new(reader),
            label:    label.to_string(),
            interval: frame_interval(fps),
        }
    }

    /// Parse one replay line.  `Ok(None)` for blank and comment lines.
    /// Frames without a positive width and height are rejected.
    pub fn parse_line(line: &str) -> Result<Option<PoseEvent>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        let event = serde_json::from_str(line).context("invalid pose event")?;
        if let PoseEvent::Frame(pose) = &event {
            if !pose.has_area() {
                bail!("frame has no area ({}x{})", pose.width, pose.height);
            }
        }
        Ok(Some(event))
    }
}

impl PoseSource for ReplaySource {
    fn run(self: Box<Self>, tx: Sender<PoseEvent>) {
        let ReplaySource { reader, label, interval } = *self;
        info!("replaying poses from {}", label);

        let mut frames = 0usize;
        for (n, line) in reader.lines().enumerate() {
            let line = match line {
                Ok(l)  => l,
                Err(e) => {
                    warn!("{}: read error after line {}: {}", label, n, e);
                    break;
                }
            };
            let event = match Self::parse_line(&line) {
                Ok(Some(ev)) => ev,
                Ok(None)     => continue,
                Err(e) => {
                    warn!("{}:{}: skipping line: {:#}", label, n + 1, e);
                    continue;
                }
            };

            let is_frame = matches!(event, PoseEvent::Frame(_));
            let is_quit  = event == PoseEvent::Quit;
            if tx.send(event).is_err() || is_quit {
                return;
            }
            if is_frame {
                frames += 1;
                if let Some(d) = interval {
                    thread::sleep(d);
                }
            }
        }

        debug!("{}: end of replay after {} frames", label, frames);
        let _ = tx.send(PoseEvent::Quit);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ScriptedSource — built-in demo
// ════════════════════════════════════════════════════════════════════════════

/// Plays a fixed list of events, paced like a camera.
///
/// [`ScriptedSource::demo`] walks through every gesture so the binary can
/// be tried without any tracker attached.
pub struct ScriptedSource {
    events:   Vec<PoseEvent>,
    interval: Option<Duration>,
}

impl ScriptedSource {
    pub fn new(events: Vec<PoseEvent>, fps: u32) -> Self {
        Self { events, interval: frame_interval(fps) }
    }

    pub fn demo(fps: u32) -> Self {
        Self::new(demo_script(), fps)
    }

    pub fn events(&self) -> &[PoseEvent] {
        &self.events
    }
}

impl PoseSource for ScriptedSource {
    fn run(self: Box<Self>, tx: Sender<PoseEvent>) {
        let ScriptedSource { events, interval } = *self;
        for event in events {
            let is_frame = matches!(event, PoseEvent::Frame(_));
            if tx.send(event).is_err() {
                return;
            }
            if let (true, Some(d)) = (is_frame, interval) {
                thread::sleep(d);
            }
        }
    }
}

// ── demo body ───────────────────────────────────────────────────────────────

const DEMO_W: u32 = 640;
const DEMO_H: u32 = 480;

/// Arm posture for a [`Body`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arms {
    /// Hanging loosely at the sides.
    Relaxed,
    /// Elbows bent, wrists together in front of the chest.
    Aiming,
    /// Both wrists above the head.
    Raised,
}

/// A simple synthetic skeleton facing the camera.
#[derive(Debug, Clone, Copy)]
pub struct Body {
    /// Shoulder depth relative to the hips; negative leans toward the camera.
    pub lean:  f32,
    /// Horizontal shift of both arms from the body's centre line, pixels.
    pub reach: i32,
    pub arms:  Arms,
}

impl Body {
    pub const fn standing() -> Self {
        Body { lean: 0.0, reach: 0, arms: Arms::Relaxed }
    }

    pub fn pose(&self) -> FramePose {
        let cx = (DEMO_W / 2) as i32;
        let (elbows, wrists) = match self.arms {
            Arms::Relaxed => ((60, 240), (65, 330)),
            Arms::Aiming  => ((50, 240), (10, 170)),
            Arms::Raised  => ((55, 120), (30, 60)),
        };
        let side = |(dx, y): (i32, i32), sign: i32, reach: i32| Keypoint::at(cx + sign * dx + reach, y);

        FramePose::new(DEMO_W, DEMO_H)
            .with(KeypointId::Nose,          Keypoint::at(cx, 100))
            .with(KeypointId::LeftShoulder,  Keypoint::new(cx - 50, 150, self.lean, 1.0))
            .with(KeypointId::RightShoulder, Keypoint::new(cx + 50, 150, self.lean, 1.0))
            .with(KeypointId::LeftHip,       Keypoint::new(cx - 35, 330, 0.0, 1.0))
            .with(KeypointId::RightHip,      Keypoint::new(cx + 35, 330, 0.0, 1.0))
            .with(KeypointId::LeftElbow,     side(elbows, -1, self.reach))
            .with(KeypointId::RightElbow,    side(elbows,  1, self.reach))
            .with(KeypointId::LeftWrist,     side(wrists, -1, self.reach))
            .with(KeypointId::RightWrist,    side(wrists,  1, self.reach))
    }
}

fn hold(events: &mut Vec<PoseEvent>, body: Body, frames: usize) {
    let pose = body.pose();
    events.extend(std::iter::repeat(PoseEvent::Frame(pose)).take(frames));
}

/// Stand, calibrate, drive forward, steer both ways, fire, then brake.
pub fn demo_script() -> Vec<PoseEvent> {
    let standing = Body::standing();
    let leaning = Body { lean: -0.2, ..standing };

    let mut events = Vec::new();
    hold(&mut events, standing, 15);
    events.push(PoseEvent::Calibrate);
    hold(&mut events, standing, 15);
    hold(&mut events, leaning, 45);
    hold(&mut events, Body { reach: 80, ..leaning }, 30);
    hold(&mut events, Body { reach: -80, ..leaning }, 30);
    hold(&mut events, Body { arms: Arms::Aiming, ..standing }, 30);
    hold(&mut events, Body { arms: Arms::Raised, ..standing }, 40);
    hold(&mut events, standing, 15);
    events.push(PoseEvent::Quit);
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn drain(rx: Receiver<PoseEvent>) -> Vec<PoseEvent> {
        rx.iter().collect()
    }

    #[test]
    fn parses_tagged_events() {
        let frame = r#"{"frame": {"width": 640, "height": 480, "keypoints": {"nose": {"x": 1, "y": 2}}}}"#;
        match ReplaySource::parse_line(frame).unwrap() {
            Some(PoseEvent::Frame(pose)) => assert_eq!(pose.get(KeypointId::Nose).map(|k| k.y), Some(2)),
            other => panic!("expected frame, got {:?}", other),
        }
        assert_eq!(ReplaySource::parse_line("\"calibrate\"").unwrap(), Some(PoseEvent::Calibrate));
        assert_eq!(ReplaySource::parse_line(" \"quit\" ").unwrap(), Some(PoseEvent::Quit));
    }

    #[test]
    fn blank_and_comment_lines_are_ignored() {
        assert_eq!(ReplaySource::parse_line("").unwrap(), None);
        assert_eq!(ReplaySource::parse_line("   ").unwrap(), None);
        assert_eq!(ReplaySource::parse_line("# recorded 2024-05-01").unwrap(), None);
    }

    #[test]
    fn malformed_line_is_an_error() {
        assert!(ReplaySource::parse_line("{not json").is_err());
        assert!(ReplaySource::parse_line(r#"{"jump": {}}"#).is_err());
    }

    #[test]
    fn zero_sized_frame_is_rejected() {
        let err = ReplaySource::parse_line(r#"{"frame": {"width": 0, "height": 480}}"#)
            .err()
            .unwrap();
        assert!(err.to_string().contains("no area"));
        assert!(ReplaySource::parse_line(r#"{"frame": {"width": 640, "height": 0}}"#).is_err());

        // The replay skips the bad frame and carries on.
        let input = concat!(
            r#"{"frame": {"width": 0, "height": 480}}"#, "\n",
            r#"{"frame": {"width": 640, "height": 480}}"#, "\n",
        );
        let src = ReplaySource::from_reader(Cursor::new(input), "test", 0);
        assert_eq!(
            drain(spawn_pose_source(src)),
            vec![PoseEvent::Frame(FramePose::new(640, 480)), PoseEvent::Quit],
        );
    }

    #[test]
    fn replay_skips_bad_lines_and_ends_with_quit() {
        let input = concat!(
            r#"{"frame": {"width": 640, "height": 480}}"#, "\n",
            "garbage\n",
            "\"calibrate\"\n",
            "\n",
            r#"{"frame": {"width": 320, "height": 240}}"#, "\n",
        );
        let src = ReplaySource::from_reader(Cursor::new(input), "test", 0);
        let events = drain(spawn_pose_source(src));
        assert_eq!(
            events,
            vec![
                PoseEvent::Frame(FramePose::new(640, 480)),
                PoseEvent::Calibrate,
                PoseEvent::Frame(FramePose::new(320, 240)),
                PoseEvent::Quit,
            ],
        );
    }

    #[test]
    fn replay_stops_at_quit() {
        let input = "\"quit\"\n{\"frame\": {\"width\": 1, \"height\": 1}}\n";
        let src = ReplaySource::from_reader(Cursor::new(input), "test", 0);
        assert_eq!(drain(spawn_pose_source(src)), vec![PoseEvent::Quit]);
    }

    #[test]
    fn missing_replay_file_is_an_error() {
        let err = ReplaySource::open("/no/such/replay.ndjson", 30).err().unwrap();
        assert!(format!("{:#}", err).contains("opening replay"));
    }

    #[test]
    fn frame_interval_zero_is_unpaced() {
        assert_eq!(frame_interval(0), None);
        assert_eq!(frame_interval(50), Some(Duration::from_millis(20)));
    }

    #[test]
    fn scripted_source_delivers_in_order() {
        let events = vec![PoseEvent::Calibrate, PoseEvent::Frame(FramePose::new(2, 2)), PoseEvent::Quit];
        let src = ScriptedSource::new(events.clone(), 0);
        assert_eq!(drain(spawn_pose_source(src)), events);
    }

    #[test]
    fn demo_script_calibrates_then_quits() {
        let script = demo_script();
        assert_eq!(script.last(), Some(&PoseEvent::Quit));
        assert_eq!(script.iter().filter(|e| **e == PoseEvent::Calibrate).count(), 1);
        assert!(script.iter().filter(|e| matches!(e, PoseEvent::Frame(_))).count() > 100);
    }

    #[test]
    fn demo_body_is_complete() {
        let pose = Body::standing().pose();
        for id in KeypointId::ALL {
            assert!(pose.get(id).is_some(), "missing {}", id.name());
        }
    }
}
