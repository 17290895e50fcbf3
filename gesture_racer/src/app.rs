//! Top-level control loop.
//!
//! `AppState` owns the strategy composer, the input sequencer and the
//! active input backend.  It consumes [`PoseEvent`]s one at a time and
//! pushes the resulting actions into the backend.

use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::time::Instant;

use anyhow::Result;
use tracing::{debug, info, trace};

use gesture_command::{Command, Config, FramePose, InputSequencer, InputSink, Point, StrategyComposer};

use crate::sink::{open_sink, Backend};
use crate::source::{spawn_pose_source, PoseEvent, ReplaySource, ScriptedSource};

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Where frames come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    /// The built-in demo script.
    Demo,
    /// Newline-delimited JSON; `-` is standard input.
    Replay(PathBuf),
}

/// Everything `run` needs, after the CLI and the config file are merged.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub config:          Config,
    pub source:          SourceKind,
    pub backend:         Backend,
    /// Re-centre the pan neutral point on the first frame, if it shows a wrist.
    pub calibrate_first: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            config:          Config::default(),
            source:          SourceKind::Demo,
            backend:         Backend::Log,
            calibrate_first: false,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

/// Whether the loop should keep going after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Counters reported when the loop ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub frames:       u64,
    pub calibrations: u32,
    pub actions:      usize,
}

pub struct AppState {
    // ── pipeline ─────────────────────────────────────────────────────────
    composer:  StrategyComposer,
    sequencer: InputSequencer,
    sink:      Box<dyn InputSink>,

    // ── frame gating ─────────────────────────────────────────────────────
    min_visibility: f32,

    // ── calibration ──────────────────────────────────────────────────────
    /// Most recent frame, after visibility gating.
    latest:          Option<FramePose>,
    /// One-shot: calibrate on the first frame, whatever it shows.
    calibrate_first: bool,

    // ── status ───────────────────────────────────────────────────────────
    last_command: Command,
    stats:        RunStats,
}

impl AppState {
    pub fn new(config: &Config, sink: Box<dyn InputSink>) -> Self {
        let composer = StrategyComposer::from_config(config);
        info!("strategies: {}", composer.strategy_names().join(", "));
        AppState {
            composer,
            sequencer:           InputSequencer::new(&config.sequencer),
            sink,
            min_visibility:      config.pipeline.min_visibility,
            latest:              None,
            calibrate_first:     false,
            last_command:        Command::idle(),
            stats:               RunStats::default(),
        }
    }

    /// Re-centre the pan neutral point on the wrists of the latest frame.
    ///
    /// A no-op, returning `None`, before the first frame, when that frame
    /// shows no wrist, or when Hand-Pan is disabled.
    pub fn calibrate(&mut self) -> Option<Point> {
        let Some(pose) = self.latest.as_ref() else {
            debug!("calibration skipped: no frame yet");
            return None;
        };
        let neutral = self.composer.calibrate(pose);
        if neutral.is_some() {
            self.stats.calibrations += 1;
        }
        neutral
    }

    /// Calibrate on the next frame before it is evaluated.  Only that one
    /// frame is tried.
    pub fn calibrate_on_first_frame(&mut self) {
        self.calibrate_first = true;
    }

    pub fn last_command(&self) -> &Command {
        &self.last_command
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    // ── process one PoseEvent ─────────────────────────────────────────────

    pub fn handle_event(&mut self, event: PoseEvent, now: Instant) -> Flow {
        match event {
            PoseEvent::Frame(mut pose) => {
                pose.retain_visible(self.min_visibility);
                let pose = &*self.latest.insert(pose);

                if std::mem::take(&mut self.calibrate_first)
                    && self.composer.calibrate(pose).is_some()
                {
                    self.stats.calibrations += 1;
                }

                let cmd = self.composer.evaluate(pose, now);
                // Pointer deltas wobble every frame; only report intent changes.
                let held = |c: &Command| Command { pointer_dx: 0.0, pointer_dy: 0.0, ..*c };
                if held(&cmd) != held(&self.last_command) {
                    info!("{}", cmd);
                } else {
                    trace!("{}", cmd);
                }
                self.last_command = cmd;

                self.stats.frames += 1;
                self.stats.actions += self.sequencer.apply_to(&cmd, now, self.sink.as_mut());
                Flow::Continue
            }

            PoseEvent::Calibrate => {
                self.calibrate();
                Flow::Continue
            }

            PoseEvent::Quit => Flow::Quit,
        }
    }

    /// Let go of any held movement keys.  Safe to call more than once.
    pub fn shutdown(&mut self) {
        for action in self.sequencer.release_held() {
            action.dispatch(self.sink.as_mut());
            self.stats.actions += 1;
        }
    }

    /// Consume events until a quit event or until the source hangs up, then
    /// release held keys.  Frames are timestamped on arrival.
    pub fn drive(&mut self, rx: Receiver<PoseEvent>) -> RunStats {
        for event in rx {
            if self.handle_event(event, Instant::now()) == Flow::Quit {
                break;
            }
        }
        self.shutdown();
        self.stats
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the full application.
///
/// Opens the input backend and the pose source, then drives the control
/// loop until the source finishes.
pub fn run(cfg: AppConfig) -> Result<RunStats> {
    let sink = open_sink(cfg.backend)?;
    let fps = cfg.config.pipeline.fps;

    let rx = match &cfg.source {
        SourceKind::Demo => {
            info!("source: demo script at {} fps", fps);
            spawn_pose_source(ScriptedSource::demo(fps))
        }
        SourceKind::Replay(path) => spawn_pose_source(ReplaySource::open(path, fps)?),
    };

    let mut app = AppState::new(&cfg.config, sink);
    if cfg.calibrate_first {
        app.calibrate_on_first_frame();
    }

    let stats = app.drive(rx);
    info!(
        "done: {} frames, {} calibrations, {} actions",
        stats.frames, stats.calibrations, stats.actions
    );
    Ok(stats)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
