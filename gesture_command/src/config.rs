//! TOML configuration for the strategies and the input sequencer.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{info, warn};

use crate::sequencer::{KeyMap, MouseButton};

/// Top-level configuration, usually loaded from `gesture_racer.toml`.
///
/// Every section and every key is optional; missing values fall back to the
/// defaults the controller ships with.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub pipeline:     PipelineConfig,
    #[serde(default)]
    pub bend_motion:  BendMotionConfig,
    #[serde(default)]
    pub gun_pose:     GunPoseConfig,
    #[serde(default)]
    pub hand_turn:    HandTurnConfig,
    #[serde(default)]
    pub hand_pan:     HandPanConfig,
    #[serde(default)]
    pub panic:        PanicConfig,
    #[serde(default)]
    pub shoulder_pan: ShoulderPanConfig,
    #[serde(default)]
    pub sequencer:    SequencerConfig,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load `path`, falling back to defaults when it is missing or invalid.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!("no config at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("{:#}; using defaults", e);
                Self::default()
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Pipeline
// ════════════════════════════════════════════════════════════════════════════

/// Which strategies run, and frame-level settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub bend_motion:    bool,
    pub gun_pose:       bool,
    pub hand_turn:      bool,
    pub hand_pan:       bool,
    pub panic:          bool,
    pub shoulder_pan:   bool,
    /// Keypoints below this visibility are treated as not detected.
    pub min_visibility: f32,
    /// Target frame rate for paced pose sources.
    pub fps:            u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            bend_motion:    true,
            gun_pose:       true,
            hand_turn:      true,
            hand_pan:       true,
            panic:          true,
            shoulder_pan:   false,
            min_visibility: 0.5,
            fps:            30,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Strategies
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BendMotionConfig {
    /// Shoulder-minus-hip depth beyond which a lean registers.
    pub lean_threshold: f32,
}

impl Default for BendMotionConfig {
    fn default() -> Self {
        Self { lean_threshold: 0.10 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GunPoseConfig {
    /// Elbow angle (degrees) below which an arm counts as bent.
    pub elbow_bent_threshold_deg: f32,
    /// Wrist separation (pixels) below which the hands count as together.
    pub wrist_distance_px:        f32,
}

impl Default for GunPoseConfig {
    fn default() -> Self {
        Self { elbow_bent_threshold_deg: 70.0, wrist_distance_px: 120.0 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HandTurnConfig {
    pub dead_zone_px:  f32,
    pub hysteresis_px: f32,
    pub invert_x:      bool,
}

impl Default for HandTurnConfig {
    fn default() -> Self {
        Self { dead_zone_px: 40.0, hysteresis_px: 20.0, invert_x: false }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HandPanConfig {
    /// Output gain.
    #[serde(default = "default_pan_sensitivity")]
    pub sensitivity:      f32,
    /// Square dead-zone half-width around the reference, pixels.
    #[serde(default = "default_pan_dead_zone")]
    pub dead_zone_px:     f32,
    /// Per-axis output clamp, pixels per frame.
    #[serde(default = "default_max_px_per_frame")]
    pub max_px_per_frame: f32,
    #[serde(default)]
    pub invert_y:         bool,
    /// Pan by frame-to-frame wrist motion instead of offset from neutral.
    #[serde(default)]
    pub use_velocity:     bool,
    #[serde(default = "default_pan_ema_alpha")]
    pub ema_alpha:        f32,
    /// Seed the neutral point from the frame centre on first use.
    /// Both settings currently behave the same way.
    #[serde(default = "default_true")]
    pub neutral_center:   bool,
}

fn default_pan_sensitivity() -> f32 { 0.6 }
fn default_pan_dead_zone() -> f32 { 25.0 }
fn default_max_px_per_frame() -> f32 { 30.0 }
fn default_pan_ema_alpha() -> f32 { 0.35 }
fn default_true() -> bool { true }

impl Default for HandPanConfig {
    fn default() -> Self {
        Self {
            sensitivity:      default_pan_sensitivity(),
            dead_zone_px:     default_pan_dead_zone(),
            max_px_per_frame: default_max_px_per_frame(),
            invert_y:         false,
            use_velocity:     false,
            ema_alpha:        default_pan_ema_alpha(),
            neutral_center:   default_true(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PanicConfig {
    /// How long both wrists must stay above the nose.
    pub duration_sec: f64,
}

fn default_panic_duration() -> f64 { 0.8 }

impl PanicConfig {
    pub fn duration(&self) -> Duration {
        seconds("panic.duration_sec", self.duration_sec, default_panic_duration())
    }
}

impl Default for PanicConfig {
    fn default() -> Self {
        Self { duration_sec: default_panic_duration() }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ShoulderPanConfig {
    pub z_sensitivity_px_per_unit: f32,
    pub dead_zone_z:               f32,
    pub max_px_per_frame:          f32,
}

impl Default for ShoulderPanConfig {
    fn default() -> Self {
        Self {
            z_sensitivity_px_per_unit: 400.0,
            dead_zone_z:               0.03,
            max_px_per_frame:          default_max_px_per_frame(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Sequencer
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SequencerConfig {
    /// Minimum interval between fire clicks.
    pub fire_cooldown_sec: f64,
    pub keys:              KeyMap,
    pub fire_button:       MouseButton,
}

fn default_fire_cooldown() -> f64 { 0.5 }

impl SequencerConfig {
    pub fn fire_cooldown(&self) -> Duration {
        seconds("sequencer.fire_cooldown_sec", self.fire_cooldown_sec, default_fire_cooldown())
    }
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            fire_cooldown_sec: default_fire_cooldown(),
            keys:              KeyMap::default(),
            fire_button:       MouseButton::Left,
        }
    }
}

/// `value` seconds, or `fallback` when it is negative, NaN or too large
/// for a `Duration`.
fn seconds(key: &str, value: f64, fallback: f64) -> Duration {
    match Duration::try_from_secs_f64(value) {
        Ok(d) => d,
        Err(e) => {
            warn!("{} = {}: {}; using {}", key, value, e, fallback);
            Duration::from_secs_f64(fallback)
        }
    }
}
