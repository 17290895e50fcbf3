//! # gesture_command
//!
//! Turns a per-frame stream of body keypoints into game control intents and
//! then into keyboard/mouse actions.
//!
//! ## Pipeline
//!
//! ```text
//! FramePose ──► strategies ──► StrategyComposer ──► Command ──► InputSequencer ──► InputAction*
//!                                    ▲
//!                        calibrate() ┘ (Hand-Pan neutral point)
//! ```
//!
//! ## Gesture → Intent mapping
//!
//! | Strategy | Gesture | Intent |
//! |---|---|---|
//! | Bend-Motion | Lean torso toward / away from camera | `forward` / `backward` |
//! | Gun-Pose | Both elbows bent, wrists together | `fire` |
//! | Hand-Turn | Hands left / right of frame centre | `left` / `right` (latched) |
//! | Hand-Pan | Hands offset from neutral point | pointer delta |
//! | Shoulder-Pan | One shoulder pulled back | horizontal pointer delta |
//! | Panic | Both wrists above the nose, held | `brake`, pointer zeroed |
//!
//! ## Input mapping (defaults)
//!
//! | Intent | Action |
//! |---|---|
//! | `forward` / `backward` / `left` / `right` | hold `W` / `S` / `A` / `D` |
//! | `brake` | release all movement keys |
//! | `fire` | left click on rising edge, 0.5 s cooldown |
//! | pointer delta | relative mouse move |
//!
//! Everything here is synchronous and allocation-light; time enters only as
//! an explicit [`std::time::Instant`] argument so the pipeline can be driven
//! deterministically.

pub mod pose;
pub mod command;
pub mod filter;
pub mod geometry;
pub mod strategy;
pub mod composer;
pub mod sequencer;
pub mod calibration;
pub mod config;

pub use pose::{FramePose, Keypoint, KeypointId, Point};
pub use command::Command;
pub use filter::EmaFilter;
pub use strategy::{
    BendMotionStrategy, GestureStrategy, GunPoseStrategy, HandPanStrategy,
    HandTurnStrategy, PanicStrategy, ShoulderPanStrategy,
};
pub use composer::StrategyComposer;
pub use sequencer::{InputAction, InputSequencer, InputSink, Key, KeyMap, MouseButton, Movement};
pub use config::Config;
