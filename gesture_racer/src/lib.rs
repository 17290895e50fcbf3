//! # gesture_racer
//!
//! Body-gesture controller for racing and shooting games: pose keypoints in,
//! keyboard and mouse out.  The gesture logic lives in [`gesture_command`];
//! this crate supplies pose sources, input backends and the control loop.
//!
//! ## Gesture → Action mapping (default key map)
//!
//! | Gesture | Action |
//! |---|---|
//! | Lean toward camera | hold `W` |
//! | Lean away | hold `S` |
//! | Hands left / right of centre | hold `A` / `D` |
//! | Elbows bent, wrists together | left click (0.5 s cooldown) |
//! | Hands off neutral | relative mouse move |
//! | Both wrists above head, held 0.8 s | release all keys, stop mouse |
//!
//! ## Feature flags
//!
//! * (default) — **Dry run**: actions are logged through `tracing`.
//! * `enigo` — **Live mode**: actions are injected into the OS via `enigo`.
//!
//! ## Pose sources
//!
//! | Source | Input |
//! |---|---|
//! | [`ScriptedSource`](source::ScriptedSource) | Built-in demo run through every gesture |
//! | [`ReplaySource`](source::ReplaySource) | Newline-delimited JSON from a file or stdin |

pub mod source;
pub mod sink;
pub mod app;
