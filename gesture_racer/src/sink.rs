//! Input backends: where sequenced [`InputAction`]s end up.
//!
//! | Backend | Feature | Effect |
//! |---|---|---|
//! | [`LogSink`] | (default) | Traces every action, injects nothing |
//! | [`EnigoSink`] | `enigo` | Real OS keyboard and mouse events |
//! | [`RecordingSink`] | (default) | Keeps actions in memory for inspection |
//!
//! Backends are best-effort: an injection failure is logged and the loop
//! carries on.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use tracing::{debug, info};

use gesture_command::{InputAction, InputSink, Key, MouseButton};

// ════════════════════════════════════════════════════════════════════════════
// Backend selection
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    #[default]
    Log,
    Enigo,
}

impl FromStr for Backend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "log"   => Ok(Backend::Log),
            "enigo" => Ok(Backend::Enigo),
            other   => bail!("unknown backend {:?} (expected \"log\" or \"enigo\")", other),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Backend::Log   => "log",
            Backend::Enigo => "enigo",
        })
    }
}

/// Build the sink for `backend`.
///
/// Asking for `enigo` in a build without the `enigo` feature is an error
/// rather than a silent fallback.
pub fn open_sink(backend: Backend) -> Result<Box<dyn InputSink>> {
    match backend {
        Backend::Log => Ok(Box::new(LogSink::default())),
        #[cfg(feature = "enigo")]
        Backend::Enigo => Ok(Box::new(EnigoSink::new()?)),
        #[cfg(not(feature = "enigo"))]
        Backend::Enigo => bail!("this build has no OS input backend; rebuild with --features enigo"),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LogSink
// ════════════════════════════════════════════════════════════════════════════

/// Dry-run backend.  Key and button changes log at `info`, pointer motion
/// at `debug` so it does not drown everything else.
#[derive(Debug, Default)]
pub struct LogSink {
    sent: usize,
}

impl LogSink {
    pub fn sent(&self) -> usize {
        self.sent
    }
}

impl InputSink for LogSink {
    fn press(&mut self, key: Key) {
        self.sent += 1;
        info!("press   {}", key);
    }

    fn release(&mut self, key: Key) {
        self.sent += 1;
        info!("release {}", key);
    }

    fn click(&mut self, button: MouseButton) {
        self.sent += 1;
        info!("click   {:?}", button);
    }

    fn move_pointer(&mut self, dx: f32, dy: f32) {
        self.sent += 1;
        debug!("pointer {:+.1}, {:+.1}", dx, dy);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// RecordingSink
// ════════════════════════════════════════════════════════════════════════════

/// Shared in-memory log of actions.
///
/// Clones share one buffer, so a caller can hand a clone to the control
/// loop and inspect what arrived once the loop returns.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    actions: Arc<Mutex<Vec<InputAction>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn actions(&self) -> Vec<InputAction> {
        self.lock().clone()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<InputAction>> {
        self.actions.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl InputSink for RecordingSink {
    fn press(&mut self, key: Key)            { self.lock().press(key); }
    fn release(&mut self, key: Key)          { self.lock().release(key); }
    fn click(&mut self, button: MouseButton) { self.lock().click(button); }
    fn move_pointer(&mut self, dx: f32, dy: f32) {
        self.lock().move_pointer(dx, dy);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// EnigoSink — OS injection (feature = "enigo")
// ════════════════════════════════════════════════════════════════════════════

/// Injects real keyboard and mouse events through `enigo`.
///
/// Pointer deltas are fractional; the remainder after rounding toward zero
/// is carried into the next move so slow pans still add up.
#[cfg(feature = "enigo")]
pub struct EnigoSink {
    enigo:    enigo::Enigo,
    residual: (f32, f32),
}

#[cfg(feature = "enigo")]
impl EnigoSink {
    pub fn new() -> Result<Self> {
        let enigo = enigo::Enigo::new(&enigo::Settings::default())
            .map_err(|e| anyhow::anyhow!("initialising enigo: {:?}", e))?;
        info!("enigo input backend ready");
        Ok(Self { enigo, residual: (0.0, 0.0) })
    }

    fn key(&mut self, key: Key, direction: enigo::Direction) {
        use enigo::Keyboard;
        if let Err(e) = self.enigo.key(enigo::Key::Unicode(key.0), direction) {
            tracing::warn!("key {} {:?} failed: {:?}", key, direction, e);
        }
    }
}

#[cfg(feature = "enigo")]
impl InputSink for EnigoSink {
    fn press(&mut self, key: Key) {
        self.key(key, enigo::Direction::Press);
    }

    fn release(&mut self, key: Key) {
        self.key(key, enigo::Direction::Release);
    }

    fn click(&mut self, button: MouseButton) {
        use enigo::{Button, Direction, Mouse};
        let b = match button {
            MouseButton::Left   => Button::Left,
            MouseButton::Right  => Button::Right,
            MouseButton::Middle => Button::Middle,
        };
        if let Err(e) = self.enigo.button(b, Direction::Click) {
            tracing::warn!("click {:?} failed: {:?}", button, e);
        }
    }

    fn move_pointer(&mut self, dx: f32, dy: f32) {
        use enigo::{Coordinate, Mouse};
        let (x, y) = (dx + self.residual.0, dy + self.residual.1);
        let (ix, iy) = (x.trunc(), y.trunc());
        self.residual = (x - ix, y - iy);
        if ix == 0.0 && iy == 0.0 {
            return;
        }
        if let Err(e) = self.enigo.move_mouse(ix as i32, iy as i32, Coordinate::Rel) {
            tracing::warn!("pointer move failed: {:?}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_parses_case_insensitively() {
        assert_eq!("log".parse::<Backend>().unwrap(), Backend::Log);
        assert_eq!("ENIGO".parse::<Backend>().unwrap(), Backend::Enigo);
        assert!("uinput".parse::<Backend>().is_err());
        assert_eq!(Backend::Enigo.to_string(), "enigo");
    }

    #[test]
    fn log_backend_always_opens() {
        assert!(open_sink(Backend::Log).is_ok());
    }

    #[cfg(not(feature = "enigo"))]
    #[test]
    fn enigo_backend_needs_feature() {
        let err = open_sink(Backend::Enigo).err().unwrap();
        assert!(err.to_string().contains("--features enigo"));
    }

    #[test]
    fn log_sink_counts() {
        let mut sink = LogSink::default();
        InputAction::Press(Key('w')).dispatch(&mut sink);
        InputAction::MovePointer { dx: 1.5, dy: 0.0 }.dispatch(&mut sink);
        assert_eq!(sink.sent(), 2);
    }

    #[test]
    fn recording_clones_share_a_buffer() {
        let probe = RecordingSink::new();
        let mut handed_out = probe.clone();
        handed_out.press(Key('w'));
        handed_out.click(MouseButton::Left);
        assert_eq!(
            probe.actions(),
            vec![InputAction::Press(Key('w')), InputAction::Click(MouseButton::Left)],
        );
        probe.clear();
        assert!(handed_out.actions().is_empty());
    }
}
