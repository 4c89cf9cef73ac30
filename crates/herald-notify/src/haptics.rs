//! Haptic feedback collaborator.
//!
//! The dispatcher calls [`HapticFeedback::notify`] once per promotion. The
//! engine behind it (a phone's taptic engine, a gamepad rumble, nothing at
//! all) is outside this crate.

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// Feedback pattern requested from the haptic engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HapticKind {
    /// Positive confirmation
    Success,
    /// Attention needed
    Warning,
    /// Failure
    Error,
}

/// Receives haptic requests from the dispatcher.
///
/// Called while the dispatcher holds its state lock, so implementations must
/// return quickly and must not call back into the dispatcher.
pub trait HapticFeedback: Send + Sync + fmt::Debug {
    /// Play the feedback pattern for `kind`.
    fn notify(&self, kind: HapticKind);
}

/// Haptic collaborator that does nothing. Used when none is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHaptics;

impl HapticFeedback for NoHaptics {
    fn notify(&self, _kind: HapticKind) {}
}

/// Haptic collaborator that records every request, for tests and previews.
#[derive(Debug, Clone, Default)]
pub struct RecordingHaptics {
    events: Arc<Mutex<Vec<HapticKind>>>,
}

impl RecordingHaptics {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests received so far, in order.
    pub fn events(&self) -> Vec<HapticKind> {
        self.events.lock().clone()
    }
}

impl HapticFeedback for RecordingHaptics {
    fn notify(&self, kind: HapticKind) {
        self.events.lock().push(kind);
    }
}
