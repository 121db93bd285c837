//! Suppression of synthetic duplicate events.
//!
//! Touch devices follow `touchend` with compatibility mouse events, and a real
//! mouse release is followed by a `click`. Both share the timestamp of the
//! event they echo. [`ClickAllow`] remembers the last `touchend` and
//! `mouseup` timestamps so the echoes can be dropped.

use crate::event::{InputEvent, InputKind};

/// Timestamp ledger for duplicate suppression.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClickAllow {
    last_touch_end_time: Option<f64>,
    last_mouse_up_time: Option<f64>,
}

impl ClickAllow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the timestamp of a `touchend`. Other events are ignored.
    pub fn set_last_touch_end(&mut self, event: &InputEvent) {
        if event.kind == InputKind::TouchEnd {
            self.last_touch_end_time = Some(event.time_stamp);
        }
    }

    /// Record the timestamp of a `mouseup`. Other events are ignored.
    pub fn set_last_mouse_up(&mut self, event: &InputEvent) {
        if event.kind == InputKind::MouseUp {
            self.last_mouse_up_time = Some(event.time_stamp);
        }
    }

    /// A mouse event is allowed unless it echoes the last `touchend`.
    pub fn should_allow_mouse_event(&self, event: &InputEvent) -> bool {
        event.kind.is_mouse() && self.last_touch_end_time != Some(event.time_stamp)
    }

    /// A `click` becomes a tap unless it echoes the last `mouseup`, which
    /// already produced one.
    pub fn should_allow_tap(&self, event: &InputEvent) -> bool {
        event.kind == InputKind::Click && self.last_mouse_up_time != Some(event.time_stamp)
    }
}
