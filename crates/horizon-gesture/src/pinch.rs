//! Pinch gesture detection.
//!
//! Scale is the ratio of the current finger distance to the distance at
//! `begin`, clamped to `[minScale, maxScale]`. Distances are measured between
//! the bounds-clamped, container-relative finger positions.

use horizon_gesture_core::Point;
use horizon_gesture_core::logging::targets;

use crate::config::{PartialPinchConfig, PinchConfig};
use crate::event::{Callback, PinchEvent, PinchEventType, emit};
use crate::node::{Bounds, GestureNode, clamp_to, container_bounds};

/// Callbacks for pinch gestures.
#[derive(Clone, Default)]
pub struct PinchCallbacks {
    pub on_pinch_start: Option<Callback<PinchEvent>>,
    pub on_pinch: Option<Callback<PinchEvent>>,
    pub on_pinch_end: Option<Callback<PinchEvent>>,
}

impl PinchCallbacks {
    pub fn is_empty(&self) -> bool {
        self.on_pinch_start.is_none() && self.on_pinch.is_none() && self.on_pinch_end.is_none()
    }
}

impl std::fmt::Debug for PinchCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PinchCallbacks")
            .field("on_pinch_start", &self.on_pinch_start.is_some())
            .field("on_pinch", &self.on_pinch.is_some())
            .field("on_pinch_end", &self.on_pinch_end.is_some())
            .finish()
    }
}

const START_SCALE: f32 = 1.0;

#[derive(Debug)]
struct PinchSession {
    config: PinchConfig,
    callbacks: PinchCallbacks,
    bounds: Option<Bounds>,
    start_distance: f32,
    /// Distance at the last reported scale.
    previous_distance: f32,
    scale: f32,
}

impl PinchSession {
    fn distance(&self, [a, b]: [Point; 2]) -> f32 {
        let bounds = self.bounds.as_ref();
        clamp_to(bounds, a).distance(clamp_to(bounds, b))
    }

    fn clamp_scale(&self, scale: f32) -> f32 {
        scale.max(self.config.min_scale).min(self.config.max_scale)
    }
}

#[derive(Debug, Default)]
enum PinchState {
    #[default]
    Idle,
    Pinching(PinchSession),
}

/// Pinch detector.
#[derive(Debug, Default)]
pub struct Pinch {
    state: PinchState,
}

impl Pinch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pinching(&self) -> bool {
        matches!(self.state, PinchState::Pinching(_))
    }

    /// The last reported scale, if pinching.
    pub fn scale(&self) -> Option<f32> {
        match &self.state {
            PinchState::Pinching(session) => Some(session.scale),
            PinchState::Idle => None,
        }
    }

    /// Start a pinch and fire `onPinchStart` right away.
    pub fn begin(
        &mut self,
        config: &PinchConfig,
        callbacks: &PinchCallbacks,
        coords: [Point; 2],
        node: Option<&dyn GestureNode>,
    ) {
        if callbacks.is_empty() {
            return;
        }

        let mut session = PinchSession {
            config: config.clone(),
            callbacks: callbacks.clone(),
            bounds: container_bounds(node, config.box_sizing, config.global),
            start_distance: 0.0,
            previous_distance: 0.0,
            scale: START_SCALE,
        };
        session.start_distance = session.distance(coords);
        session.previous_distance = session.start_distance;

        tracing::debug!(
            target: targets::PINCH,
            start_distance = session.start_distance,
            "pinch started"
        );
        emit(
            &session.callbacks.on_pinch_start,
            &PinchEvent {
                kind: PinchEventType::PinchStart,
                scale: None,
                coords: Some(coords),
            },
        );
        self.state = PinchState::Pinching(session);
    }

    /// Feed a new finger pair.
    pub fn move_to(&mut self, coords: [Point; 2]) {
        let PinchState::Pinching(session) = &mut self.state else {
            return;
        };
        if session.start_distance <= 0.0 {
            return;
        }

        let distance = session.distance(coords);
        if (distance - session.previous_distance).abs() <= session.config.move_tolerance {
            return;
        }

        let scale = session.clamp_scale(distance / session.start_distance * START_SCALE);
        if scale == session.scale {
            return;
        }

        session.previous_distance = distance;
        session.scale = scale;
        tracing::trace!(target: targets::PINCH, scale, distance, "pinch");
        emit(
            &session.callbacks.on_pinch,
            &PinchEvent {
                kind: PinchEventType::Pinch,
                scale: Some(scale),
                coords: Some(coords),
            },
        );
    }

    /// Finish the pinch, firing `onPinchEnd` once.
    pub fn end(&mut self) {
        let PinchState::Pinching(session) = std::mem::take(&mut self.state) else {
            return;
        };

        tracing::debug!(target: targets::PINCH, scale = session.scale, "pinch ended");
        emit(
            &session.callbacks.on_pinch_end,
            &PinchEvent {
                kind: PinchEventType::PinchEnd,
                scale: Some(session.scale),
                coords: None,
            },
        );
    }

    /// Node lost focus: end a non-global pinch.
    pub fn blur(&mut self) {
        if matches!(&self.state, PinchState::Pinching(session) if !session.config.global) {
            self.end();
        }
    }

    pub fn cancel(&mut self) {
        self.state = PinchState::Idle;
    }

    pub fn update_callbacks(&mut self, callbacks: &PinchCallbacks) {
        if let PinchState::Pinching(session) = &mut self.state {
            session.callbacks = callbacks.clone();
        }
    }

    pub fn update_config(&mut self, update: &PartialPinchConfig) {
        if let PinchState::Pinching(session) = &mut self.state {
            update.apply_to(&mut session.config);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use horizon_gesture_core::{Rect, Size};
    use parking_lot::Mutex;

    use super::*;
    use crate::node::StaticNode;

    fn recorder() -> (Arc<Mutex<Vec<PinchEvent>>>, PinchCallbacks) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let record = |events: &Arc<Mutex<Vec<PinchEvent>>>| -> Option<Callback<PinchEvent>> {
            let events = Arc::clone(events);
            Some(Arc::new(move |ev: &PinchEvent| events.lock().push(*ev)))
        };
        let callbacks = PinchCallbacks {
            on_pinch_start: record(&events),
            on_pinch: record(&events),
            on_pinch_end: record(&events),
        };
        (events, callbacks)
    }

    fn pair(distance: f32) -> [Point; 2] {
        [Point::new(0.0, 0.0), Point::new(distance, 0.0)]
    }

    #[test]
    fn test_begin_fires_start_immediately() {
        let (events, callbacks) = recorder();
        let mut pinch = Pinch::new();
        pinch.begin(&PinchConfig::default(), &callbacks, pair(50.0), None);

        let events = events.lock();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, PinchEventType::PinchStart);
        assert_eq!(events[0].coords, Some(pair(50.0)));
        assert_eq!(events[0].scale, None);
    }

    #[test]
    fn test_begin_without_callbacks_is_noop() {
        let mut pinch = Pinch::new();
        pinch.begin(&PinchConfig::default(), &PinchCallbacks::default(), pair(50.0), None);
        assert!(!pinch.is_pinching());
    }

    #[test]
    fn test_scale_is_clamped() {
        let (events, callbacks) = recorder();
        let mut pinch = Pinch::new();
        pinch.begin(&PinchConfig::default(), &callbacks, pair(20.0), None);

        pinch.move_to(pair(200.0));
        assert_eq!(pinch.scale(), Some(4.0));

        pinch.move_to(pair(2.0));
        assert_eq!(pinch.scale(), Some(0.5));

        let events = events.lock();
        assert_eq!(events[1].scale, Some(4.0));
        assert_eq!(events[2].scale, Some(0.5));
    }

    #[test]
    fn test_small_distance_change_is_ignored() {
        let (events, callbacks) = recorder();
        let mut pinch = Pinch::new();
        pinch.begin(&PinchConfig::default(), &callbacks, pair(100.0), None);

        pinch.move_to(pair(110.0));
        pinch.move_to(pair(116.0));
        assert_eq!(events.lock().len(), 1);

        pinch.move_to(pair(117.0));
        assert_eq!(events.lock().len(), 2);
        assert_eq!(pinch.scale(), Some(1.17));
    }

    #[test]
    fn test_unchanged_scale_is_not_reported() {
        let (events, callbacks) = recorder();
        let mut pinch = Pinch::new();
        pinch.begin(&PinchConfig::default(), &callbacks, pair(20.0), None);
        pinch.move_to(pair(100.0));
        pinch.move_to(pair(200.0));
        assert_eq!(events.lock().len(), 2);
    }

    #[test]
    fn test_distance_uses_clamped_positions() {
        let (_events, callbacks) = recorder();
        let node = StaticNode::new(Rect::new(0.0, 0.0, 100.0, 100.0), Size::new(800.0, 600.0));
        let mut pinch = Pinch::new();
        pinch.begin(&PinchConfig::default(), &callbacks, pair(50.0), Some(&node));

        // The second finger is clamped to x = 100.
        pinch.move_to(pair(400.0));
        assert_eq!(pinch.scale(), Some(2.0));
    }

    #[test]
    fn test_end_is_idempotent() {
        let (events, callbacks) = recorder();
        let mut pinch = Pinch::new();
        pinch.begin(&PinchConfig::default(), &callbacks, pair(50.0), None);
        pinch.end();
        pinch.end();

        let events = events.lock();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].kind, PinchEventType::PinchEnd);
        assert_eq!(events[1].scale, Some(1.0));
    }

    #[test]
    fn test_blur_respects_global() {
        let (_events, callbacks) = recorder();
        let mut pinch = Pinch::new();
        let global = PinchConfig {
            global: true,
            ..Default::default()
        };
        pinch.begin(&global, &callbacks, pair(50.0), None);
        pinch.blur();
        assert!(pinch.is_pinching());

        pinch.cancel();
        pinch.begin(&PinchConfig::default(), &callbacks, pair(50.0), None);
        pinch.blur();
        assert!(!pinch.is_pinching());
    }
}
