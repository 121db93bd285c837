//! Drag gesture detection.
//!
//! A drag begins tentatively on pointer down and is confirmed once the pointer
//! has travelled `moveTolerance` pixels from where it started. Positions are
//! clamped to the container bounds and reported container-relative.
//!
//! ```text
//! Idle --begin--> Untracked --tolerance--> Active <--leave/enter--> Paused
//!                     \__________________end_______________________/
//! ```

use horizon_gesture_core::Point;
use horizon_gesture_core::logging::targets;

use crate::config::{DragConfig, PartialDragConfig};
use crate::event::{Callback, DragEvent, DragEventType, emit};
use crate::node::{Bounds, GestureNode, clamp_to, container_bounds};

/// Callbacks for drag gestures.
#[derive(Clone, Default)]
pub struct DragCallbacks {
    pub on_drag_start: Option<Callback<DragEvent>>,
    pub on_drag: Option<Callback<DragEvent>>,
    pub on_drag_end: Option<Callback<DragEvent>>,
}

impl DragCallbacks {
    /// Whether no drag callback is registered.
    pub fn is_empty(&self) -> bool {
        self.on_drag_start.is_none() && self.on_drag.is_none() && self.on_drag_end.is_none()
    }
}

impl std::fmt::Debug for DragCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DragCallbacks")
            .field("on_drag_start", &self.on_drag_start.is_some())
            .field("on_drag", &self.on_drag.is_some())
            .field("on_drag_end", &self.on_drag_end.is_some())
            .finish()
    }
}

/// Observable phase of an in-progress drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    /// Pointer is down but has not moved far enough.
    Untracked,
    /// Drag is confirmed and reporting positions.
    Active,
    /// Pointer left the node; moves are ignored until it re-enters.
    Paused,
}

#[derive(Debug, Clone, Copy)]
enum Tracking {
    Untracked,
    Active { position: Point },
    Paused { position: Point },
}

#[derive(Debug)]
struct DragSession {
    config: DragConfig,
    callbacks: DragCallbacks,
    resume: bool,
    start: Point,
    bounds: Option<Bounds>,
    tracking: Tracking,
}

impl DragSession {
    fn emit(&self, kind: DragEventType, position: Point) {
        let callback = match kind {
            DragEventType::DragStart => &self.callbacks.on_drag_start,
            DragEventType::Drag => &self.callbacks.on_drag,
            DragEventType::DragEnd => &self.callbacks.on_drag_end,
        };
        emit(
            callback,
            &DragEvent {
                kind,
                x: position.x,
                y: position.y,
            },
        );
    }
}

#[derive(Debug, Default)]
enum DragState {
    #[default]
    Idle,
    Dragging(DragSession),
}

/// Drag detector.
#[derive(Debug, Default)]
pub struct Drag {
    state: DragState,
}

impl Drag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a drag has begun and not yet ended.
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    /// The phase of the current drag, if any.
    pub fn phase(&self) -> Option<DragPhase> {
        match &self.state {
            DragState::Idle => None,
            DragState::Dragging(session) => Some(match session.tracking {
                Tracking::Untracked => DragPhase::Untracked,
                Tracking::Active { .. } => DragPhase::Active,
                Tracking::Paused { .. } => DragPhase::Paused,
            }),
        }
    }

    /// Start tracking a potential drag at `coord`.
    ///
    /// Does nothing when no drag callback is registered.
    pub fn begin(
        &mut self,
        config: &DragConfig,
        callbacks: &DragCallbacks,
        no_resume: bool,
        coord: Point,
        node: Option<&dyn GestureNode>,
    ) {
        if callbacks.is_empty() {
            return;
        }

        let bounds = container_bounds(node, config.box_sizing, config.global);
        tracing::trace!(target: targets::DRAG, ?coord, ?bounds, "drag begin");
        self.state = DragState::Dragging(DragSession {
            config: config.clone(),
            callbacks: callbacks.clone(),
            resume: !no_resume,
            start: coord,
            bounds,
            tracking: Tracking::Untracked,
        });
    }

    /// Feed a pointer position.
    pub fn move_to(&mut self, coord: Point) {
        let DragState::Dragging(session) = &mut self.state else {
            return;
        };

        match session.tracking {
            Tracking::Untracked => {
                if session.start.distance(coord) >= session.config.move_tolerance {
                    let position = clamp_to(session.bounds.as_ref(), coord);
                    session.tracking = Tracking::Active { position };
                    tracing::debug!(target: targets::DRAG, ?position, "drag started");
                    session.emit(DragEventType::DragStart, position);
                }
            }
            Tracking::Active { position } => {
                let next = clamp_to(session.bounds.as_ref(), coord);
                if next != position {
                    session.tracking = Tracking::Active { position: next };
                    session.emit(DragEventType::Drag, next);
                }
            }
            Tracking::Paused { .. } => {}
        }
    }

    /// Finish the drag, firing `onDragEnd` once.
    pub fn end(&mut self) {
        let DragState::Dragging(session) = std::mem::take(&mut self.state) else {
            return;
        };

        let position = match session.tracking {
            Tracking::Active { position } | Tracking::Paused { position } => position,
            Tracking::Untracked => clamp_to(session.bounds.as_ref(), session.start),
        };
        tracing::debug!(target: targets::DRAG, ?position, "drag ended");
        session.emit(DragEventType::DragEnd, position);
    }

    /// Pointer re-entered the node: resume a paused drag.
    pub fn enter(&mut self) {
        if let DragState::Dragging(session) = &mut self.state {
            if let Tracking::Paused { position } = session.tracking {
                if session.resume {
                    tracing::trace!(target: targets::DRAG, "drag resumed");
                    session.tracking = Tracking::Active { position };
                }
            }
        }
    }

    /// Pointer left the node: pause an active, non-global drag.
    pub fn leave(&mut self) {
        if let DragState::Dragging(session) = &mut self.state {
            if let Tracking::Active { position } = session.tracking {
                if !session.config.global {
                    tracing::trace!(target: targets::DRAG, "drag paused");
                    session.tracking = Tracking::Paused { position };
                }
            }
        }
    }

    /// Node lost focus: end a non-global drag.
    pub fn blur(&mut self) {
        if let DragState::Dragging(session) = &self.state {
            if !session.config.global {
                self.end();
            }
        }
    }

    /// Drop any drag without firing callbacks.
    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }

    /// Replace the callbacks of an in-progress drag.
    pub fn update_callbacks(&mut self, callbacks: &DragCallbacks) {
        if let DragState::Dragging(session) = &mut self.state {
            session.callbacks = callbacks.clone();
        }
    }

    /// Apply a configuration change to an in-progress drag.
    ///
    /// Bounds captured at `begin` are kept.
    pub fn update_config(&mut self, update: &PartialDragConfig) {
        if let DragState::Dragging(session) = &mut self.state {
            update.apply_to(&mut session.config);
        }
    }
}
