//! Horizon Gesture - multi-touch gesture recognition.
//!
//! A [`Touch`] dispatcher sits on one node of the host's element tree. It
//! normalizes mouse, touch and click input into `onDown`/`onUp`/`onTap` and
//! drives four gesture detectors:
//!
//! - [`Drag`]: tolerance-gated, bounds-clamped pointer tracking
//! - [`Flick`]: peak release velocity over the last few samples
//! - [`Hold`]: timed hold events and pulses while the pointer stays down
//! - [`Pinch`]: two-finger scale, clamped to a configured range
//!
//! Defaults live in a [`GestureConfigStore`] shared by every dispatcher of an
//! application. Each gesture snapshots the defaults (plus per-node overrides)
//! when it begins.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_gesture::{
//!     GestureConfigStore, GestureHost, InputEvent, InputKind, ManualClock, NodeId, Rect,
//!     SharedTimerManager, Size, Touch, TouchProps,
//! };
//!
//! struct Page;
//!
//! impl GestureHost for Page {
//!     fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
//!         ancestor == node
//!     }
//!     fn bounding_rect(&self, _node: NodeId) -> Option<Rect> {
//!         Some(Rect::new(0.0, 0.0, 200.0, 200.0))
//!     }
//!     fn viewport(&self) -> Size {
//!         Size::new(800.0, 600.0)
//!     }
//! }
//!
//! let clock = Arc::new(ManualClock::new());
//! let timers = Arc::new(SharedTimerManager::with_clock(clock.clone()));
//! let props = TouchProps::new().on_drag(|ev| println!("drag to {}, {}", ev.x, ev.y));
//! let mut touch = Touch::new(Arc::new(Page), Arc::new(GestureConfigStore::new()), timers, props);
//!
//! let node = NodeId(1);
//! touch.handle_event(&InputEvent::mouse(InputKind::MouseDown, 0.0, node, 10.0, 10.0));
//! touch.handle_event(&InputEvent::mouse(InputKind::MouseMove, 16.0, node, 50.0, 10.0));
//! assert!(touch.is_active());
//! touch.handle_event(&InputEvent::mouse(InputKind::MouseUp, 32.0, node, 50.0, 10.0));
//! assert!(!touch.is_active());
//! ```

mod click_allow;
pub mod config;
mod drag;
pub mod event;
mod flick;
mod hold;
pub mod node;
mod pinch;
mod touch;

pub use horizon_gesture_core::*;

pub use click_allow::ClickAllow;
pub use config::{
    BoxSizing, DragConfig, FlickConfig, GestureConfig, GestureConfigStore, HoldConfig,
    HoldEventDef, PartialDragConfig, PartialFlickConfig, PartialGestureConfig, PartialHoldConfig,
    PartialPinchConfig, PinchConfig, merge_config, merge_config_json, merge_gesture_config,
};
pub use drag::{Drag, DragCallbacks, DragPhase};
pub use event::{
    Callback, DragEvent, DragEventType, FlickDirection, FlickEvent, GestureCoords, HoldEndEvent,
    HoldEvent, HoldPulseEvent, InputEvent, InputKind, NodeId, PinchEvent, PinchEventType,
    PointerCallback, PointerEvent, PointerEventType, TouchPoint,
};
pub use flick::{Flick, FlickCallbacks};
pub use hold::{Hold, HoldCallbacks};
pub use node::{Bounds, GestureNode, StaticNode, container_bounds};
pub use pinch::{Pinch, PinchCallbacks};
pub use touch::{GestureHost, GlobalListeners, Touch, TouchProps, dispatch_document_event};
