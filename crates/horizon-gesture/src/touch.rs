//! The touch dispatcher.
//!
//! [`Touch`] turns raw mouse, touch, click and focus events for one node into
//! `onDown`/`onUp`/`onTap` and drives the four gesture detectors. The host
//! feeds it events with [`Touch::handle_event`], routes expired timers to
//! [`Touch::handle_timer`], and forwards document-level events through the
//! listeners installed by [`Touch::install_global_listeners`] so that a
//! gesture released outside the node still finishes.
//!
//! # Ordering
//!
//! Within one input event, detectors are driven in a fixed order: Pinch for
//! two-finger input, otherwise Hold, Flick, then Drag. On release every
//! detector is ended (Pinch, Hold, Flick, Drag) before `onUp` and then
//! `onTap` fire.
//!
//! # Locking
//!
//! Callbacks run while the dispatcher is borrowed. A callback must not call
//! back into the dispatcher that invoked it.

use std::fmt;
use std::sync::{Arc, Weak};

use horizon_gesture_core::logging::targets;
use horizon_gesture_core::{
    DocumentListeners, Insets, ListenerGuard, ListenerKind, Point, Rect, SharedTimerManager,
    Size, TimerId,
};
use parking_lot::Mutex;

use crate::click_allow::ClickAllow;
use crate::config::{
    GestureConfig, GestureConfigStore, PartialDragConfig, PartialFlickConfig,
    PartialGestureConfig, PartialHoldConfig, PartialPinchConfig, merge_config,
};
use crate::drag::{Drag, DragCallbacks};
use crate::event::{
    Callback, DragEvent, FlickEvent, GestureCoords, HoldEndEvent, HoldEvent, HoldPulseEvent,
    InputEvent, InputKind, NodeId, PinchEvent, PointerCallback, PointerEvent, PointerEventType,
};
use crate::flick::{Flick, FlickCallbacks};
use crate::hold::{Hold, HoldCallbacks};
use crate::node::GestureNode;
use crate::pinch::{Pinch, PinchCallbacks};

/// The host's element tree, as far as the dispatcher needs to see it.
pub trait GestureHost: Send + Sync {
    /// Whether `node` is `ancestor` or one of its descendants.
    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool;

    /// Border box of `node` in viewport coordinates, or `None` if the node is
    /// gone.
    fn bounding_rect(&self, node: NodeId) -> Option<Rect>;

    fn padding(&self, _node: NodeId) -> Insets {
        Insets::ZERO
    }

    fn viewport(&self) -> Size;

    /// Whether `node` currently holds input focus.
    fn has_focus(&self, _node: NodeId) -> bool {
        false
    }
}

/// A node resolved through a [`GestureHost`].
struct HostNode<'a> {
    host: &'a dyn GestureHost,
    node: NodeId,
    rect: Rect,
}

impl<'a> HostNode<'a> {
    fn resolve(host: &'a dyn GestureHost, node: NodeId) -> Option<Self> {
        let rect = host.bounding_rect(node)?;
        Some(Self { host, node, rect })
    }
}

impl GestureNode for HostNode<'_> {
    fn bounding_rect(&self) -> Rect {
        self.rect
    }

    fn padding(&self) -> Insets {
        self.host.padding(self.node)
    }

    fn viewport(&self) -> Size {
        self.host.viewport()
    }
}

/// Per-node dispatcher settings: callbacks and configuration overrides.
#[derive(Clone, Default)]
pub struct TouchProps {
    /// Ignore presses and releases.
    pub disabled: bool,
    /// Leaving the node ends drags and holds instead of pausing them.
    pub no_resume: bool,
    pub on_down: Option<PointerCallback>,
    pub on_up: Option<PointerCallback>,
    pub on_tap: Option<PointerCallback>,
    pub drag: DragCallbacks,
    pub flick: FlickCallbacks,
    pub hold: HoldCallbacks,
    pub pinch: PinchCallbacks,
    pub drag_config: Option<PartialDragConfig>,
    pub flick_config: Option<PartialFlickConfig>,
    pub hold_config: Option<PartialHoldConfig>,
    pub pinch_config: Option<PartialPinchConfig>,
}

fn callback<E, F>(f: F) -> Option<Callback<E>>
where
    F: Fn(&E) + Send + Sync + 'static,
{
    Some(Arc::new(f))
}

fn pointer_callback<F>(f: F) -> Option<PointerCallback>
where
    F: Fn(&mut PointerEvent) + Send + Sync + 'static,
{
    Some(Arc::new(f))
}

impl TouchProps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn no_resume(mut self, no_resume: bool) -> Self {
        self.no_resume = no_resume;
        self
    }

    pub fn on_down(mut self, f: impl Fn(&mut PointerEvent) + Send + Sync + 'static) -> Self {
        self.on_down = pointer_callback(f);
        self
    }

    pub fn on_up(mut self, f: impl Fn(&mut PointerEvent) + Send + Sync + 'static) -> Self {
        self.on_up = pointer_callback(f);
        self
    }

    pub fn on_tap(mut self, f: impl Fn(&mut PointerEvent) + Send + Sync + 'static) -> Self {
        self.on_tap = pointer_callback(f);
        self
    }

    pub fn on_drag_start(mut self, f: impl Fn(&DragEvent) + Send + Sync + 'static) -> Self {
        self.drag.on_drag_start = callback(f);
        self
    }

    pub fn on_drag(mut self, f: impl Fn(&DragEvent) + Send + Sync + 'static) -> Self {
        self.drag.on_drag = callback(f);
        self
    }

    pub fn on_drag_end(mut self, f: impl Fn(&DragEvent) + Send + Sync + 'static) -> Self {
        self.drag.on_drag_end = callback(f);
        self
    }

    pub fn on_flick(mut self, f: impl Fn(&FlickEvent) + Send + Sync + 'static) -> Self {
        self.flick.on_flick = callback(f);
        self
    }

    pub fn on_hold(mut self, f: impl Fn(&HoldEvent) + Send + Sync + 'static) -> Self {
        self.hold.on_hold = callback(f);
        self
    }

    pub fn on_hold_pulse(mut self, f: impl Fn(&HoldPulseEvent) + Send + Sync + 'static) -> Self {
        self.hold.on_hold_pulse = callback(f);
        self
    }

    pub fn on_hold_end(mut self, f: impl Fn(&HoldEndEvent) + Send + Sync + 'static) -> Self {
        self.hold.on_hold_end = callback(f);
        self
    }

    pub fn on_pinch_start(mut self, f: impl Fn(&PinchEvent) + Send + Sync + 'static) -> Self {
        self.pinch.on_pinch_start = callback(f);
        self
    }

    pub fn on_pinch(mut self, f: impl Fn(&PinchEvent) + Send + Sync + 'static) -> Self {
        self.pinch.on_pinch = callback(f);
        self
    }

    pub fn on_pinch_end(mut self, f: impl Fn(&PinchEvent) + Send + Sync + 'static) -> Self {
        self.pinch.on_pinch_end = callback(f);
        self
    }

    pub fn drag_config(mut self, config: PartialDragConfig) -> Self {
        self.drag_config = Some(config);
        self
    }

    pub fn flick_config(mut self, config: PartialFlickConfig) -> Self {
        self.flick_config = Some(config);
        self
    }

    pub fn hold_config(mut self, config: PartialHoldConfig) -> Self {
        self.hold_config = Some(config);
        self
    }

    pub fn pinch_config(mut self, config: PartialPinchConfig) -> Self {
        self.pinch_config = Some(config);
        self
    }

    /// The per-node overrides as one partial configuration.
    fn overrides(&self) -> PartialGestureConfig {
        PartialGestureConfig {
            drag: self.drag_config.clone(),
            flick: self.flick_config.clone(),
            hold: self.hold_config.clone(),
            pinch: self.pinch_config.clone(),
        }
    }
}

impl fmt::Debug for TouchProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TouchProps")
            .field("disabled", &self.disabled)
            .field("no_resume", &self.no_resume)
            .field("on_down", &self.on_down.is_some())
            .field("on_up", &self.on_up.is_some())
            .field("on_tap", &self.on_tap.is_some())
            .field("drag", &self.drag)
            .field("flick", &self.flick)
            .field("hold", &self.hold)
            .field("pinch", &self.pinch)
            .field("drag_config", &self.drag_config)
            .field("flick_config", &self.flick_config)
            .field("hold_config", &self.hold_config)
            .field("pinch_config", &self.pinch_config)
            .finish()
    }
}

/// Document-level listeners of one dispatcher. Dropping this removes them.
#[derive(Debug)]
pub struct GlobalListeners {
    _guards: [ListenerGuard<InputEvent>; 3],
}

/// Deliver a document-level event to the listeners registered for its kind.
///
/// Events without a document-level listener kind are ignored.
pub fn dispatch_document_event(document: &DocumentListeners<InputEvent>, event: &InputEvent) {
    if let Some(kind) = event.kind.listener_kind() {
        document.dispatch(kind, event);
    }
}

/// Gesture dispatcher for one node.
pub struct Touch {
    host: Arc<dyn GestureHost>,
    config: Arc<GestureConfigStore>,
    props: TouchProps,

    /// The node that received the press. `Some` while tracking.
    target: Option<NodeId>,
    /// Target rect captured at `touchstart`, for synthesizing leave/enter.
    target_bounds: Option<Rect>,
    target_had_focus: bool,
    pointer_inside: bool,
    click_allow: ClickAllow,

    drag: Drag,
    flick: Flick,
    hold: Hold,
    pinch: Pinch,
}

impl Touch {
    /// Create a dispatcher.
    ///
    /// `config` supplies the defaults every gesture snapshots when it begins.
    /// Hold and Flick schedule their timers on `timers`.
    pub fn new(
        host: Arc<dyn GestureHost>,
        config: Arc<GestureConfigStore>,
        timers: Arc<SharedTimerManager>,
        props: TouchProps,
    ) -> Self {
        Self {
            host,
            config,
            props,
            target: None,
            target_bounds: None,
            target_had_focus: false,
            pointer_inside: false,
            click_allow: ClickAllow::new(),
            drag: Drag::new(),
            flick: Flick::new(Arc::clone(&timers)),
            hold: Hold::new(timers),
            pinch: Pinch::new(),
        }
    }

    /// Whether a press is being tracked.
    pub fn is_active(&self) -> bool {
        self.target.is_some()
    }

    /// The node that received the tracked press.
    pub fn target(&self) -> Option<NodeId> {
        self.target
    }

    pub fn props(&self) -> &TouchProps {
        &self.props
    }

    /// Route an event delivered to this dispatcher's node.
    pub fn handle_event(&mut self, event: &InputEvent) {
        match event.kind {
            InputKind::MouseDown => self.handle_mouse_down(event),
            InputKind::MouseMove => self.handle_mouse_move(event),
            InputKind::MouseUp => self.handle_mouse_up(event),
            InputKind::MouseEnter => self.handle_mouse_enter(event),
            InputKind::MouseLeave => self.handle_mouse_leave(event),
            InputKind::Click => self.handle_click(event),
            InputKind::TouchStart => self.handle_touch_start(event),
            InputKind::TouchMove => self.handle_touch_move(event),
            InputKind::TouchEnd => self.handle_touch_end(event),
            InputKind::Focus => self.handle_focus(event),
            InputKind::Blur => self.handle_blur(event),
        }
    }

    pub fn handle_mouse_down(&mut self, event: &InputEvent) {
        if !self.click_allow.should_allow_mouse_event(event) {
            tracing::trace!(target: targets::TOUCH, "mousedown after touchend suppressed");
            return;
        }
        self.handle_down(event);
    }

    pub fn handle_mouse_move(&mut self, event: &InputEvent) {
        if self.props.disabled
            || !self.is_active()
            || !self.click_allow.should_allow_mouse_event(event)
        {
            return;
        }
        if let Some(coords) = event.coords() {
            self.move_gesture(coords);
        }
    }

    pub fn handle_mouse_up(&mut self, event: &InputEvent) {
        self.click_allow.set_last_mouse_up(event);
        if !self.click_allow.should_allow_mouse_event(event) {
            return;
        }

        let inside = self
            .target
            .is_some_and(|target| self.host.contains(target, event.target));
        self.handle_up(event, inside);
    }

    pub fn handle_mouse_enter(&mut self, _event: &InputEvent) {
        self.pointer_inside = true;
        if !self.props.disabled && self.is_active() {
            self.enter_gesture();
        }
    }

    pub fn handle_mouse_leave(&mut self, _event: &InputEvent) {
        self.pointer_inside = false;
        if !self.props.disabled && self.is_active() {
            self.leave_gesture();
        }
    }

    /// A `click` becomes a tap unless a `mouseup` already produced one.
    pub fn handle_click(&mut self, event: &InputEvent) {
        if self.props.disabled || !self.click_allow.should_allow_tap(event) {
            return;
        }
        let mut tap = PointerEvent::from_input(PointerEventType::Tap, event);
        if let Some(on_tap) = &self.props.on_tap {
            tracing::trace!(target: targets::TOUCH, "tap from click");
            on_tap(&mut tap);
        }
    }

    pub fn handle_touch_start(&mut self, event: &InputEvent) {
        if self.props.disabled {
            return;
        }

        // A second finger joins a tracked press.
        if self.is_active() {
            if let Some(GestureCoords::Pair(pair)) = event.coords() {
                if !self.pinch.is_pinching() {
                    let config = self.gesture_config();
                    let node = match self.target {
                        Some(target) => HostNode::resolve(self.host.as_ref(), target),
                        None => None,
                    };
                    self.pinch.begin(
                        &config.pinch,
                        &self.props.pinch,
                        pair,
                        node.as_ref().map(|node| node as &dyn GestureNode),
                    );
                }
            }
            return;
        }

        self.target_bounds = self.host.bounding_rect(event.current_target);
        self.handle_down(event);
    }

    pub fn handle_touch_move(&mut self, event: &InputEvent) {
        if self.props.disabled || !self.is_active() {
            return;
        }

        if let (Some(bounds), Some(touch)) = (self.target_bounds, event.changed_touches.first()) {
            let inside = bounds.contains(touch.page);
            if inside != self.pointer_inside {
                self.pointer_inside = inside;
                if inside {
                    self.enter_gesture();
                } else {
                    self.leave_gesture();
                }
            }
        }

        if let Some(coords) = event.coords() {
            self.move_gesture(coords);
        }
    }

    pub fn handle_touch_end(&mut self, event: &InputEvent) {
        self.click_allow.set_last_touch_end(event);

        // Fingers still down: only the pinch is over.
        if !event.touches.is_empty() {
            self.pinch.end();
            return;
        }

        let inside = match (self.target_bounds, event.changed_touches.first()) {
            (Some(bounds), Some(touch)) => bounds.contains(touch.page),
            _ => true,
        };
        self.handle_up(event, inside);
    }

    pub fn handle_focus(&mut self, event: &InputEvent) {
        if self.target == Some(event.target) {
            self.target_had_focus = true;
        }
    }

    /// Losing focus that the target had at press time blurs the gestures.
    pub fn handle_blur(&mut self, _event: &InputEvent) {
        if self.props.disabled || !self.is_active() || !self.target_had_focus {
            return;
        }
        tracing::debug!(target: targets::TOUCH, "target blurred during gesture");
        self.blur_gesture();
    }

    /// A `mouseup` or `touchend` anywhere in the document.
    ///
    /// A `touchend` that leaves fingers down does not end the press.
    pub fn handle_global_up(&mut self, event: &InputEvent) {
        self.click_allow.set_last_touch_end(event);
        self.click_allow.set_last_mouse_up(event);

        if event.kind == InputKind::TouchEnd && !event.touches.is_empty() {
            return;
        }

        if self.is_active() {
            tracing::debug!(target: targets::TOUCH, kind = event.kind.as_str(), "released outside target");
            self.end_gesture();
            self.deactivate();
        }
    }

    /// A `mousemove` anywhere in the document.
    ///
    /// Only used while the pointer is outside the node; inside, the node's
    /// own `mousemove` drives the gestures.
    pub fn handle_global_move(&mut self, event: &InputEvent) {
        if !self.is_active() || self.pointer_inside {
            return;
        }
        if let Some(coords) = event.coords() {
            self.move_gesture(coords);
        }
    }

    /// Route an expired timer to the detector that owns it.
    ///
    /// Returns `false` if no detector of this dispatcher owns `id`.
    pub fn handle_timer(&mut self, id: TimerId) -> bool {
        self.hold.handle_timer(id) || self.flick.handle_timer(id)
    }

    /// Replace the props.
    ///
    /// Running gestures pick up the new callbacks and configuration overrides
    /// without restarting. Overrides equal to the current ones are not
    /// re-applied. Becoming disabled calls [`disable`](Self::disable).
    pub fn update_props(&mut self, props: TouchProps) {
        let becomes_disabled = !self.props.disabled && props.disabled;
        let previous = self.props.overrides();
        self.props = props;

        self.drag.update_callbacks(&self.props.drag);
        self.flick.update_callbacks(&self.props.flick);
        self.hold.update_callbacks(&self.props.hold);
        self.pinch.update_callbacks(&self.props.pinch);

        let overrides = self.props.overrides();
        if !overrides.is_empty() && overrides != previous {
            self.update_gesture_config(&overrides);
        }

        if becomes_disabled {
            self.disable();
        }
    }

    /// Apply a configuration change to the running gestures.
    pub fn update_gesture_config(&mut self, update: &PartialGestureConfig) {
        if let Some(drag) = &update.drag {
            self.drag.update_config(drag);
        }
        if let Some(flick) = &update.flick {
            self.flick.update_config(flick);
        }
        if let Some(hold) = &update.hold {
            self.hold.update_config(hold);
        }
        if let Some(pinch) = &update.pinch {
            self.pinch.update_config(pinch);
        }
    }

    /// Stop tracking the press and end any hold.
    ///
    /// Drags, flicks and pinches are left to finish on release.
    pub fn disable(&mut self) {
        tracing::debug!(target: targets::TOUCH, "dispatcher disabled");
        self.deactivate();
        self.hold.end();
    }

    /// Drop all gesture state and timers without firing callbacks.
    pub fn dispose(&mut self) {
        self.pinch.cancel();
        self.hold.cancel();
        self.flick.cancel();
        self.drag.cancel();
        self.deactivate();
        self.pointer_inside = false;
    }

    /// Register the document-level `mouseup`, `touchend` and `mousemove`
    /// listeners for `touch`. They are removed when the returned value drops.
    pub fn install_global_listeners(
        touch: &Arc<Mutex<Touch>>,
        document: &Arc<DocumentListeners<InputEvent>>,
    ) -> GlobalListeners {
        let up = |touch: Weak<Mutex<Touch>>| {
            move |event: &InputEvent| {
                if let Some(touch) = touch.upgrade() {
                    touch.lock().handle_global_up(event);
                }
            }
        };
        let moved = Arc::downgrade(touch);

        GlobalListeners {
            _guards: [
                DocumentListeners::add_scoped(document, ListenerKind::MouseUp, up(Arc::downgrade(touch))),
                DocumentListeners::add_scoped(document, ListenerKind::TouchEnd, up(Arc::downgrade(touch))),
                DocumentListeners::add_scoped(document, ListenerKind::MouseMove, move |event| {
                    if let Some(touch) = moved.upgrade() {
                        touch.lock().handle_global_move(event);
                    }
                }),
            ],
        }
    }

    fn handle_down(&mut self, event: &InputEvent) {
        if self.props.disabled {
            return;
        }

        let mut down = PointerEvent::from_input(PointerEventType::Down, event);
        if let Some(on_down) = &self.props.on_down {
            on_down(&mut down);
        }
        if down.default_prevented() {
            tracing::trace!(target: targets::TOUCH, "down prevented");
            return;
        }

        self.activate(event);
        self.start_gesture(event);
    }

    fn handle_up(&mut self, event: &InputEvent, inside: bool) {
        self.end_gesture();

        if !self.props.disabled && self.is_active() && inside {
            let mut up = PointerEvent::from_input(PointerEventType::Up, event);
            if let Some(on_up) = &self.props.on_up {
                on_up(&mut up);
            }
            if !up.default_prevented() {
                let mut tap = PointerEvent::from_input(PointerEventType::Tap, event);
                if let Some(on_tap) = &self.props.on_tap {
                    on_tap(&mut tap);
                }
            }
        }

        self.deactivate();
    }

    fn activate(&mut self, event: &InputEvent) {
        let target = event.current_target;
        self.target = Some(target);
        self.target_had_focus = self.host.has_focus(target);
        self.pointer_inside = true;
        tracing::trace!(target: targets::TOUCH, ?target, had_focus = self.target_had_focus, "activated");
    }

    fn deactivate(&mut self) {
        if let Some(target) = self.target.take() {
            tracing::trace!(target: targets::TOUCH, ?target, "deactivated");
        }
        self.target_bounds = None;
        self.target_had_focus = false;
    }

    /// Store defaults with this node's overrides applied.
    fn gesture_config(&self) -> GestureConfig {
        merge_config(&self.config.get_config(), &self.props.overrides())
    }

    fn start_gesture(&mut self, event: &InputEvent) {
        let Some(coords) = event.coords() else {
            return;
        };
        let config = self.gesture_config();
        let node = match self.target {
            Some(target) => HostNode::resolve(self.host.as_ref(), target),
            None => None,
        };
        let node = node.as_ref().map(|node| node as &dyn GestureNode);

        match coords {
            GestureCoords::Pair(pair) => {
                self.pinch.begin(&config.pinch, &self.props.pinch, pair, node);
            }
            GestureCoords::Single(point) => {
                let no_resume = self.props.no_resume;
                self.hold.begin(&config.hold, &self.props.hold, no_resume, point);
                self.flick.begin(&config.flick, &self.props.flick, point);
                self.drag
                    .begin(&config.drag, &self.props.drag, no_resume, point, node);
            }
        }
    }

    fn move_gesture(&mut self, coords: GestureCoords) {
        match coords {
            GestureCoords::Pair(pair) => self.pinch.move_to(pair),
            GestureCoords::Single(point) => self.move_single(point),
        }
    }

    fn move_single(&mut self, point: Point) {
        self.hold.move_to(point);
        self.flick.move_to(point);
        self.drag.move_to(point);
    }

    fn enter_gesture(&mut self) {
        self.drag.enter();
        self.hold.enter();
    }

    fn leave_gesture(&mut self) {
        self.drag.leave();
        self.hold.leave();
    }

    fn blur_gesture(&mut self) {
        self.drag.blur();
        self.hold.blur();
        self.pinch.blur();
    }

    fn end_gesture(&mut self) {
        self.pinch.end();
        self.hold.end();
        self.flick.end();
        self.drag.end();
    }
}

impl fmt::Debug for Touch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Touch")
            .field("target", &self.target)
            .field("target_had_focus", &self.target_had_focus)
            .field("pointer_inside", &self.pointer_inside)
            .field("drag", &self.drag)
            .field("flick", &self.flick)
            .field("hold", &self.hold)
            .field("pinch", &self.pinch)
            .finish_non_exhaustive()
    }
}

static_assertions::assert_impl_all!(Touch: Send);

#[cfg(test)]
mod tests {
    use horizon_gesture_core::ManualClock;

    use super::*;
    use crate::event::TouchPoint;

    const NODE: NodeId = NodeId(1);
    const CHILD: NodeId = NodeId(2);
    const OUTSIDE: NodeId = NodeId(9);

    struct TestHost;

    impl GestureHost for TestHost {
        fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
            ancestor == node || (ancestor == NODE && node == CHILD)
        }

        fn bounding_rect(&self, node: NodeId) -> Option<Rect> {
            (node == NODE).then(|| Rect::new(0.0, 0.0, 100.0, 100.0))
        }

        fn viewport(&self) -> Size {
            Size::new(800.0, 600.0)
        }

        fn has_focus(&self, node: NodeId) -> bool {
            node == NODE
        }
    }

    fn touch(props: TouchProps) -> Touch {
        let clock = Arc::new(ManualClock::new());
        Touch::new(
            Arc::new(TestHost),
            Arc::new(GestureConfigStore::new()),
            Arc::new(SharedTimerManager::with_clock(clock)),
            props,
        )
    }

    fn counter() -> (Arc<Mutex<Vec<PointerEventType>>>, TouchProps) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let (down, up, tap) = (log.clone(), log.clone(), log.clone());
        let props = TouchProps::new()
            .on_down(move |ev| down.lock().push(ev.kind))
            .on_up(move |ev| up.lock().push(ev.kind))
            .on_tap(move |ev| tap.lock().push(ev.kind));
        (log, props)
    }

    fn mouse(kind: InputKind, ts: f64, target: NodeId) -> InputEvent {
        InputEvent::mouse(kind, ts, target, 10.0, 10.0).with_current_target(NODE)
    }

    #[test]
    fn test_down_up_fires_tap() {
        let (log, props) = counter();
        let mut touch = touch(props);
        touch.handle_event(&mouse(InputKind::MouseDown, 1.0, CHILD));
        assert!(touch.is_active());
        assert_eq!(touch.target(), Some(NODE));

        touch.handle_event(&mouse(InputKind::MouseUp, 2.0, CHILD));
        assert!(!touch.is_active());
        assert_eq!(
            *log.lock(),
            vec![PointerEventType::Down, PointerEventType::Up, PointerEventType::Tap]
        );
    }

    #[test]
    fn test_click_after_mouse_up_is_not_a_second_tap() {
        let (log, props) = counter();
        let mut touch = touch(props);
        touch.handle_event(&mouse(InputKind::MouseDown, 1.0, NODE));
        touch.handle_event(&mouse(InputKind::MouseUp, 2.0, NODE));
        touch.handle_event(&mouse(InputKind::Click, 2.0, NODE));

        let taps = log
            .lock()
            .iter()
            .filter(|kind| **kind == PointerEventType::Tap)
            .count();
        assert_eq!(taps, 1);
    }

    #[test]
    fn test_keyboard_click_is_a_tap() {
        let (log, props) = counter();
        let mut touch = touch(props);
        touch.handle_event(&mouse(InputKind::Click, 5.0, NODE));
        assert_eq!(*log.lock(), vec![PointerEventType::Tap]);
    }

    #[test]
    fn test_release_outside_skips_up() {
        let (log, props) = counter();
        let mut touch = touch(props);
        touch.handle_event(&mouse(InputKind::MouseDown, 1.0, NODE));
        touch.handle_event(&mouse(InputKind::MouseUp, 2.0, OUTSIDE));
        assert_eq!(*log.lock(), vec![PointerEventType::Down]);
        assert!(!touch.is_active());
    }

    #[test]
    fn test_prevented_down_starts_nothing() {
        let started = Arc::new(Mutex::new(0));
        let sink = started.clone();
        let props = TouchProps::new()
            .on_down(|ev| ev.prevent_default())
            .on_drag_start(move |_| *sink.lock() += 1);
        let mut touch = touch(props);

        touch.handle_event(&mouse(InputKind::MouseDown, 1.0, NODE));
        assert!(!touch.is_active());
        touch.handle_event(&InputEvent::mouse(InputKind::MouseMove, 2.0, NODE, 80.0, 10.0));
        assert_eq!(*started.lock(), 0);
    }

    #[test]
    fn test_prevented_up_skips_tap() {
        let taps = Arc::new(Mutex::new(0));
        let sink = taps.clone();
        let props = TouchProps::new()
            .on_up(|ev| ev.prevent_default())
            .on_tap(move |_| *sink.lock() += 1);
        let mut touch = touch(props);
        touch.handle_event(&mouse(InputKind::MouseDown, 1.0, NODE));
        touch.handle_event(&mouse(InputKind::MouseUp, 2.0, NODE));
        assert_eq!(*taps.lock(), 0);
    }

    #[test]
    fn test_disabled_ignores_press() {
        let (log, props) = counter();
        let mut touch = touch(props.disabled(true));
        touch.handle_event(&mouse(InputKind::MouseDown, 1.0, NODE));
        touch.handle_event(&mouse(InputKind::MouseUp, 2.0, NODE));
        touch.handle_event(&mouse(InputKind::Click, 3.0, NODE));
        assert!(log.lock().is_empty());
    }

    #[test]
    fn test_mouse_after_touch_end_is_suppressed() {
        let (log, props) = counter();
        let mut touch = touch(props);
        let start = InputEvent::touch(InputKind::TouchStart, 1.0, NODE, vec![TouchPoint::new(0, 5.0, 5.0)]);
        let end = InputEvent::touch(InputKind::TouchEnd, 2.0, NODE, vec![TouchPoint::new(0, 5.0, 5.0)]);
        touch.handle_event(&start);
        touch.handle_event(&end);
        touch.handle_event(&mouse(InputKind::MouseDown, 2.0, NODE));
        touch.handle_event(&mouse(InputKind::MouseUp, 2.0, NODE));

        assert_eq!(
            *log.lock(),
            vec![PointerEventType::Down, PointerEventType::Up, PointerEventType::Tap]
        );
    }

    #[test]
    fn test_focus_tracking_and_blur() {
        let ended = Arc::new(Mutex::new(0));
        let sink = ended.clone();
        let mut touch = touch(TouchProps::new().on_drag_end(move |_| *sink.lock() += 1));

        touch.handle_event(&mouse(InputKind::MouseDown, 1.0, NODE));
        touch.handle_event(&mouse(InputKind::Blur, 2.0, NODE));
        assert_eq!(*ended.lock(), 1);
    }

    #[test]
    fn test_global_up_finishes_gesture() {
        let (log, props) = counter();
        let mut touch = touch(props);
        touch.handle_event(&mouse(InputKind::MouseDown, 1.0, NODE));
        touch.handle_global_up(&mouse(InputKind::MouseUp, 2.0, OUTSIDE));
        assert!(!touch.is_active());
        assert_eq!(*log.lock(), vec![PointerEventType::Down]);
    }

    #[test]
    fn test_timer_routing_ignores_foreign_ids() {
        let mut touch = touch(TouchProps::new());
        let timers = SharedTimerManager::new();
        let foreign = timers.start_one_shot(std::time::Duration::from_millis(1));
        assert!(!touch.handle_timer(foreign));
    }
}
