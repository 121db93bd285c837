//! Input and gesture event types.
//!
//! [`InputEvent`] is the raw, DOM-shaped pointer event the host feeds into a
//! [`Touch`](crate::Touch) dispatcher. The remaining types are the semantic
//! events delivered to consumer callbacks.

use std::sync::Arc;

use horizon_gesture_core::{ListenerKind, Point};

/// Identifies a node in the host's element tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

/// The raw input event types understood by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKind {
    MouseDown,
    MouseMove,
    MouseUp,
    MouseEnter,
    MouseLeave,
    Click,
    TouchStart,
    TouchMove,
    TouchEnd,
    Focus,
    Blur,
}

impl InputKind {
    /// The DOM event type name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MouseDown => "mousedown",
            Self::MouseMove => "mousemove",
            Self::MouseUp => "mouseup",
            Self::MouseEnter => "mouseenter",
            Self::MouseLeave => "mouseleave",
            Self::Click => "click",
            Self::TouchStart => "touchstart",
            Self::TouchMove => "touchmove",
            Self::TouchEnd => "touchend",
            Self::Focus => "focus",
            Self::Blur => "blur",
        }
    }

    /// Whether the type name starts with `mouse`.
    pub fn is_mouse(self) -> bool {
        self.as_str().starts_with("mouse")
    }

    /// Whether this is one of the touch event types.
    pub fn is_touch(self) -> bool {
        matches!(self, Self::TouchStart | Self::TouchMove | Self::TouchEnd)
    }

    /// The document-level listener this event is delivered to, if any.
    pub fn listener_kind(self) -> Option<ListenerKind> {
        match self {
            Self::MouseUp => Some(ListenerKind::MouseUp),
            Self::TouchEnd => Some(ListenerKind::TouchEnd),
            Self::MouseMove => Some(ListenerKind::MouseMove),
            _ => None,
        }
    }
}

/// One contact point of a touch event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    /// Platform identifier of the contact.
    pub identifier: u64,
    /// Position in viewport coordinates.
    pub client: Point,
    /// Position in document coordinates.
    pub page: Point,
}

impl TouchPoint {
    /// A contact whose page and client positions coincide.
    pub fn new(identifier: u64, x: f32, y: f32) -> Self {
        let position = Point::new(x, y);
        Self {
            identifier,
            client: position,
            page: position,
        }
    }
}

/// Gesture coordinates derived from an input event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureCoords {
    /// One pointer.
    Single(Point),
    /// The first two contacts of a multi-touch event.
    Pair([Point; 2]),
}

/// A raw pointer, touch, click or focus event from the host.
#[derive(Debug, Clone, PartialEq)]
pub struct InputEvent {
    /// The event type.
    pub kind: InputKind,
    /// Event timestamp in milliseconds.
    pub time_stamp: f64,
    /// The node the event originated from.
    pub target: NodeId,
    /// The node whose handler is processing the event.
    pub current_target: NodeId,
    /// Pointer position in viewport coordinates (mouse events).
    pub client: Point,
    /// Pointer position in document coordinates (mouse events).
    pub page: Point,
    /// Contacts currently on the surface (touch events).
    pub touches: Vec<TouchPoint>,
    /// Contacts that changed in this event (touch events).
    pub changed_touches: Vec<TouchPoint>,
}

impl InputEvent {
    /// Create a mouse, click or focus event delivered to `target` itself.
    pub fn mouse(kind: InputKind, time_stamp: f64, target: NodeId, x: f32, y: f32) -> Self {
        let position = Point::new(x, y);
        Self {
            kind,
            time_stamp,
            target,
            current_target: target,
            client: position,
            page: position,
            touches: Vec::new(),
            changed_touches: Vec::new(),
        }
    }

    /// Create a touch event where every listed contact changed.
    ///
    /// For `TouchEnd`, pass the lifted contacts; the remaining-contacts list
    /// starts empty and can be set with [`with_touches`](Self::with_touches).
    pub fn touch(kind: InputKind, time_stamp: f64, target: NodeId, points: Vec<TouchPoint>) -> Self {
        let primary = points.first().copied();
        let touches = if kind == InputKind::TouchEnd {
            Vec::new()
        } else {
            points.clone()
        };
        Self {
            kind,
            time_stamp,
            target,
            current_target: target,
            client: primary.map_or(Point::ZERO, |p| p.client),
            page: primary.map_or(Point::ZERO, |p| p.page),
            touches,
            changed_touches: points,
        }
    }

    /// Set the node whose handler processes the event.
    pub fn with_current_target(mut self, current_target: NodeId) -> Self {
        self.current_target = current_target;
        self
    }

    /// Set the document-space position.
    pub fn with_page(mut self, x: f32, y: f32) -> Self {
        self.page = Point::new(x, y);
        self
    }

    /// Replace the list of contacts still on the surface.
    pub fn with_touches(mut self, touches: Vec<TouchPoint>) -> Self {
        self.touches = touches;
        self
    }

    /// The first changed contact of a touch event.
    pub fn primary_touch(&self) -> Option<&TouchPoint> {
        self.changed_touches.first().or_else(|| self.touches.first())
    }

    /// Viewport and document position of the primary pointer.
    pub fn primary_position(&self) -> (Point, Point) {
        if self.kind.is_touch() {
            if let Some(touch) = self.primary_touch() {
                return (touch.client, touch.page);
            }
        }
        (self.client, self.page)
    }

    /// Normalize the event into gesture coordinates.
    ///
    /// Two or more contacts on the surface yield a [`GestureCoords::Pair`].
    /// Returns `None` for a touch event that carries no contacts.
    pub fn coords(&self) -> Option<GestureCoords> {
        if !self.kind.is_touch() {
            return Some(GestureCoords::Single(self.client));
        }
        match self.touches.as_slice() {
            [first, second, ..] => Some(GestureCoords::Pair([first.client, second.client])),
            [only] => Some(GestureCoords::Single(only.client)),
            [] => self
                .changed_touches
                .first()
                .map(|touch| GestureCoords::Single(touch.client)),
        }
    }
}

/// The semantic pointer events emitted by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEventType {
    Down,
    Up,
    Tap,
}

impl PointerEventType {
    /// The callback name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Down => "onDown",
            Self::Up => "onUp",
            Self::Tap => "onTap",
        }
    }
}

/// Payload of `onDown`, `onUp` and `onTap`.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerEventType,
    pub target: NodeId,
    pub current_target: NodeId,
    pub client: Point,
    pub page: Point,
    default_prevented: bool,
}

impl PointerEvent {
    /// Build a semantic event from the raw event that caused it.
    pub fn from_input(kind: PointerEventType, input: &InputEvent) -> Self {
        let (client, page) = input.primary_position();
        Self {
            kind,
            target: input.target,
            current_target: input.current_target,
            client,
            page,
            default_prevented: false,
        }
    }

    /// Stop the dispatcher from acting on this event.
    ///
    /// A prevented `onDown` starts no gestures; a prevented `onUp`
    /// suppresses the following `onTap`.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Whether [`prevent_default`](Self::prevent_default) was called.
    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// Drag event phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragEventType {
    DragStart,
    Drag,
    DragEnd,
}

impl DragEventType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DragStart => "onDragStart",
            Self::Drag => "onDrag",
            Self::DragEnd => "onDragEnd",
        }
    }
}

/// Payload of the drag callbacks.
///
/// `x`/`y` are relative to the container bounds. For `DragEnd` they hold the
/// last reported position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragEvent {
    pub kind: DragEventType,
    pub x: f32,
    pub y: f32,
}

/// The dominant axis of a flick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlickDirection {
    Horizontal,
    Vertical,
}

impl FlickDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Horizontal => "horizontal",
            Self::Vertical => "vertical",
        }
    }
}

/// Payload of `onFlick`. Velocities are in pixels per millisecond.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlickEvent {
    pub direction: FlickDirection,
    pub velocity_x: f32,
    pub velocity_y: f32,
    pub velocity: f32,
}

/// Payload of `onHold`: one configured hold event was reached.
#[derive(Debug, Clone, PartialEq)]
pub struct HoldEvent {
    /// Name of the configured event.
    pub name: String,
    /// Configured offset of the event, in milliseconds.
    pub time: u64,
    /// Time the pointer has been held, in milliseconds.
    pub hold_time: f64,
}

/// Payload of `onHoldPulse`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoldPulseEvent {
    pub hold_time: f64,
}

/// Payload of `onHoldEnd`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoldEndEvent {
    pub hold_time: f64,
}

/// Pinch event phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinchEventType {
    PinchStart,
    Pinch,
    PinchEnd,
}

impl PinchEventType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PinchStart => "onPinchStart",
            Self::Pinch => "onPinch",
            Self::PinchEnd => "onPinchEnd",
        }
    }
}

/// Payload of the pinch callbacks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchEvent {
    pub kind: PinchEventType,
    pub scale: Option<f32>,
    pub coords: Option<[Point; 2]>,
}

/// A shared gesture callback.
pub type Callback<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// A shared callback that may call [`PointerEvent::prevent_default`].
pub type PointerCallback = Arc<dyn Fn(&mut PointerEvent) + Send + Sync>;

/// Invoke an optional callback.
pub(crate) fn emit<E>(callback: &Option<Callback<E>>, event: &E) {
    if let Some(callback) = callback {
        callback(event);
    }
}
