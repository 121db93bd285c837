//! Document-level listener registry.
//!
//! A gesture that starts on a node may be released or dragged outside of it.
//! Node-level handlers never see those events, so each dispatcher also listens
//! at the document level for `mouseup`, `touchend` and `mousemove`. The host
//! forwards every document-level event to [`DocumentListeners::dispatch`].
//!
//! Listeners are installed when a gesture-aware node becomes live and must be
//! removed when it is torn down; a leaked listener keeps feeding events into a
//! dispatcher that no longer exists. [`ListenerGuard`] removes its listener on
//! drop.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use horizon_gesture_core::{DocumentListeners, ListenerKind};
//!
//! let document = Arc::new(DocumentListeners::<u32>::new());
//! let hits = Arc::new(AtomicUsize::new(0));
//!
//! let counter = hits.clone();
//! let guard = DocumentListeners::add_scoped(&document, ListenerKind::MouseUp, move |_| {
//!     counter.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! document.dispatch(ListenerKind::MouseUp, &7);
//! document.dispatch(ListenerKind::MouseMove, &7);
//! assert_eq!(hits.load(Ordering::SeqCst), 1);
//!
//! drop(guard);
//! document.dispatch(ListenerKind::MouseUp, &7);
//! assert_eq!(hits.load(Ordering::SeqCst), 1);
//! ```

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a document-level listener.
    pub struct ListenerId;
}

/// The document-level events a dispatcher can listen for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    /// A mouse button was released anywhere in the document.
    MouseUp,
    /// A touch point was lifted anywhere in the document.
    TouchEnd,
    /// The mouse moved anywhere in the document.
    MouseMove,
}

type Handler<E> = Arc<dyn Fn(&E) + Send + Sync>;

struct Listener<E> {
    kind: ListenerKind,
    handler: Handler<E>,
}

/// Registry of document-level input listeners.
pub struct DocumentListeners<E> {
    listeners: Mutex<SlotMap<ListenerId, Listener<E>>>,
}

impl<E> Default for DocumentListeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> DocumentListeners<E> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            listeners: Mutex::new(SlotMap::with_key()),
        }
    }

    /// Register a handler for one kind of document-level event.
    pub fn add<F>(&self, kind: ListenerKind, handler: F) -> ListenerId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = self.listeners.lock().insert(Listener {
            kind,
            handler: Arc::new(handler),
        });
        tracing::trace!(target: targets::LISTENERS, ?id, ?kind, "listener added");
        id
    }

    /// Register a handler that is removed when the returned guard drops.
    pub fn add_scoped<F>(this: &Arc<Self>, kind: ListenerKind, handler: F) -> ListenerGuard<E>
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        ListenerGuard {
            id: this.add(kind, handler),
            document: Arc::clone(this),
        }
    }

    /// Remove a listener.
    ///
    /// Returns `true` if the listener was found and removed.
    pub fn remove(&self, id: ListenerId) -> bool {
        let removed = self.listeners.lock().remove(id).is_some();
        if removed {
            tracing::trace!(target: targets::LISTENERS, ?id, "listener removed");
        }
        removed
    }

    /// Number of installed listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    /// Deliver a document-level event to every listener of `kind`.
    ///
    /// Handlers run after the registry lock is released, so a handler may
    /// add or remove listeners.
    pub fn dispatch(&self, kind: ListenerKind, event: &E) {
        let handlers: Vec<Handler<E>> = self
            .listeners
            .lock()
            .values()
            .filter(|listener| listener.kind == kind)
            .map(|listener| Arc::clone(&listener.handler))
            .collect();

        for handler in handlers {
            handler(event);
        }
    }
}

impl<E> fmt::Debug for DocumentListeners<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentListeners")
            .field("listener_count", &self.listener_count())
            .finish()
    }
}

/// Removes its document-level listener when dropped.
pub struct ListenerGuard<E> {
    id: ListenerId,
    document: Arc<DocumentListeners<E>>,
}

impl<E> ListenerGuard<E> {
    /// The ID of the guarded listener.
    pub fn id(&self) -> ListenerId {
        self.id
    }
}

impl<E> fmt::Debug for ListenerGuard<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ListenerGuard").field(&self.id).finish()
    }
}

impl<E> Drop for ListenerGuard<E> {
    fn drop(&mut self) {
        self.document.remove(self.id);
    }
}
