//! Core services for Horizon Gesture.
//!
//! This crate provides the event-loop-adjacent pieces the gesture detectors
//! build on:
//!
//! - **Clock**: Injectable time source ([`SystemClock`], [`ManualClock`])
//! - **Timers**: One-shot and repeating timers driven by the host event loop
//! - **Geometry**: Points, sizes, rectangles and padding insets
//! - **Listeners**: Document-level listener registry for global input
//! - **Logging**: `tracing` target names for each subsystem
//!
//! # Timer Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use horizon_gesture_core::{ManualClock, SharedTimerManager};
//!
//! let clock = Arc::new(ManualClock::new());
//! let timers = Arc::new(SharedTimerManager::with_clock(clock.clone()));
//!
//! let handle = SharedTimerManager::start_repeating_handle(&timers, Duration::from_millis(200));
//! clock.advance(Duration::from_millis(200));
//!
//! assert_eq!(timers.process_expired(), vec![handle.id()]);
//!
//! // Dropping the handle stops the timer.
//! drop(handle);
//! assert_eq!(timers.active_count(), 0);
//! ```

mod clock;
mod error;
pub mod geometry;
pub mod listeners;
pub mod logging;
mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Error, Result, TimerError};
pub use geometry::{Insets, Point, Rect, Size};
pub use listeners::{DocumentListeners, ListenerGuard, ListenerId, ListenerKind};
pub use timer::{SharedTimerManager, TimerHandle, TimerId, TimerKind, TimerManager};

// Timer and listener services are shared across dispatcher instances.
static_assertions::assert_impl_all!(SharedTimerManager: Send, Sync);
static_assertions::assert_impl_all!(ManualClock: Send, Sync);
