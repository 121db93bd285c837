//! Timer system for gesture detectors.
//!
//! Provides one-shot and repeating timers that are driven by the host event
//! loop. The host asks [`SharedTimerManager::time_until_next`] how long it may
//! sleep, then calls [`SharedTimerManager::process_expired`] and routes each
//! returned [`TimerId`] to the dispatcher that owns it.
//!
//! Detectors own their timers through a [`TimerHandle`], which stops the timer
//! when dropped. Resetting a detector's state therefore cancels any pending
//! pulse or deadline.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::clock::{Clock, SystemClock};
use crate::error::{Result, TimerError};
use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a timer.
    pub struct TimerId;
}

/// The type of timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Fires once after the specified duration.
    OneShot,
    /// Fires repeatedly at the specified interval.
    Repeating,
}

/// Internal timer data.
#[derive(Debug)]
struct TimerData {
    /// When this timer should next fire.
    next_fire: Instant,
    /// The interval for repeating timers.
    interval: Duration,
    /// The kind of timer.
    kind: TimerKind,
}

/// An entry in the timer queue (min-heap by fire time).
#[derive(Debug, Clone, Copy)]
struct TimerQueueEntry {
    id: TimerId,
    fire_time: Instant,
}

impl PartialEq for TimerQueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.fire_time == other.fire_time
    }
}

impl Eq for TimerQueueEntry {}

impl PartialOrd for TimerQueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimerQueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap (BinaryHeap is max-heap by default).
        other.fire_time.cmp(&self.fire_time)
    }
}

/// Manages all gesture timers for one application.
pub struct TimerManager {
    /// Time source for deadlines.
    clock: Arc<dyn Clock>,
    /// All registered timers.
    timers: SlotMap<TimerId, TimerData>,
    /// Priority queue of pending timer fires (min-heap by fire time).
    queue: BinaryHeap<TimerQueueEntry>,
}

impl TimerManager {
    /// Create a timer manager using the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a timer manager reading time from `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            timers: SlotMap::with_key(),
            queue: BinaryHeap::new(),
        }
    }

    /// The current time according to this manager's clock.
    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    fn start(&mut self, interval: Duration, kind: TimerKind) -> TimerId {
        let next_fire = self.clock.now() + interval;
        let id = self.timers.insert(TimerData {
            next_fire,
            interval,
            kind,
        });
        self.queue.push(TimerQueueEntry {
            id,
            fire_time: next_fire,
        });
        tracing::trace!(target: targets::TIMER, ?id, ?kind, ?interval, "timer started");
        id
    }

    /// Start a one-shot timer that fires after the specified duration.
    ///
    /// Returns the timer ID that can be used to cancel the timer.
    pub fn start_one_shot(&mut self, duration: Duration) -> TimerId {
        self.start(duration, TimerKind::OneShot)
    }

    /// Start a repeating timer that fires at the specified interval.
    ///
    /// The first fire occurs after `interval` duration.
    pub fn start_repeating(&mut self, interval: Duration) -> TimerId {
        self.start(interval, TimerKind::Repeating)
    }

    /// Stop and remove a timer.
    pub fn stop(&mut self, id: TimerId) -> Result<()> {
        if self.timers.remove(id).is_some() {
            tracing::trace!(target: targets::TIMER, ?id, "timer stopped");
            Ok(())
        } else {
            Err(TimerError::InvalidTimerId.into())
        }
    }

    /// Check if a timer is currently active.
    pub fn is_active(&self, id: TimerId) -> bool {
        self.timers.contains_key(id)
    }

    /// Get the duration until the next timer fires, if any.
    ///
    /// Returns `None` if there are no active timers.
    pub fn time_until_next(&mut self) -> Option<Duration> {
        // Drop stopped timers from the front of the queue.
        while let Some(entry) = self.queue.peek() {
            if self.timers.contains_key(entry.id) {
                break;
            }
            self.queue.pop();
        }

        let now = self.clock.now();
        self.queue
            .peek()
            .map(|entry| entry.fire_time.saturating_duration_since(now))
    }

    /// Process all timers that should fire now.
    ///
    /// Returns the IDs of the timers that fired, in deadline order. A
    /// repeating timer fires at most once per call.
    #[tracing::instrument(skip(self), target = "horizon_gesture_core::timer", level = "trace")]
    pub fn process_expired(&mut self) -> Vec<TimerId> {
        let now = self.clock.now();
        let mut fired = Vec::new();
        let mut rescheduled = Vec::new();

        while let Some(entry) = self.queue.peek().copied() {
            if entry.fire_time > now {
                break;
            }
            self.queue.pop();

            let id = entry.id;
            let Some(timer) = self.timers.get_mut(id) else {
                continue;
            };
            // A stale queue entry left behind by a stop/restart.
            if timer.next_fire != entry.fire_time {
                continue;
            }

            tracing::trace!(target: targets::TIMER, ?id, "timer fired");
            fired.push(id);

            match timer.kind {
                TimerKind::OneShot => {
                    self.timers.remove(id);
                }
                TimerKind::Repeating => {
                    timer.next_fire = now + timer.interval;
                    rescheduled.push(TimerQueueEntry {
                        id,
                        fire_time: timer.next_fire,
                    });
                }
            }
        }

        self.queue.extend(rescheduled);
        fired
    }

    /// Get the number of active timers.
    pub fn active_count(&self) -> usize {
        self.timers.len()
    }
}

impl Default for TimerManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TimerManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerManager")
            .field("timers", &self.timers)
            .field("queued", &self.queue.len())
            .finish_non_exhaustive()
    }
}

/// A thread-safe wrapper around `TimerManager`, shared by every dispatcher of
/// one application.
#[derive(Debug, Default)]
pub struct SharedTimerManager {
    inner: Mutex<TimerManager>,
}

impl SharedTimerManager {
    /// Create a shared manager using the system clock.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(TimerManager::new()),
        }
    }

    /// Create a shared manager reading time from `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Mutex::new(TimerManager::with_clock(clock)),
        }
    }

    pub fn now(&self) -> Instant {
        self.inner.lock().now()
    }

    pub fn start_one_shot(&self, duration: Duration) -> TimerId {
        self.inner.lock().start_one_shot(duration)
    }

    pub fn start_repeating(&self, interval: Duration) -> TimerId {
        self.inner.lock().start_repeating(interval)
    }

    /// Start a one-shot timer owned by the returned handle.
    pub fn start_one_shot_handle(this: &Arc<Self>, duration: Duration) -> TimerHandle {
        TimerHandle {
            id: this.start_one_shot(duration),
            timers: Arc::clone(this),
        }
    }

    /// Start a repeating timer owned by the returned handle.
    pub fn start_repeating_handle(this: &Arc<Self>, interval: Duration) -> TimerHandle {
        TimerHandle {
            id: this.start_repeating(interval),
            timers: Arc::clone(this),
        }
    }

    pub fn stop(&self, id: TimerId) -> Result<()> {
        self.inner.lock().stop(id)
    }

    pub fn is_active(&self, id: TimerId) -> bool {
        self.inner.lock().is_active(id)
    }

    pub fn time_until_next(&self) -> Option<Duration> {
        self.inner.lock().time_until_next()
    }

    pub fn process_expired(&self) -> Vec<TimerId> {
        self.inner.lock().process_expired()
    }

    pub fn active_count(&self) -> usize {
        self.inner.lock().active_count()
    }
}

/// Owner of a single timer. The timer is stopped when the handle is dropped.
pub struct TimerHandle {
    id: TimerId,
    timers: Arc<SharedTimerManager>,
}

impl TimerHandle {
    /// The ID reported by `process_expired` when this timer fires.
    pub fn id(&self) -> TimerId {
        self.id
    }

    /// Check if the underlying timer is still scheduled.
    ///
    /// One-shot timers become inactive after firing.
    pub fn is_active(&self) -> bool {
        self.timers.is_active(self.id)
    }
}

impl fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TimerHandle").field(&self.id).finish()
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        // Already gone if a one-shot timer fired.
        let _ = self.timers.stop(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::Error;

    fn manager() -> (Arc<ManualClock>, Arc<SharedTimerManager>) {
        let clock = Arc::new(ManualClock::new());
        let timers = Arc::new(SharedTimerManager::with_clock(clock.clone()));
        (clock, timers)
    }

    #[test]
    fn test_one_shot_fires_once() {
        let (clock, timers) = manager();
        let id = timers.start_one_shot(Duration::from_millis(100));

        clock.advance_ms(99);
        assert!(timers.process_expired().is_empty());

        clock.advance_ms(1);
        assert_eq!(timers.process_expired(), vec![id]);
        assert!(!timers.is_active(id));

        clock.advance_ms(500);
        assert!(timers.process_expired().is_empty());
    }

    #[test]
    fn test_repeating_reschedules() {
        let (clock, timers) = manager();
        let id = timers.start_repeating(Duration::from_millis(50));

        for _ in 0..3 {
            clock.advance_ms(50);
            assert_eq!(timers.process_expired(), vec![id]);
        }
        assert!(timers.is_active(id));
    }

    #[test]
    fn test_zero_interval_fires_once_per_call() {
        let (_clock, timers) = manager();
        let id = timers.start_repeating(Duration::ZERO);
        assert_eq!(timers.process_expired(), vec![id]);
        assert_eq!(timers.process_expired(), vec![id]);
    }

    #[test]
    fn test_stop_prevents_firing() {
        let (clock, timers) = manager();
        let id = timers.start_one_shot(Duration::from_millis(10));
        assert!(timers.stop(id).is_ok());
        assert!(matches!(
            timers.stop(id),
            Err(Error::Timer(TimerError::InvalidTimerId))
        ));

        clock.advance_ms(20);
        assert!(timers.process_expired().is_empty());
        assert_eq!(timers.time_until_next(), None);
    }

    #[test]
    fn test_time_until_next() {
        let (clock, timers) = manager();
        timers.start_one_shot(Duration::from_millis(300));
        timers.start_one_shot(Duration::from_millis(100));

        assert_eq!(timers.time_until_next(), Some(Duration::from_millis(100)));
        clock.advance_ms(150);
        assert_eq!(timers.time_until_next(), Some(Duration::ZERO));
    }

    #[test]
    fn test_handle_drop_stops_timer() {
        let (clock, timers) = manager();
        let handle = SharedTimerManager::start_repeating_handle(&timers, Duration::from_millis(10));
        assert!(handle.is_active());
        assert_eq!(timers.active_count(), 1);

        drop(handle);
        assert_eq!(timers.active_count(), 0);
        clock.advance_ms(10);
        assert!(timers.process_expired().is_empty());
    }

    #[test]
    fn test_handle_drop_after_one_shot_fired() {
        let (clock, timers) = manager();
        let handle = SharedTimerManager::start_one_shot_handle(&timers, Duration::from_millis(10));
        clock.advance_ms(10);
        assert_eq!(timers.process_expired(), vec![handle.id()]);
        assert!(!handle.is_active());
        drop(handle);
        assert_eq!(timers.active_count(), 0);
    }
}
