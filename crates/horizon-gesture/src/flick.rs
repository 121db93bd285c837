//! Flick gesture detection.
//!
//! The detector keeps the last few pointer samples and, on release, derives
//! the peak velocity of the movement. A flick that takes longer than
//! `maxDuration` is dropped silently.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use horizon_gesture_core::logging::targets;
use horizon_gesture_core::{Point, SharedTimerManager, TimerHandle, TimerId};

use crate::config::{FlickConfig, PartialFlickConfig};
use crate::event::{Callback, FlickDirection, FlickEvent, emit};

/// Callbacks for flick gestures.
#[derive(Clone, Default)]
pub struct FlickCallbacks {
    pub on_flick: Option<Callback<FlickEvent>>,
}

impl FlickCallbacks {
    pub fn is_empty(&self) -> bool {
        self.on_flick.is_none()
    }
}

impl std::fmt::Debug for FlickCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlickCallbacks")
            .field("on_flick", &self.on_flick.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, Copy)]
struct Sample {
    position: Point,
    time: Instant,
}

#[derive(Debug)]
struct FlickSession {
    config: FlickConfig,
    callbacks: FlickCallbacks,
    samples: VecDeque<Sample>,
    cancel_job: Option<TimerHandle>,
}

impl FlickSession {
    fn record(&mut self, sample: Sample) {
        self.samples.push_back(sample);
        while self.samples.len() > self.config.max_moves.max(1) {
            self.samples.pop_front();
        }
    }

    /// Peak velocity of the buffered samples, measured against the last
    /// sample and the release time.
    fn velocity(&self, now: Instant) -> Option<(f32, f32)> {
        let last = *self.samples.back()?;
        let mut peak: Option<(f32, f32)> = None;

        for sample in self.samples.iter().take(self.samples.len() - 1) {
            let dt = now.saturating_duration_since(sample.time).as_secs_f32() * 1000.0;
            if dt <= 0.0 {
                continue;
            }
            let vx = (last.position.x - sample.position.x) / dt;
            let vy = (last.position.y - sample.position.y) / dt;

            let (px, py) = peak.get_or_insert((vx, vy));
            if vx.abs() > px.abs() {
                *px = vx;
            }
            if vy.abs() > py.abs() {
                *py = vy;
            }
        }
        peak
    }
}

#[derive(Debug, Default)]
enum FlickState {
    #[default]
    Idle,
    Tracking(FlickSession),
}

/// Flick detector.
#[derive(Debug)]
pub struct Flick {
    timers: Arc<SharedTimerManager>,
    state: FlickState,
}

impl Flick {
    /// Create a detector whose auto-cancel timer runs on `timers`.
    pub fn new(timers: Arc<SharedTimerManager>) -> Self {
        Self {
            timers,
            state: FlickState::Idle,
        }
    }

    pub fn is_tracking(&self) -> bool {
        matches!(self.state, FlickState::Tracking(_))
    }

    /// Start sampling at `coord`. Does nothing without an `onFlick` callback.
    pub fn begin(&mut self, config: &FlickConfig, callbacks: &FlickCallbacks, coord: Point) {
        if callbacks.is_empty() {
            return;
        }

        let cancel_job = config
            .max_duration()
            .map(|duration| SharedTimerManager::start_one_shot_handle(&self.timers, duration));
        let mut session = FlickSession {
            config: config.clone(),
            callbacks: callbacks.clone(),
            samples: VecDeque::with_capacity(config.max_moves.max(1) + 1),
            cancel_job,
        };
        session.record(Sample {
            position: coord,
            time: self.timers.now(),
        });

        tracing::trace!(target: targets::FLICK, ?coord, "flick begin");
        self.state = FlickState::Tracking(session);
    }

    /// Record a pointer sample.
    pub fn move_to(&mut self, coord: Point) {
        if let FlickState::Tracking(session) = &mut self.state {
            session.record(Sample {
                position: coord,
                time: self.timers.now(),
            });
        }
    }

    /// Finish sampling and fire `onFlick` if the movement was fast enough.
    pub fn end(&mut self) {
        let FlickState::Tracking(session) = std::mem::take(&mut self.state) else {
            return;
        };

        if session.samples.len() < 2 {
            return;
        }
        let Some((velocity_x, velocity_y)) = session.velocity(self.timers.now()) else {
            return;
        };

        let velocity = velocity_x.hypot(velocity_y);
        if velocity <= session.config.min_velocity {
            tracing::trace!(target: targets::FLICK, velocity, "too slow for a flick");
            return;
        }

        let direction = if velocity_y.abs() > velocity_x.abs() {
            FlickDirection::Vertical
        } else {
            FlickDirection::Horizontal
        };
        tracing::debug!(target: targets::FLICK, ?direction, velocity, "flick");
        emit(
            &session.callbacks.on_flick,
            &FlickEvent {
                direction,
                velocity_x,
                velocity_y,
                velocity,
            },
        );
    }

    /// Route an expired timer. Returns `true` if it was this detector's
    /// auto-cancel job.
    pub fn handle_timer(&mut self, id: TimerId) -> bool {
        let FlickState::Tracking(session) = &self.state else {
            return false;
        };
        if session.cancel_job.as_ref().map(TimerHandle::id) != Some(id) {
            return false;
        }

        tracing::trace!(target: targets::FLICK, "flick timed out");
        self.state = FlickState::Idle;
        true
    }

    /// Stop tracking without firing.
    pub fn cancel(&mut self) {
        self.state = FlickState::Idle;
    }

    pub fn update_callbacks(&mut self, callbacks: &FlickCallbacks) {
        if let FlickState::Tracking(session) = &mut self.state {
            session.callbacks = callbacks.clone();
        }
    }

    /// Apply a configuration change. The running auto-cancel job keeps its
    /// original deadline.
    pub fn update_config(&mut self, update: &PartialFlickConfig) {
        if let FlickState::Tracking(session) = &mut self.state {
            update.apply_to(&mut session.config);
            while session.samples.len() > session.config.max_moves.max(1) {
                session.samples.pop_front();
            }
        }
    }
}
