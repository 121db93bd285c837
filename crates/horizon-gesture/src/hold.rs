//! Hold gesture detection.
//!
//! A hold polls on a repeating timer. Each tick measures how long the pointer
//! has been down and fires every configured hold event whose `time` has been
//! reached, earliest first. Once the first event fires the hold is
//! *pulsing*: every later tick fires `onHoldPulse`, and ending the hold fires
//! `onHoldEnd`.
//!
//! Leaving the node (or straying past `moveTolerance` with `cancelOnMove`)
//! suspends the poll when resuming is allowed and ends the hold otherwise.
//! Suspension does not stop the hold clock.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use horizon_gesture_core::logging::targets;
use horizon_gesture_core::{Point, SharedTimerManager, TimerHandle, TimerId};

use crate::config::{HoldConfig, HoldEventDef, PartialHoldConfig};
use crate::event::{Callback, HoldEndEvent, HoldEvent, HoldPulseEvent, emit};

/// Callbacks for hold gestures.
#[derive(Clone, Default)]
pub struct HoldCallbacks {
    pub on_hold: Option<Callback<HoldEvent>>,
    pub on_hold_pulse: Option<Callback<HoldPulseEvent>>,
    pub on_hold_end: Option<Callback<HoldEndEvent>>,
}

impl HoldCallbacks {
    pub fn is_empty(&self) -> bool {
        self.on_hold.is_none() && self.on_hold_pulse.is_none() && self.on_hold_end.is_none()
    }
}

impl std::fmt::Debug for HoldCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HoldCallbacks")
            .field("on_hold", &self.on_hold.is_some())
            .field("on_hold_pulse", &self.on_hold_pulse.is_some())
            .field("on_hold_end", &self.on_hold_end.is_some())
            .finish()
    }
}

#[derive(Debug)]
struct HoldSession {
    config: HoldConfig,
    callbacks: HoldCallbacks,
    resume: bool,
    start: Point,
    hold_start: Instant,
    /// Events not yet fired, ascending by time.
    pending: VecDeque<HoldEventDef>,
    fired: Vec<HoldEventDef>,
    pulsing: bool,
    /// The poll timer. `None` while suspended.
    job: Option<TimerHandle>,
}

impl HoldSession {
    fn hold_time(&self, now: Instant) -> f64 {
        now.saturating_duration_since(self.hold_start).as_secs_f64() * 1000.0
    }
}

#[derive(Debug, Default)]
enum HoldState {
    #[default]
    Idle,
    Holding(HoldSession),
}

/// Hold detector.
#[derive(Debug)]
pub struct Hold {
    timers: Arc<SharedTimerManager>,
    state: HoldState,
}

impl Hold {
    /// Create a detector whose poll timer runs on `timers`.
    pub fn new(timers: Arc<SharedTimerManager>) -> Self {
        Self {
            timers,
            state: HoldState::Idle,
        }
    }

    pub fn is_holding(&self) -> bool {
        matches!(self.state, HoldState::Holding(_))
    }

    /// Whether the hold is alive but its poll is paused.
    pub fn is_suspended(&self) -> bool {
        matches!(&self.state, HoldState::Holding(session) if session.job.is_none())
    }

    /// Start a hold at `coord`.
    ///
    /// Does nothing without hold callbacks or without configured events.
    pub fn begin(
        &mut self,
        config: &HoldConfig,
        callbacks: &HoldCallbacks,
        no_resume: bool,
        coord: Point,
    ) {
        if callbacks.is_empty() {
            return;
        }

        let mut config = config.clone();
        config.sort_events();
        let pending: VecDeque<_> = config.events.iter().cloned().collect();
        if pending.is_empty() {
            return;
        }

        let job = SharedTimerManager::start_repeating_handle(&self.timers, config.frequency());
        tracing::trace!(
            target: targets::HOLD,
            ?coord,
            events = pending.len(),
            frequency = config.frequency,
            "hold begin"
        );
        self.state = HoldState::Holding(HoldSession {
            config,
            callbacks: callbacks.clone(),
            resume: !no_resume,
            start: coord,
            hold_start: self.timers.now(),
            pending,
            fired: Vec::new(),
            pulsing: false,
            job: Some(job),
        });
    }

    /// One poll: fire every reached event, then pulse.
    pub fn handle_pulse(&mut self) {
        let now = self.timers.now();
        let HoldState::Holding(session) = &mut self.state else {
            return;
        };

        let hold_time = session.hold_time(now);
        while session
            .pending
            .front()
            .is_some_and(|next| next.time as f64 <= hold_time)
        {
            let Some(next) = session.pending.pop_front() else {
                break;
            };
            tracing::debug!(target: targets::HOLD, name = %next.name, hold_time, "hold event");
            session.pulsing = true;
            session.fired.push(next.clone());
            emit(
                &session.callbacks.on_hold,
                &HoldEvent {
                    name: next.name,
                    time: next.time,
                    hold_time,
                },
            );
        }

        if session.pulsing {
            emit(&session.callbacks.on_hold_pulse, &HoldPulseEvent { hold_time });
        }
    }

    /// Route an expired timer. Returns `true` if it was this detector's poll.
    pub fn handle_timer(&mut self, id: TimerId) -> bool {
        let HoldState::Holding(session) = &self.state else {
            return false;
        };
        if session.job.as_ref().map(TimerHandle::id) != Some(id) {
            return false;
        }
        self.handle_pulse();
        true
    }

    /// Check the pointer against `moveTolerance` when `cancelOnMove` is set.
    pub fn move_to(&mut self, coord: Point) {
        let HoldState::Holding(session) = &self.state else {
            return;
        };
        if !session.config.cancel_on_move {
            return;
        }

        let strayed = session.start.distance(coord) >= session.config.move_tolerance;
        match (strayed, session.resume) {
            (true, true) => self.suspend(),
            (true, false) => self.end(),
            (false, true) => self.resume(),
            (false, false) => {}
        }
    }

    /// Pointer re-entered the node.
    pub fn enter(&mut self) {
        if matches!(&self.state, HoldState::Holding(session) if session.resume) {
            self.resume();
        }
    }

    /// Pointer left the node.
    pub fn leave(&mut self) {
        let HoldState::Holding(session) = &self.state else {
            return;
        };
        if session.resume {
            self.suspend();
        } else {
            self.end();
        }
    }

    pub fn blur(&mut self) {
        self.end();
    }

    /// Finish the hold, firing `onHoldEnd` if any hold event was reached.
    pub fn end(&mut self) {
        let HoldState::Holding(session) = std::mem::take(&mut self.state) else {
            return;
        };

        let hold_time = session.hold_time(self.timers.now());
        tracing::debug!(target: targets::HOLD, hold_time, pulsing = session.pulsing, "hold ended");
        if session.pulsing {
            emit(&session.callbacks.on_hold_end, &HoldEndEvent { hold_time });
        }
    }

    /// Drop the hold and its timer without firing.
    pub fn cancel(&mut self) {
        self.state = HoldState::Idle;
    }

    pub fn update_callbacks(&mut self, callbacks: &HoldCallbacks) {
        if let HoldState::Holding(session) = &mut self.state {
            session.callbacks = callbacks.clone();
        }
    }

    /// Apply a configuration change to a running hold.
    ///
    /// Already-fired events stay consumed; every other event stays pending,
    /// including ones already due but not yet polled. A changed `frequency`
    /// restarts the poll unless the hold is suspended.
    pub fn update_config(&mut self, update: &PartialHoldConfig) {
        let HoldState::Holding(session) = &mut self.state else {
            return;
        };

        let frequency = session.config.frequency;
        update.apply_to(&mut session.config);
        if update.events.is_some() {
            session.pending = session
                .config
                .events
                .iter()
                .filter(|event| !session.fired.contains(event))
                .cloned()
                .collect();
        }
        if session.config.frequency != frequency && session.job.is_some() {
            session.job = Some(SharedTimerManager::start_repeating_handle(
                &self.timers,
                session.config.frequency(),
            ));
        }
    }

    fn suspend(&mut self) {
        if let HoldState::Holding(session) = &mut self.state {
            if session.job.take().is_some() {
                tracing::trace!(target: targets::HOLD, "hold suspended");
            }
        }
    }

    fn resume(&mut self) {
        if let HoldState::Holding(session) = &mut self.state {
            if session.job.is_none() {
                tracing::trace!(target: targets::HOLD, "hold resumed");
                session.job = Some(SharedTimerManager::start_repeating_handle(
                    &self.timers,
                    session.config.frequency(),
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use horizon_gesture_core::ManualClock;
    use parking_lot::Mutex;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Fired {
        Hold(String),
        Pulse,
        End,
    }

    struct Fixture {
        clock: Arc<ManualClock>,
        timers: Arc<SharedTimerManager>,
        hold: Hold,
        fired: Arc<Mutex<Vec<Fired>>>,
        callbacks: HoldCallbacks,
    }

    impl Fixture {
        fn new() -> Self {
            let clock = Arc::new(ManualClock::new());
            let timers = Arc::new(SharedTimerManager::with_clock(clock.clone()));
            let fired = Arc::new(Mutex::new(Vec::new()));

            let (a, b, c) = (fired.clone(), fired.clone(), fired.clone());
            let callbacks = HoldCallbacks {
                on_hold: Some(Arc::new(move |ev: &HoldEvent| {
                    a.lock().push(Fired::Hold(ev.name.clone()))
                })),
                on_hold_pulse: Some(Arc::new(move |_: &HoldPulseEvent| b.lock().push(Fired::Pulse))),
                on_hold_end: Some(Arc::new(move |_: &HoldEndEvent| c.lock().push(Fired::End))),
            };

            Self {
                hold: Hold::new(timers.clone()),
                clock,
                timers,
                fired,
                callbacks,
            }
        }

        fn advance(&mut self, ms: u64) {
            self.clock.advance_ms(ms);
            for id in self.timers.process_expired() {
                self.hold.handle_timer(id);
            }
        }

        fn fired(&self) -> Vec<Fired> {
            self.fired.lock().clone()
        }
    }

    fn config(frequency: u64, events: &[(&str, u64)]) -> HoldConfig {
        HoldConfig {
            frequency,
            events: events
                .iter()
                .map(|(name, time)| HoldEventDef::new(*name, *time))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_begin_without_callbacks_or_events_is_noop() {
        let mut fx = Fixture::new();
        fx.hold
            .begin(&HoldConfig::default(), &HoldCallbacks::default(), false, Point::ZERO);
        assert!(!fx.hold.is_holding());

        let callbacks = fx.callbacks.clone();
        fx.hold.begin(&config(5, &[]), &callbacks, false, Point::ZERO);
        assert!(!fx.hold.is_holding());
        assert_eq!(fx.timers.active_count(), 0);
    }

    #[test]
    fn test_events_fire_in_time_order() {
        let mut fx = Fixture::new();
        let callbacks = fx.callbacks.clone();
        fx.hold
            .begin(&config(5, &[("b", 20), ("a", 10)]), &callbacks, false, Point::ZERO);

        fx.advance(5);
        assert!(fx.fired().is_empty());

        fx.advance(5);
        assert_eq!(fx.fired(), vec![Fired::Hold("a".into()), Fired::Pulse]);

        fx.advance(5);
        fx.advance(5);
        assert_eq!(
            fx.fired(),
            vec![
                Fired::Hold("a".into()),
                Fired::Pulse,
                Fired::Pulse,
                Fired::Hold("b".into()),
                Fired::Pulse,
            ]
        );
    }

    #[test]
    fn test_crossed_thresholds_drain_in_one_tick() {
        let mut fx = Fixture::new();
        let callbacks = fx.callbacks.clone();
        fx.hold
            .begin(&config(200, &[("b", 20), ("a", 10)]), &callbacks, false, Point::ZERO);

        fx.advance(200);
        assert_eq!(
            fx.fired(),
            vec![Fired::Hold("a".into()), Fired::Hold("b".into()), Fired::Pulse]
        );
    }

    #[test]
    fn test_end_fires_only_when_pulsing() {
        let mut fx = Fixture::new();
        let callbacks = fx.callbacks.clone();
        fx.hold.begin(&HoldConfig::default(), &callbacks, false, Point::ZERO);
        fx.hold.end();
        assert!(fx.fired().is_empty());
        assert_eq!(fx.timers.active_count(), 0);

        fx.hold.begin(&HoldConfig::default(), &callbacks, false, Point::ZERO);
        fx.advance(200);
        fx.hold.end();
        fx.hold.end();
        assert_eq!(
            fx.fired(),
            vec![Fired::Hold("hold".into()), Fired::Pulse, Fired::End]
        );
    }

    #[test]
    fn test_leave_suspends_and_enter_resumes() {
        let mut fx = Fixture::new();
        let callbacks = fx.callbacks.clone();
        fx.hold
            .begin(&config(10, &[("a", 30)]), &callbacks, false, Point::ZERO);

        fx.hold.leave();
        assert!(fx.hold.is_suspended());
        fx.advance(50);
        assert!(fx.fired().is_empty());

        fx.hold.enter();
        assert!(!fx.hold.is_suspended());
        fx.advance(10);
        // The hold clock kept running while suspended.
        assert_eq!(fx.fired(), vec![Fired::Hold("a".into()), Fired::Pulse]);
    }

    #[test]
    fn test_leave_without_resume_ends() {
        let mut fx = Fixture::new();
        let callbacks = fx.callbacks.clone();
        fx.hold.begin(&HoldConfig::default(), &callbacks, true, Point::ZERO);
        fx.hold.leave();
        assert!(!fx.hold.is_holding());
    }

    #[test]
    fn test_cancel_on_move() {
        let mut fx = Fixture::new();
        let callbacks = fx.callbacks.clone();
        let config = HoldConfig {
            cancel_on_move: true,
            ..HoldConfig::default()
        };

        fx.hold.begin(&config, &callbacks, false, Point::ZERO);
        fx.hold.move_to(Point::new(10.0, 0.0));
        assert!(!fx.hold.is_suspended());
        fx.hold.move_to(Point::new(16.0, 0.0));
        assert!(fx.hold.is_suspended());
        fx.hold.move_to(Point::new(4.0, 0.0));
        assert!(!fx.hold.is_suspended());

        fx.hold.end();
        fx.hold.begin(&config, &callbacks, true, Point::ZERO);
        fx.hold.move_to(Point::new(0.0, 20.0));
        assert!(!fx.hold.is_holding());
    }

    #[test]
    fn test_move_is_ignored_without_cancel_on_move() {
        let mut fx = Fixture::new();
        let callbacks = fx.callbacks.clone();
        fx.hold.begin(&HoldConfig::default(), &callbacks, true, Point::ZERO);
        fx.hold.move_to(Point::new(500.0, 500.0));
        assert!(fx.hold.is_holding());
        assert!(!fx.hold.is_suspended());
    }

    #[test]
    fn test_cancel_is_silent() {
        let mut fx = Fixture::new();
        let callbacks = fx.callbacks.clone();
        fx.hold.begin(&HoldConfig::default(), &callbacks, false, Point::ZERO);
        fx.advance(200);
        fx.hold.cancel();
        assert_eq!(fx.timers.active_count(), 0);
        assert!(!fx.fired().contains(&Fired::End));
    }

    #[test]
    fn test_update_config_replaces_pending_events() {
        let mut fx = Fixture::new();
        let callbacks = fx.callbacks.clone();
        fx.hold
            .begin(&config(10, &[("a", 10)]), &callbacks, false, Point::ZERO);
        fx.advance(10);

        fx.hold.update_config(&PartialHoldConfig {
            events: Some(vec![HoldEventDef::new("late", 30), HoldEventDef::new("early", 5)]),
            ..Default::default()
        });
        fx.advance(10);
        fx.advance(10);

        let holds: Vec<_> = fx
            .fired()
            .into_iter()
            .filter(|fired| matches!(fired, Fired::Hold(_)))
            .collect();
        assert_eq!(
            holds,
            vec![
                Fired::Hold("a".into()),
                Fired::Hold("early".into()),
                Fired::Hold("late".into())
            ]
        );
    }

    #[test]
    fn test_unchanged_config_keeps_due_events() {
        let mut fx = Fixture::new();
        let callbacks = fx.callbacks.clone();
        let events = vec![HoldEventDef::new("a", 100)];
        fx.hold.begin(&config(200, &[("a", 100)]), &callbacks, false, Point::ZERO);

        let same = PartialHoldConfig {
            frequency: Some(200),
            events: Some(events),
            ..Default::default()
        };
        for _ in 0..3 {
            fx.advance(150);
            fx.hold.update_config(&same);
        }

        assert_eq!(fx.fired().first(), Some(&Fired::Hold("a".into())));
    }

    #[test]
    fn test_frequency_change_restarts_poll() {
        let mut fx = Fixture::new();
        let callbacks = fx.callbacks.clone();
        fx.hold.begin(&config(200, &[("a", 10)]), &callbacks, false, Point::ZERO);

        fx.hold.update_config(&PartialHoldConfig {
            frequency: Some(20),
            ..Default::default()
        });
        assert_eq!(fx.timers.active_count(), 1);
        fx.advance(20);
        assert_eq!(fx.fired(), vec![Fired::Hold("a".into()), Fired::Pulse]);
    }
}
