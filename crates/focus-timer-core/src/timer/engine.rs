//! Timer engine implementation.
//!
//! The engine is a second-granular state machine. It owns no thread or clock:
//! a tick source calls `tick()` once per elapsed second while it is running.
//!
//! ## State Transitions
//!
//! ```text
//! (Focus, Idle) <-> (Focus, Running) --tick@0--> (ShortBreak | LongBreak, Idle)
//! (ShortBreak | LongBreak, Running) --tick@0--> (Focus, Idle)
//! select_mode / update_config / reset --> (mode, Idle)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(TimerConfiguration::default());
//! engine.start();
//! // Once per second:
//! engine.tick(); // Returns Some(Event::SessionCompleted) when the segment ends
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::config::{ConfigStore, ConfigUpdate, TimerConfiguration};
use super::mode::{next_mode, TimerMode};
use super::view::{format_clock, TimerSnapshot};
use crate::error::TimerError;
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub mode: TimerMode,
    pub remaining_seconds: u32,
    pub is_running: bool,
    pub completed_focus_sessions: u64,
}

/// Core timer engine.
#[derive(Debug, Clone)]
pub struct TimerEngine {
    config: ConfigStore,
    state: TimerState,
}

impl TimerEngine {
    /// Create an idle engine at the start of a focus segment.
    pub fn new(config: TimerConfiguration) -> Self {
        let config = ConfigStore::new(config);
        let remaining_seconds = config.duration_for(TimerMode::Focus);
        Self {
            config,
            state: TimerState {
                mode: TimerMode::Focus,
                remaining_seconds,
                is_running: false,
                completed_focus_sessions: 0,
            },
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn mode(&self) -> TimerMode {
        self.state.mode
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.state.remaining_seconds
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running
    }

    pub fn completed_focus_sessions(&self) -> u64 {
        self.state.completed_focus_sessions
    }

    pub fn config(&self) -> TimerConfiguration {
        self.config.current()
    }

    /// Configured length of the current segment.
    pub fn total_seconds(&self) -> u32 {
        self.config.duration_for(self.state.mode)
    }

    /// 0.0 .. 1.0 progress within the current segment.
    pub fn progress(&self) -> f64 {
        let total = self.total_seconds();
        if total == 0 {
            return 0.0;
        }
        1.0 - (f64::from(self.state.remaining_seconds) / f64::from(total))
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            mode: self.state.mode,
            remaining_seconds: self.state.remaining_seconds,
            display: format_clock(self.state.remaining_seconds),
            is_running: self.state.is_running,
            completed_focus_sessions: self.state.completed_focus_sessions,
            total_seconds: self.total_seconds(),
            progress_pct: (self.progress() * 100.0).clamp(0.0, 100.0),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Returns `None` when already running or nothing is left to count down.
    pub fn start(&mut self) -> Option<Event> {
        if self.state.is_running || self.state.remaining_seconds == 0 {
            return None;
        }
        self.state.is_running = true;
        debug!(mode = %self.state.mode, remaining = self.state.remaining_seconds, "timer started");
        Some(Event::TimerStarted {
            mode: self.state.mode,
            remaining_seconds: self.state.remaining_seconds,
            at: Utc::now(),
        })
    }

    /// Idempotent. Returns `None` when the timer was already idle.
    pub fn pause(&mut self) -> Option<Event> {
        if !self.state.is_running {
            return None;
        }
        self.state.is_running = false;
        debug!(mode = %self.state.mode, remaining = self.state.remaining_seconds, "timer paused");
        Some(Event::TimerPaused {
            mode: self.state.mode,
            remaining_seconds: self.state.remaining_seconds,
            at: Utc::now(),
        })
    }

    /// Start when idle, pause when running.
    pub fn toggle(&mut self) -> Option<Event> {
        if self.state.is_running {
            self.pause()
        } else {
            self.start()
        }
    }

    /// Rewind the current segment. The session counter is untouched.
    pub fn reset(&mut self) -> Event {
        self.state.is_running = false;
        self.state.remaining_seconds = self.total_seconds();
        debug!(mode = %self.state.mode, "timer reset");
        Event::TimerReset {
            mode: self.state.mode,
            remaining_seconds: self.state.remaining_seconds,
            at: Utc::now(),
        }
    }

    /// Advance by exactly one second.
    ///
    /// Returns `Some(Event::SessionCompleted)` when this tick finished the segment.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.state.is_running {
            return None;
        }
        if self.state.remaining_seconds > 1 {
            self.state.remaining_seconds -= 1;
            return None;
        }
        Some(self.complete())
    }

    /// Switch to `target`, discarding any in-progress countdown.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::InterruptionNotConfirmed`] when the timer is running
    /// and `interruption_confirmed` is false. State is left untouched.
    pub fn select_mode(
        &mut self,
        target: TimerMode,
        interruption_confirmed: bool,
    ) -> Result<Event, TimerError> {
        if self.state.is_running && !interruption_confirmed {
            return Err(TimerError::InterruptionNotConfirmed { target });
        }
        let from = self.state.mode;
        let discarded_seconds = self.state.remaining_seconds;
        self.state.mode = target;
        self.state.is_running = false;
        self.state.remaining_seconds = self.config.duration_for(target);
        debug!(%from, to = %target, discarded_seconds, "mode selected");
        Ok(Event::ModeSelected {
            from,
            to: target,
            discarded_seconds,
            at: Utc::now(),
        })
    }

    /// Store a clamped configuration and restart the current segment idle.
    pub fn update_config(&mut self, update: ConfigUpdate) -> Event {
        let config = self.config.update(update);
        self.state.is_running = false;
        self.state.remaining_seconds = config.duration_for(self.state.mode);
        debug!(?config, "configuration updated");
        Event::ConfigUpdated {
            config,
            at: Utc::now(),
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn complete(&mut self) -> Event {
        let finished = self.state.mode;
        if finished == TimerMode::Focus {
            self.state.completed_focus_sessions += 1;
        }
        let next = next_mode(finished, self.state.completed_focus_sessions);
        self.state.mode = next;
        self.state.remaining_seconds = self.config.duration_for(next);
        self.state.is_running = false;
        info!(
            %finished,
            %next,
            completed_focus_sessions = self.state.completed_focus_sessions,
            "segment completed"
        );
        Event::SessionCompleted {
            finished,
            next,
            completed_focus_sessions: self.state.completed_focus_sessions,
            at: Utc::now(),
        }
    }
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new(TimerConfiguration::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn engine() -> TimerEngine {
        TimerEngine::new(TimerConfiguration::new(1500, 300, 900))
    }

    /// Start and tick until the current segment completes.
    fn run_segment(engine: &mut TimerEngine) -> Event {
        engine.start().expect("segment should start");
        loop {
            if let Some(event) = engine.tick() {
                return event;
            }
        }
    }

    #[test]
    fn initial_state() {
        let engine = engine();
        assert_eq!(
            engine.state(),
            TimerState {
                mode: TimerMode::Focus,
                remaining_seconds: 1500,
                is_running: false,
                completed_focus_sessions: 0,
            }
        );
    }

    #[test]
    fn start_pause_toggle() {
        let mut engine = engine();
        assert!(engine.start().is_some());
        assert!(engine.is_running());
        assert!(engine.start().is_none());

        assert!(engine.pause().is_some());
        assert!(!engine.is_running());
        assert!(engine.pause().is_none());

        assert!(matches!(engine.toggle(), Some(Event::TimerStarted { .. })));
        assert!(matches!(engine.toggle(), Some(Event::TimerPaused { .. })));
    }

    #[test]
    fn tick_is_noop_while_idle() {
        let mut engine = engine();
        assert!(engine.tick().is_none());
        assert_eq!(engine.remaining_seconds(), 1500);
    }

    #[test]
    fn focus_completion_moves_to_short_break() {
        let mut engine = engine();
        engine.start();
        let mut completed = None;
        for _ in 0..1500 {
            if let Some(event) = engine.tick() {
                assert!(completed.is_none(), "completed twice");
                completed = Some(event);
            }
        }
        assert_eq!(completed.and_then(|e| e.session_completed()), Some(TimerMode::Focus));
        assert_eq!(
            engine.state(),
            TimerState {
                mode: TimerMode::ShortBreak,
                remaining_seconds: 300,
                is_running: false,
                completed_focus_sessions: 1,
            }
        );
    }

    #[test]
    fn fourth_focus_earns_long_break() {
        let mut engine = engine();
        for round in 1..=4 {
            run_segment(&mut engine);
            if round < 4 {
                assert_eq!(engine.mode(), TimerMode::ShortBreak);
                run_segment(&mut engine);
                assert_eq!(engine.mode(), TimerMode::Focus);
            }
        }
        assert_eq!(engine.mode(), TimerMode::LongBreak);
        assert_eq!(engine.remaining_seconds(), 900);
        assert_eq!(engine.completed_focus_sessions(), 4);

        let event = run_segment(&mut engine);
        assert_eq!(event.session_completed(), Some(TimerMode::LongBreak));
        assert_eq!(engine.mode(), TimerMode::Focus);
        assert_eq!(engine.completed_focus_sessions(), 4);
    }

    #[test]
    fn select_mode_requires_confirmation_while_running() {
        let mut engine = engine();
        engine.start();
        for _ in 0..100 {
            engine.tick();
        }
        let before = engine.state();

        let err = engine.select_mode(TimerMode::ShortBreak, false).unwrap_err();
        assert_eq!(err, TimerError::InterruptionNotConfirmed { target: TimerMode::ShortBreak });
        assert_eq!(engine.state(), before);

        let event = engine.select_mode(TimerMode::ShortBreak, true).unwrap();
        assert!(matches!(
            event,
            Event::ModeSelected { from: TimerMode::Focus, to: TimerMode::ShortBreak, discarded_seconds: 1400, .. }
        ));
        assert_eq!(engine.mode(), TimerMode::ShortBreak);
        assert_eq!(engine.remaining_seconds(), 300);
        assert!(!engine.is_running());
        assert_eq!(engine.completed_focus_sessions(), 0);
    }

    #[test]
    fn select_mode_while_idle_needs_no_confirmation() {
        let mut engine = engine();
        assert!(engine.select_mode(TimerMode::LongBreak, false).is_ok());
        assert_eq!(engine.remaining_seconds(), 900);
    }

    #[test]
    fn update_config_restarts_current_segment() {
        let mut engine = engine();
        engine.select_mode(TimerMode::ShortBreak, false).unwrap();
        engine.start();
        engine.tick();

        let event = engine.update_config(ConfigUpdate::new(0, -5, 30));
        assert!(matches!(event, Event::ConfigUpdated { .. }));
        assert_eq!(engine.config(), TimerConfiguration::new(60, 60, 60));
        assert_eq!(engine.mode(), TimerMode::ShortBreak);
        assert_eq!(engine.remaining_seconds(), 60);
        assert!(!engine.is_running());
    }

    #[test]
    fn snapshot_reflects_state() {
        let mut engine = engine();
        engine.start();
        for _ in 0..75 {
            engine.tick();
        }
        let snap = engine.snapshot();
        assert_eq!(snap.display, "23:45");
        assert_eq!(snap.total_seconds, 1500);
        assert!(snap.is_running);
        assert!((snap.progress_pct - 5.0).abs() < 1e-9);
    }

    #[derive(Debug, Clone, Copy)]
    enum Op {
        Start,
        Pause,
        Reset,
        Tick(u16),
        Select(TimerMode, bool),
        Update(i64, i64, i64),
    }

    fn op() -> impl Strategy<Value = Op> {
        let mode = prop_oneof![
            Just(TimerMode::Focus),
            Just(TimerMode::ShortBreak),
            Just(TimerMode::LongBreak)
        ];
        prop_oneof![
            Just(Op::Start),
            Just(Op::Pause),
            Just(Op::Reset),
            (1u16..400).prop_map(Op::Tick),
            (mode, any::<bool>()).prop_map(|(m, c)| Op::Select(m, c)),
            (-100i64..400, -100i64..400, -100i64..400).prop_map(|(f, s, l)| Op::Update(f, s, l)),
        ]
    }

    fn apply(engine: &mut TimerEngine, op: Op) {
        match op {
            Op::Start => {
                engine.start();
            }
            Op::Pause => {
                engine.pause();
            }
            Op::Reset => {
                engine.reset();
            }
            Op::Tick(n) => {
                for _ in 0..n {
                    engine.tick();
                }
            }
            Op::Select(mode, confirmed) => {
                let _ = engine.select_mode(mode, confirmed);
            }
            Op::Update(f, s, l) => {
                engine.update_config(ConfigUpdate::new(f, s, l));
            }
        }
    }

    proptest! {
        #[test]
        fn focus_ticks_end_exactly_at_completion(f in 60u32..3000, s in 60u32..3000, l in 60u32..3000) {
            let mut engine = TimerEngine::new(TimerConfiguration::new(f, s, l));
            engine.start();
            for i in 1..f {
                prop_assert!(engine.tick().is_none(), "completed early at tick {}", i);
            }
            let event = engine.tick();
            prop_assert_eq!(event.and_then(|e| e.session_completed()), Some(TimerMode::Focus));
            prop_assert_eq!(engine.remaining_seconds(), s);
            prop_assert!(!engine.is_running());
        }

        #[test]
        fn cadence_over_completions(n in 1u64..13) {
            let mut engine = TimerEngine::new(TimerConfiguration::new(60, 60, 60));
            for _ in 0..n {
                if engine.mode() != TimerMode::Focus {
                    run_segment(&mut engine);
                }
                run_segment(&mut engine);
            }
            prop_assert_eq!(engine.completed_focus_sessions(), n);
            let expected = if n % 4 == 0 { TimerMode::LongBreak } else { TimerMode::ShortBreak };
            prop_assert_eq!(engine.mode(), expected);
        }

        #[test]
        fn invariants_hold_for_any_command_sequence(ops in prop::collection::vec(op(), 0..60)) {
            let mut engine = engine();
            let mut sessions = 0;
            for op in ops {
                let before = engine.completed_focus_sessions();
                apply(&mut engine, op);
                let state = engine.state();
                prop_assert!(state.remaining_seconds <= engine.total_seconds());
                prop_assert!(state.remaining_seconds > 0 || !state.is_running);
                prop_assert!(state.completed_focus_sessions >= sessions);
                if matches!(op, Op::Reset | Op::Select(..) | Op::Update(..)) {
                    prop_assert_eq!(state.completed_focus_sessions, before);
                }
                sessions = state.completed_focus_sessions;
            }
        }
    }
}
