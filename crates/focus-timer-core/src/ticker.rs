//! Shared, serialized access to one [`TimerEngine`] plus its interval tick source.
//!
//! Every mutating call takes the same mutex, so a tick can never interleave
//! with a mode switch. Each run of the interval task carries the epoch it was
//! started under; any call that stops the timer bumps the epoch while holding
//! the lock, which makes later ticks from that run no-ops even if the task has
//! not observed its abort yet.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, warn};

use crate::error::TimerError;
use crate::events::Event;
use crate::timer::{ConfigUpdate, TimerConfiguration, TimerEngine, TimerMode, TimerSnapshot, TimerState};

pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(1);

const EVENT_CHANNEL_CAPACITY: usize = 64;

struct Core {
    engine: TimerEngine,
    epoch: u64,
    ticker: Option<JoinHandle<()>>,
}

struct Inner {
    core: Mutex<Core>,
    /// `None` for timers driven only by external `tick()` calls.
    period: Option<Duration>,
    snapshots: watch::Sender<TimerSnapshot>,
    events: broadcast::Sender<Event>,
}

/// Cloneable handle to a serialized timer.
#[derive(Clone)]
pub struct SharedTimer {
    inner: Arc<Inner>,
}

impl SharedTimer {
    pub fn new(config: TimerConfiguration) -> Self {
        Self::with_period(config, DEFAULT_TICK_PERIOD)
    }

    /// Use a custom tick period. Each tick still counts as one second.
    pub fn with_period(config: TimerConfiguration, period: Duration) -> Self {
        Self::build(config, Some(period))
    }

    /// A timer with no interval task; the caller drives it through [`SharedTimer::tick`].
    pub fn manual(config: TimerConfiguration) -> Self {
        Self::build(config, None)
    }

    fn build(config: TimerConfiguration, period: Option<Duration>) -> Self {
        let engine = TimerEngine::new(config);
        let (snapshots, _) = watch::channel(engine.snapshot());
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                core: Mutex::new(Core {
                    engine,
                    epoch: 0,
                    ticker: None,
                }),
                period,
                snapshots,
                events,
            }),
        }
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe_snapshots(&self) -> watch::Receiver<TimerSnapshot> {
        self.inner.snapshots.subscribe()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<Event> {
        self.inner.events.subscribe()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn snapshot(&self) -> TimerSnapshot {
        self.lock().engine.snapshot()
    }

    pub fn state(&self) -> TimerState {
        self.lock().engine.state()
    }

    pub fn config(&self) -> TimerConfiguration {
        self.lock().engine.config()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start the engine and subscribe a fresh interval task.
    ///
    /// Manual timers, and timers started outside a tokio runtime, spawn no
    /// task; ticks must then be driven through [`SharedTimer::tick`].
    pub fn start(&self) -> Option<Event> {
        let mut core = self.lock();
        self.start_locked(&mut core)
    }

    pub fn pause(&self) -> Option<Event> {
        let mut core = self.lock();
        self.pause_locked(&mut core)
    }

    /// Start when idle, pause when running, decided under one lock.
    pub fn toggle(&self) -> Option<Event> {
        let mut core = self.lock();
        if core.engine.is_running() {
            self.pause_locked(&mut core)
        } else {
            self.start_locked(&mut core)
        }
    }

    pub fn reset(&self) -> Event {
        let mut core = self.lock();
        Self::halt(&mut core);
        let event = core.engine.reset();
        self.publish(&core, Some(&event));
        event
    }

    /// # Errors
    ///
    /// Propagates [`TimerError::InterruptionNotConfirmed`]; the running
    /// countdown and its tick source are left untouched in that case.
    pub fn select_mode(
        &self,
        target: TimerMode,
        interruption_confirmed: bool,
    ) -> Result<Event, TimerError> {
        let mut core = self.lock();
        let event = core.engine.select_mode(target, interruption_confirmed)?;
        Self::halt(&mut core);
        self.publish(&core, Some(&event));
        Ok(event)
    }

    pub fn update_config(&self, update: ConfigUpdate) -> Event {
        let mut core = self.lock();
        Self::halt(&mut core);
        let event = core.engine.update_config(update);
        self.publish(&core, Some(&event));
        event
    }

    /// Apply one tick from an external source.
    ///
    /// Ignored while the interval task owns the countdown, so no second is
    /// applied twice.
    pub fn tick(&self) -> Option<Event> {
        let mut core = self.lock();
        if core.ticker.is_some() {
            debug!("ignoring external tick while the interval task runs");
            return None;
        }
        let event = core.engine.tick();
        if event.is_some() {
            Self::halt(&mut core);
        }
        self.publish(&core, event.as_ref());
        event
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn start_locked(&self, core: &mut Core) -> Option<Event> {
        let event = core.engine.start()?;
        let epoch = Self::halt(core);
        if let Some(period) = self.inner.period {
            match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    let weak = Arc::downgrade(&self.inner);
                    core.ticker = Some(handle.spawn(run_ticker(weak, epoch, period)));
                }
                Err(_) => warn!("no tokio runtime; timer started without a tick source"),
            }
        }
        self.publish(core, Some(&event));
        Some(event)
    }

    fn pause_locked(&self, core: &mut Core) -> Option<Event> {
        Self::halt(core);
        let event = core.engine.pause();
        self.publish(core, event.as_ref());
        event
    }

    fn lock(&self) -> MutexGuard<'_, Core> {
        // Engine commands are total, so a poisoned guard still holds a consistent engine.
        self.inner.core.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Invalidate the current tick subscription. Returns the new epoch.
    fn halt(core: &mut Core) -> u64 {
        core.epoch += 1;
        if let Some(handle) = core.ticker.take() {
            handle.abort();
        }
        core.epoch
    }

    /// Apply a tick from the interval task started under `epoch`.
    /// Returns false once that task should stop.
    fn tick_from(&self, epoch: u64) -> bool {
        let mut core = self.lock();
        if core.epoch != epoch || !core.engine.is_running() {
            debug!(epoch, current = core.epoch, "dropping stale tick");
            return false;
        }
        let event = core.engine.tick();
        if event.is_some() {
            // Detach rather than abort: this is the task itself.
            core.epoch += 1;
            core.ticker = None;
        }
        self.publish(&core, event.as_ref());
        event.is_none()
    }

    fn publish(&self, core: &Core, event: Option<&Event>) {
        self.inner.snapshots.send_replace(core.engine.snapshot());
        if let Some(event) = event {
            // No subscribers is fine.
            let _ = self.inner.events.send(event.clone());
        }
    }
}

async fn run_ticker(inner: Weak<Inner>, epoch: u64, period: Duration) {
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        interval.tick().await;
        let Some(inner) = inner.upgrade() else {
            break;
        };
        if !(SharedTimer { inner }).tick_from(epoch) {
            break;
        }
    }
}
