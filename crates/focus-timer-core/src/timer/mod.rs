mod config;
mod engine;
mod mode;
mod view;

pub use config::{
    clamp_seconds, coerce_seconds, ConfigStore, ConfigUpdate, TimerConfiguration,
    MIN_DURATION_SECS,
};
pub use engine::{TimerEngine, TimerState};
pub use mode::{next_mode, TimerMode, LONG_BREAK_INTERVAL};
pub use view::{format_clock, FlipDiff, TimerSnapshot};
