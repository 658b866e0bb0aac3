use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{TimerConfiguration, TimerMode};

/// Every engine state change produces an Event.
/// The presentation layer renders them; the audio cue listens for completions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        mode: TimerMode,
        remaining_seconds: u32,
        at: DateTime<Utc>,
    },
    TimerPaused {
        mode: TimerMode,
        remaining_seconds: u32,
        at: DateTime<Utc>,
    },
    TimerReset {
        mode: TimerMode,
        remaining_seconds: u32,
        at: DateTime<Utc>,
    },
    /// Manual mode switch. `discarded_seconds` is the countdown that was thrown away.
    ModeSelected {
        from: TimerMode,
        to: TimerMode,
        discarded_seconds: u32,
        at: DateTime<Utc>,
    },
    ConfigUpdated {
        config: TimerConfiguration,
        at: DateTime<Utc>,
    },
    /// A running segment reached zero on its own.
    SessionCompleted {
        finished: TimerMode,
        next: TimerMode,
        completed_focus_sessions: u64,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// The mode that just finished, if this is a natural completion.
    pub fn session_completed(&self) -> Option<TimerMode> {
        match self {
            Event::SessionCompleted { finished, .. } => Some(*finished),
            _ => None,
        }
    }

    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Event::TimerStarted { at, .. }
            | Event::TimerPaused { at, .. }
            | Event::TimerReset { at, .. }
            | Event::ModeSelected { at, .. }
            | Event::ConfigUpdated { at, .. }
            | Event::SessionCompleted { at, .. } => *at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let event = Event::SessionCompleted {
            finished: TimerMode::Focus,
            next: TimerMode::ShortBreak,
            completed_focus_sessions: 1,
            at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "SessionCompleted");
        assert_eq!(json["finished"], "focus");
        assert_eq!(json["next"], "short_break");
        assert_eq!(event.session_completed(), Some(TimerMode::Focus));
    }

    #[test]
    fn only_completions_report_finished_mode() {
        let event = Event::TimerReset {
            mode: TimerMode::Focus,
            remaining_seconds: 60,
            at: Utc::now(),
        };
        assert_eq!(event.session_completed(), None);
    }
}
