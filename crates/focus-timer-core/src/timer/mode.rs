use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Every n-th completed focus segment is followed by a long break.
pub const LONG_BREAK_INTERVAL: u64 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerMode {
    Focus,
    ShortBreak,
    LongBreak,
}

impl TimerMode {
    pub const ALL: [TimerMode; 3] = [TimerMode::Focus, TimerMode::ShortBreak, TimerMode::LongBreak];

    /// Heading shown above the clock.
    pub fn label(self) -> &'static str {
        match self {
            TimerMode::Focus => "Focus Session",
            TimerMode::ShortBreak => "Short Break",
            TimerMode::LongBreak => "Long Break",
        }
    }

    pub fn tagline(self) -> &'static str {
        match self {
            TimerMode::Focus => "Stay on task and be productive.",
            TimerMode::ShortBreak => "Relax and recharge.",
            TimerMode::LongBreak => "Step away and recharge properly.",
        }
    }
}

impl fmt::Display for TimerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TimerMode::Focus => "focus",
            TimerMode::ShortBreak => "short_break",
            TimerMode::LongBreak => "long_break",
        })
    }
}

impl FromStr for TimerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "focus" => Ok(TimerMode::Focus),
            "short" | "short_break" | "short-break" => Ok(TimerMode::ShortBreak),
            "long" | "long_break" | "long-break" => Ok(TimerMode::LongBreak),
            other => Err(format!("unknown timer mode: {other}")),
        }
    }
}

/// Mode that follows a naturally completed segment.
///
/// `completed_focus_sessions` must already include the segment that just
/// finished when `finished` is [`TimerMode::Focus`].
pub fn next_mode(finished: TimerMode, completed_focus_sessions: u64) -> TimerMode {
    match finished {
        TimerMode::Focus if completed_focus_sessions % LONG_BREAK_INTERVAL == 0 => {
            TimerMode::LongBreak
        }
        TimerMode::Focus => TimerMode::ShortBreak,
        TimerMode::ShortBreak | TimerMode::LongBreak => TimerMode::Focus,
    }
}
