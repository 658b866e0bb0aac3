//! Read-only views derived from engine state.
//!
//! Nothing here feeds back into the engine. The flip diff in particular is
//! computed from two consecutive snapshots by whoever renders them.

use serde::{Deserialize, Serialize};

use super::mode::TimerMode;

/// `MM:SS`, with the minutes widening past two digits when needed.
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// State published to the presentation layer after every command or tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub mode: TimerMode,
    pub remaining_seconds: u32,
    /// `remaining_seconds` rendered as `MM:SS`.
    pub display: String,
    pub is_running: bool,
    pub completed_focus_sessions: u64,
    pub total_seconds: u32,
    /// 0.0 .. 100.0 elapsed within the current segment.
    pub progress_pct: f64,
}

impl TimerSnapshot {
    /// Clock digits without the separator.
    pub fn digits(&self) -> Vec<char> {
        self.display.chars().filter(char::is_ascii_digit).collect()
    }
}

/// Which clock digits changed between two snapshots.
///
/// Positions are aligned from the right so the seconds digits always line up,
/// even when the minutes column changes width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlipDiff {
    flips: Vec<bool>,
}

impl FlipDiff {
    pub fn between(previous: &TimerSnapshot, current: &TimerSnapshot) -> Self {
        let prev = previous.digits();
        let cur = current.digits();
        let width = prev.len().max(cur.len());
        let pad = |digits: &[char]| -> Vec<Option<char>> {
            std::iter::repeat(None)
                .take(width - digits.len())
                .chain(digits.iter().copied().map(Some))
                .collect()
        };
        let flips = pad(&prev)
            .into_iter()
            .zip(pad(&cur))
            .map(|(a, b)| a != b)
            .collect();
        Self { flips }
    }

    pub fn any(&self) -> bool {
        self.flips.iter().any(|&f| f)
    }

    /// Indices (left to right) of the digits that flipped.
    pub fn changed_positions(&self) -> Vec<usize> {
        self.flips
            .iter()
            .enumerate()
            .filter_map(|(i, &f)| f.then_some(i))
            .collect()
    }

    pub fn flips(&self) -> &[bool] {
        &self.flips
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(remaining: u32) -> TimerSnapshot {
        TimerSnapshot {
            mode: TimerMode::Focus,
            remaining_seconds: remaining,
            display: format_clock(remaining),
            is_running: true,
            completed_focus_sessions: 0,
            total_seconds: 1500,
            progress_pct: 0.0,
        }
    }

    #[test]
    fn clock_formatting() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(59), "00:59");
        assert_eq!(format_clock(1500), "25:00");
        assert_eq!(format_clock(6000), "100:00");
    }

    #[test]
    fn single_second_flips_last_digit() {
        let diff = FlipDiff::between(&snap(1499), &snap(1498));
        assert_eq!(diff.changed_positions(), vec![3]);
    }

    #[test]
    fn minute_rollover_flips_three_digits() {
        // 25:00 -> 24:59
        let diff = FlipDiff::between(&snap(1500), &snap(1499));
        assert_eq!(diff.flips(), &[false, true, true, true]);
    }

    #[test]
    fn identical_snapshots_flip_nothing() {
        assert!(!FlipDiff::between(&snap(300), &snap(300)).any());
    }

    #[test]
    fn width_change_aligns_from_right() {
        // 100:00 -> 99:59
        let diff = FlipDiff::between(&snap(6000), &snap(5999));
        assert_eq!(diff.flips(), &[true, true, true, true, true]);
        // 100:00 -> 99:00, seconds stay put
        let diff = FlipDiff::between(&snap(6000), &snap(5940));
        assert_eq!(diff.changed_positions(), vec![0, 1, 2]);
    }
}
