//! Timer durations and the store that owns them.
//!
//! Updates are permissive: anything below [`MIN_DURATION_SECS`], negative or
//! unparseable is clamped to the floor instead of being rejected.

use serde::{Deserialize, Serialize};

use super::mode::TimerMode;

/// Shortest segment a user can configure.
pub const MIN_DURATION_SECS: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ConfigUpdate", into = "ConfigUpdate")]
pub struct TimerConfiguration {
    focus_seconds: u32,
    short_break_seconds: u32,
    long_break_seconds: u32,
}

impl TimerConfiguration {
    /// Build a configuration, clamping each field to the minimum.
    pub fn new(focus_seconds: u32, short_break_seconds: u32, long_break_seconds: u32) -> Self {
        Self {
            focus_seconds: focus_seconds.max(MIN_DURATION_SECS),
            short_break_seconds: short_break_seconds.max(MIN_DURATION_SECS),
            long_break_seconds: long_break_seconds.max(MIN_DURATION_SECS),
        }
    }

    pub fn focus_seconds(&self) -> u32 {
        self.focus_seconds
    }

    pub fn short_break_seconds(&self) -> u32 {
        self.short_break_seconds
    }

    pub fn long_break_seconds(&self) -> u32 {
        self.long_break_seconds
    }

    pub fn duration_for(&self, mode: TimerMode) -> u32 {
        match mode {
            TimerMode::Focus => self.focus_seconds,
            TimerMode::ShortBreak => self.short_break_seconds,
            TimerMode::LongBreak => self.long_break_seconds,
        }
    }
}

impl Default for TimerConfiguration {
    fn default() -> Self {
        Self {
            focus_seconds: 25 * 60,
            short_break_seconds: 5 * 60,
            long_break_seconds: 15 * 60,
        }
    }
}

impl From<ConfigUpdate> for TimerConfiguration {
    fn from(update: ConfigUpdate) -> Self {
        Self {
            focus_seconds: clamp_seconds(update.focus_seconds),
            short_break_seconds: clamp_seconds(update.short_break_seconds),
            long_break_seconds: clamp_seconds(update.long_break_seconds),
        }
    }
}

/// Raw, unvalidated durations as entered by a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigUpdate {
    pub focus_seconds: i64,
    pub short_break_seconds: i64,
    pub long_break_seconds: i64,
}

impl ConfigUpdate {
    pub fn new(focus_seconds: i64, short_break_seconds: i64, long_break_seconds: i64) -> Self {
        Self {
            focus_seconds,
            short_break_seconds,
            long_break_seconds,
        }
    }

    /// Parse free-form text fields. Non-numeric input becomes the floor.
    pub fn parse(focus: &str, short_break: &str, long_break: &str) -> Self {
        Self::new(
            coerce_seconds(focus).into(),
            coerce_seconds(short_break).into(),
            coerce_seconds(long_break).into(),
        )
    }
}

impl From<TimerConfiguration> for ConfigUpdate {
    fn from(config: TimerConfiguration) -> Self {
        Self::new(
            config.focus_seconds.into(),
            config.short_break_seconds.into(),
            config.long_break_seconds.into(),
        )
    }
}

/// Clamp a raw duration into `MIN_DURATION_SECS..=u32::MAX`.
pub fn clamp_seconds(raw: i64) -> u32 {
    u32::try_from(raw.max(i64::from(MIN_DURATION_SECS))).unwrap_or(u32::MAX)
}

/// Parse user text into clamped seconds; anything unparseable yields the floor.
pub fn coerce_seconds(raw: &str) -> u32 {
    let raw = raw.trim();
    if let Ok(whole) = raw.parse::<i64>() {
        return clamp_seconds(whole);
    }
    match raw.parse::<f64>() {
        // Float-to-int casts saturate, so huge values land on u32::MAX via the clamp.
        Ok(secs) if secs.is_finite() => clamp_seconds(secs.floor() as i64),
        _ => MIN_DURATION_SECS,
    }
}

/// Sole owner of the active [`TimerConfiguration`].
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    current: TimerConfiguration,
}

impl ConfigStore {
    pub fn new(config: TimerConfiguration) -> Self {
        Self { current: config }
    }

    pub fn current(&self) -> TimerConfiguration {
        self.current
    }

    /// Validate, clamp and replace the stored configuration wholesale.
    pub fn update(&mut self, update: ConfigUpdate) -> TimerConfiguration {
        self.current = update.into();
        self.current
    }

    pub fn duration_for(&self, mode: TimerMode) -> u32 {
        self.current.duration_for(mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn non_positive_and_short_values_clamp_to_floor() {
        let mut store = ConfigStore::default();
        let stored = store.update(ConfigUpdate::new(0, -5, 30));
        assert_eq!(stored, TimerConfiguration::new(60, 60, 60));
        assert_eq!(store.current(), stored);
    }

    #[test]
    fn non_numeric_text_coerces_to_floor() {
        let update = ConfigUpdate::parse("abc", "", "600");
        assert_eq!(update, ConfigUpdate::new(60, 60, 600));
        assert_eq!(coerce_seconds("  1500 "), 1500);
        assert_eq!(coerce_seconds("12.5"), 60);
    }

    #[test]
    fn fractional_text_keeps_whole_seconds() {
        assert_eq!(coerce_seconds("1500.5"), 1500);
        assert_eq!(coerce_seconds("59.9"), 60);
        assert_eq!(coerce_seconds("-90.5"), 60);
        assert_eq!(coerce_seconds("1e12"), u32::MAX);
        assert_eq!(coerce_seconds("NaN"), 60);
        assert_eq!(coerce_seconds("inf"), 60);
    }

    #[test]
    fn deserialized_configuration_is_clamped() {
        let config: TimerConfiguration = serde_json::from_str(
            r#"{"focus_seconds":0,"short_break_seconds":0,"long_break_seconds":5}"#,
        )
        .unwrap();
        assert_eq!(config, TimerConfiguration::new(60, 60, 60));

        let json = serde_json::to_value(TimerConfiguration::new(1500, 300, 900)).unwrap();
        assert_eq!(json["focus_seconds"], 1500);
        assert_eq!(json["long_break_seconds"], 900);
    }

    #[test]
    fn oversized_values_saturate() {
        assert_eq!(clamp_seconds(i64::MAX), u32::MAX);
    }

    #[test]
    fn duration_lookup_by_mode() {
        let store = ConfigStore::new(TimerConfiguration::new(1500, 300, 900));
        assert_eq!(store.duration_for(TimerMode::Focus), 1500);
        assert_eq!(store.duration_for(TimerMode::ShortBreak), 300);
        assert_eq!(store.duration_for(TimerMode::LongBreak), 900);
    }

    proptest! {
        #[test]
        fn stored_durations_never_below_floor(f in any::<i64>(), s in any::<i64>(), l in any::<i64>()) {
            let config = TimerConfiguration::from(ConfigUpdate::new(f, s, l));
            for mode in TimerMode::ALL {
                prop_assert!(config.duration_for(mode) >= MIN_DURATION_SECS);
            }
        }

        #[test]
        fn values_at_or_above_floor_are_kept(v in 60i64..=i64::from(u32::MAX)) {
            prop_assert_eq!(i64::from(clamp_seconds(v)), v);
        }
    }
}
