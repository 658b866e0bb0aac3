//! TOML-based user settings.
//!
//! Stores segment durations and the completion cue preference at
//! `<data_dir>/config.toml`. Timer progress is never written here.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use super::data_dir;
use crate::error::ConfigError;
use crate::timer::{coerce_seconds, ConfigUpdate, TimerConfiguration, MIN_DURATION_SECS};

/// Segment durations in seconds, as stored. Clamped when read back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSettings {
    #[serde(default = "default_focus_seconds", deserialize_with = "lenient_seconds")]
    pub focus_seconds: i64,
    #[serde(default = "default_short_break_seconds", deserialize_with = "lenient_seconds")]
    pub short_break_seconds: i64,
    #[serde(default = "default_long_break_seconds", deserialize_with = "lenient_seconds")]
    pub long_break_seconds: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationSettings {
    #[serde(default = "default_true")]
    pub sound_enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub timer: TimerSettings,
    #[serde(default)]
    pub notifications: NotificationSettings,
}

fn default_focus_seconds() -> i64 {
    TimerConfiguration::default().focus_seconds().into()
}
fn default_short_break_seconds() -> i64 {
    TimerConfiguration::default().short_break_seconds().into()
}
fn default_long_break_seconds() -> i64 {
    TimerConfiguration::default().long_break_seconds().into()
}
fn default_true() -> bool {
    true
}

/// Any TOML value a user might type for a duration.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawSeconds {
    Whole(i64),
    Fraction(f64),
    Text(String),
    Other(toml::Value),
}

/// Hand-edited durations degrade to the floor instead of failing the load.
fn lenient_seconds<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawSeconds::deserialize(deserializer)? {
        RawSeconds::Whole(secs) => secs,
        RawSeconds::Fraction(secs) => coerce_seconds(&secs.to_string()).into(),
        RawSeconds::Text(text) => coerce_seconds(&text).into(),
        RawSeconds::Other(value) => {
            debug!(?value, "unusable duration in settings, using the minimum");
            i64::from(MIN_DURATION_SECS)
        }
    })
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            focus_seconds: default_focus_seconds(),
            short_break_seconds: default_short_break_seconds(),
            long_break_seconds: default_long_break_seconds(),
        }
    }
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self { sound_enabled: true }
    }
}

impl Settings {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let (parent, leaf) = match key.rsplit_once('.') {
            Some((parent, leaf)) => (Some(parent), leaf),
            None => (None, key),
        };
        if leaf.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        if let Some(parent) = parent {
            for part in parent.split('.') {
                current = current.get_mut(part).ok_or_else(unknown)?;
            }
        }
        let obj = current.as_object_mut().ok_or_else(unknown)?;
        let existing = obj.get(leaf).ok_or_else(unknown)?;

        let new_value = match existing {
            serde_json::Value::Bool(_) => {
                let parsed = value.trim().parse::<bool>().map_err(|e| ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: e.to_string(),
                })?;
                serde_json::Value::Bool(parsed)
            }
            // Durations degrade to the floor instead of failing.
            serde_json::Value::Number(_) => serde_json::Value::Number(coerce_seconds(value).into()),
            serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: "not a leaf value".into(),
                })
            }
            _ => serde_json::Value::String(value.into()),
        };

        obj.insert(leaf.to_string(), new_value);
        Ok(())
    }

    /// Default location of the settings file.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings directory cannot be created.
    pub fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("config.toml"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from the default location, writing defaults when absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed,
    /// or if the defaults cannot be written.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no settings file, writing defaults");
                let settings = Self::default();
                settings.save_to(path)?;
                Ok(settings)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings cannot be serialized or written.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a value by dot-separated key. Durations are coerced, never rejected.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or a boolean cannot be parsed.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Ok(())
    }

    /// Durations as the engine sees them, clamped to the minimum.
    pub fn timer_configuration(&self) -> TimerConfiguration {
        self.config_update().into()
    }

    pub fn config_update(&self) -> ConfigUpdate {
        ConfigUpdate::new(
            self.timer.focus_seconds,
            self.timer.short_break_seconds,
            self.timer.long_break_seconds,
        )
    }

    /// Store the clamped durations the engine accepted.
    pub fn set_timer_configuration(&mut self, config: TimerConfiguration) {
        self.timer = TimerSettings {
            focus_seconds: config.focus_seconds().into(),
            short_break_seconds: config.short_break_seconds().into(),
            long_break_seconds: config.long_break_seconds().into(),
        };
    }
}
