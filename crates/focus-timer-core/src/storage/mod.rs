mod settings;

pub use settings::{NotificationSettings, Settings, TimerSettings};

use std::path::PathBuf;

/// Returns the settings directory.
///
/// `FOCUS_TIMER_CONFIG_DIR` wins when set. Otherwise `~/.config/focus-timer`,
/// or `~/.config/focus-timer-dev` when `FOCUS_TIMER_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let dir = match std::env::var_os("FOCUS_TIMER_CONFIG_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("FOCUS_TIMER_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("focus-timer-dev")
            } else {
                base_dir.join("focus-timer")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
