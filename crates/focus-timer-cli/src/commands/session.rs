//! Line commands accepted by an interactive `timer run` session.

use focus_timer_core::{ConfigUpdate, TimerMode};

pub const HELP: &str = "\
commands:
  start | pause | toggle | reset
  focus | short | long        switch mode (asks before interrupting)
  config <focus> <short> <long>   set durations in seconds
  status | help | quit";

#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    Start,
    Pause,
    Toggle,
    Reset,
    Mode(TimerMode),
    Config(ConfigUpdate),
    Status,
    Help,
    Quit,
}

impl SessionCommand {
    /// `Ok(None)` for blank lines.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Ok(None);
        };
        let command = match head.to_ascii_lowercase().as_str() {
            "start" => Self::Start,
            "pause" => Self::Pause,
            "toggle" | "t" => Self::Toggle,
            "reset" | "r" => Self::Reset,
            "status" => Self::Status,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            "config" => {
                let fields: Vec<&str> = words.by_ref().collect();
                let [focus, short, long] = fields.as_slice() else {
                    return Err("usage: config <focus> <short> <long>".into());
                };
                return Ok(Some(Self::Config(ConfigUpdate::parse(focus, short, long))));
            }
            other => Self::Mode(other.parse::<TimerMode>()?),
        };
        match words.next() {
            Some(extra) => Err(format!("unexpected argument: {extra}")),
            None => Ok(Some(command)),
        }
    }
}

/// Whether a confirmation answer means yes.
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
