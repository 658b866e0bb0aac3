//! Terminal rendering of timer snapshots.

use focus_timer_core::{Event, FlipDiff, TimerSnapshot};
use tokio::sync::{broadcast, watch};
use tracing::warn;

/// Emits a status line only when something visible changed.
#[derive(Default)]
pub struct LineRenderer {
    previous: Option<TimerSnapshot>,
}

impl LineRenderer {
    pub fn render(&mut self, snapshot: &TimerSnapshot) -> Option<String> {
        let changed = match &self.previous {
            None => true,
            Some(prev) => {
                FlipDiff::between(prev, snapshot).any()
                    || prev.mode != snapshot.mode
                    || prev.is_running != snapshot.is_running
                    || prev.completed_focus_sessions != snapshot.completed_focus_sessions
            }
        };
        self.previous = Some(snapshot.clone());
        changed.then(|| format_line(snapshot))
    }
}

pub fn format_line(snapshot: &TimerSnapshot) -> String {
    format!(
        "{:<14} {:>6}  {:<7} {:>3.0}%  sessions: {}",
        snapshot.mode.label(),
        snapshot.display,
        if snapshot.is_running { "running" } else { "paused" },
        snapshot.progress_pct,
        snapshot.completed_focus_sessions,
    )
}

pub fn describe_event(event: &Event) -> Option<String> {
    match event {
        Event::SessionCompleted { finished, next, .. } => Some(format!(
            "{} complete. Up next: {} ({})",
            finished.label(),
            next.label(),
            next.tagline()
        )),
        Event::ModeSelected { to, .. } => Some(format!("Switched to {}. {}", to.label(), to.tagline())),
        Event::ConfigUpdated { config, .. } => Some(format!(
            "Durations set to focus {}s, short break {}s, long break {}s",
            config.focus_seconds(),
            config.short_break_seconds(),
            config.long_break_seconds()
        )),
        _ => None,
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string(value) {
        Ok(line) => println!("{line}"),
        Err(e) => warn!("failed to serialize output: {e}"),
    }
}

/// Print snapshots and events until the timer is dropped.
pub async fn render_loop(
    mut snapshots: watch::Receiver<TimerSnapshot>,
    mut events: broadcast::Receiver<Event>,
    json: bool,
) {
    let mut renderer = LineRenderer::default();
    let mut show = |snapshot: &TimerSnapshot| {
        if json {
            print_json(snapshot);
        } else if let Some(line) = renderer.render(snapshot) {
            println!("{line}");
        }
    };
    let initial = snapshots.borrow_and_update().clone();
    show(&initial);

    loop {
        tokio::select! {
            // Events first, so everything sent before the timer drops is printed.
            biased;
            event = events.recv() => match event {
                Ok(event) if json => print_json(&event),
                Ok(event) => {
                    if let Some(text) = describe_event(&event) {
                        println!("{text}");
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "renderer lagged behind timer events");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                show(&snapshot);
            }
        }
    }
}
