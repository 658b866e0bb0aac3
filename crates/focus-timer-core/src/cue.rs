//! Audio cue played when a segment finishes on its own.
//!
//! Delivery is best-effort. The listener only reads events; a failing player
//! is logged and otherwise ignored.

use std::io::Write;
use std::sync::Arc;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::CueError;
use crate::events::Event;
use crate::timer::TimerMode;

pub trait CuePlayer: Send + Sync {
    fn play(&self, finished: TimerMode) -> Result<(), CueError>;
}

/// Rings the terminal bell on stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalBell;

impl CuePlayer for TerminalBell {
    fn play(&self, _finished: TimerMode) -> Result<(), CueError> {
        let mut err = std::io::stderr().lock();
        err.write_all(b"\x07")?;
        err.flush()?;
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SilentCue;

impl CuePlayer for SilentCue {
    fn play(&self, _finished: TimerMode) -> Result<(), CueError> {
        Ok(())
    }
}

/// Play a cue for every `SessionCompleted` until the event channel closes.
pub fn spawn_cue_listener(
    mut events: broadcast::Receiver<Event>,
    player: Arc<dyn CuePlayer>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    let Some(finished) = event.session_completed() else {
                        continue;
                    };
                    debug!(%finished, "playing completion cue");
                    if let Err(e) = player.play(finished) {
                        warn!(%finished, "completion cue failed: {e}");
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "cue listener lagged behind timer events");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}
