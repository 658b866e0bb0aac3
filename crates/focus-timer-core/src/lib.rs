//! # Focus Timer Core Library
//!
//! Core logic for a focus/break interval timer. Presentation layers (the CLI
//! binary, or anything else) issue commands and render the snapshots this
//! crate publishes; they never mutate timer state directly.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A second-granular state machine. The caller (or the
//!   bundled tick source) invokes `tick()` once per elapsed second
//! - **Configuration Store**: Segment durations with clamp-on-update semantics
//! - **Tick Source**: A tokio interval task serialized with every command
//! - **Storage**: TOML-based settings
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`SharedTimer`]: Serialized engine handle with tick source and channels
//! - [`Settings`]: User settings persistence
//! - [`CuePlayer`]: Trait for completion sound collaborators

pub mod cue;
pub mod error;
pub mod events;
pub mod storage;
pub mod ticker;
pub mod timer;

pub use cue::{spawn_cue_listener, CuePlayer, SilentCue, TerminalBell};
pub use error::{ConfigError, CoreError, CueError, TimerError};
pub use events::Event;
pub use storage::Settings;
pub use ticker::SharedTimer;
pub use timer::{
    ConfigUpdate, FlipDiff, TimerConfiguration, TimerEngine, TimerMode, TimerSnapshot, TimerState,
};
