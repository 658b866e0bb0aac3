use std::io::Write;
use std::sync::Arc;

use clap::Subcommand;
use focus_timer_core::{
    spawn_cue_listener, CuePlayer, Event, Settings, SharedTimer, SilentCue, TerminalBell,
    TimerEngine, TimerError,
};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{debug, info};

use super::session::{is_affirmative, SessionCommand, HELP};
use crate::render::{format_line, render_loop};

type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Run an interactive timer session driven by commands on stdin
    Run {
        /// Print snapshots and events as JSON lines
        #[arg(long)]
        json: bool,
        /// Do not ring the bell when a segment finishes
        #[arg(long)]
        no_sound: bool,
    },
    /// Print the initial timer state for the current settings as JSON
    Status,
    /// Run complete focus+break cycles instantly and print every event as JSON
    Simulate {
        /// Number of focus+break cycles
        #[arg(long, default_value = "4")]
        cycles: u32,
    },
}

pub fn run(action: TimerAction) -> CliResult {
    match action {
        TimerAction::Run { json, no_sound } => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            let result = runtime.block_on(session(json, no_sound));
            // The stdin reader thread cannot be cancelled; don't wait on it.
            runtime.shutdown_background();
            result
        }
        TimerAction::Status => {
            let settings = Settings::load()?;
            let engine = TimerEngine::new(settings.timer_configuration());
            println!("{}", serde_json::to_string_pretty(&engine.snapshot())?);
            Ok(())
        }
        TimerAction::Simulate { cycles } => simulate(cycles),
    }
}

fn simulate(cycles: u32) -> CliResult {
    let settings = Settings::load()?;
    let mut engine = TimerEngine::new(settings.timer_configuration());
    let mut out = std::io::stdout().lock();
    let mut emit = |event: Event| -> CliResult {
        writeln!(out, "{}", serde_json::to_string(&event)?)?;
        Ok(())
    };

    for _ in 0..cycles {
        // Focus, then whichever break the cadence picks.
        for _ in 0..2 {
            if let Some(started) = engine.start() {
                emit(started)?;
            }
            let completed = loop {
                if let Some(event) = engine.tick() {
                    break event;
                }
            };
            emit(completed)?;
        }
    }
    writeln!(out, "{}", serde_json::to_string(&engine.snapshot())?)?;
    Ok(())
}

async fn session(json: bool, no_sound: bool) -> CliResult {
    let mut settings = Settings::load()?;
    let timer = SharedTimer::new(settings.timer_configuration());

    let player: Arc<dyn CuePlayer> = if no_sound || !settings.notifications.sound_enabled {
        Arc::new(SilentCue)
    } else {
        Arc::new(TerminalBell)
    };
    let cue = spawn_cue_listener(timer.subscribe_events(), player);
    let renderer = tokio::spawn(render_loop(
        timer.subscribe_snapshots(),
        timer.subscribe_events(),
        json,
    ));
    info!("interactive session started");
    if !json {
        eprintln!("{HELP}");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match SessionCommand::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                eprintln!("{message}");
                continue;
            }
        };
        debug!(?command, "session command");
        match command {
            SessionCommand::Start => {
                timer.start();
            }
            SessionCommand::Pause => {
                timer.pause();
            }
            SessionCommand::Toggle => {
                timer.toggle();
            }
            SessionCommand::Reset => {
                timer.reset();
            }
            SessionCommand::Mode(target) => match timer.select_mode(target, false) {
                Ok(_) => {}
                Err(TimerError::InterruptionNotConfirmed { .. }) => {
                    if confirm_interruption(&mut lines).await? {
                        timer.select_mode(target, true)?;
                    } else {
                        eprintln!("keeping the current session");
                    }
                }
            },
            SessionCommand::Config(update) => {
                timer.update_config(update);
                settings.set_timer_configuration(timer.config());
                settings.save()?;
            }
            SessionCommand::Status => eprintln!("{}", format_line(&timer.snapshot())),
            SessionCommand::Help => eprintln!("{HELP}"),
            SessionCommand::Quit => break,
        }
    }

    timer.pause();
    drop(timer);
    renderer.await?;
    cue.await?;
    info!("interactive session ended");
    Ok(())
}

async fn confirm_interruption(lines: &mut Lines<BufReader<Stdin>>) -> CliResult<bool> {
    eprint!("Interrupt the current session? [y/N] ");
    std::io::stderr().flush()?;
    let answer = lines.next_line().await?.unwrap_or_default();
    Ok(is_affirmative(&answer))
}
