//! tapchess - a tap-to-move chess board with a game clock.
//!
//! Squares are "tapped" by typing their names at the prompt. The session runs
//! as an actor in the background; clock ticks keep flowing while the prompt
//! waits for input, and a fallen flag is announced as soon as it happens.
//! Logs go to a daily rolling file (see [`config`]) so they never mix with
//! the board.

mod config;
mod input;
mod render;

use chess::{Game, RulesEngine};
use clap::{Parser, ValueEnum};
use session::{
    spawn_session, GameSession, IncrementMode, Preset, SessionError, SessionEvent, SessionHandle,
    TapOutcome, TimeControl,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use input::{parse_input, Input, HELP};

/// Top-level CLI arguments for tapchess.
#[derive(Parser)]
#[command(name = "tapchess", about = "Tap-to-move chess with a game clock")]
struct Cli {
    /// Named time control. Ignored when --base-minutes is given.
    #[arg(long, value_enum)]
    preset: Option<PresetArg>,

    /// Custom base time in minutes (1-180).
    #[arg(long)]
    base_minutes: Option<u32>,

    /// Custom increment in seconds (0-60), used with --base-minutes.
    #[arg(long, default_value_t = 0)]
    increment: u32,

    /// How the increment is applied.
    #[arg(long, value_enum, default_value_t = ModeArg::Fischer)]
    mode: ModeArg,

    /// Analysis board: no clock.
    #[arg(long, conflicts_with_all = ["preset", "base_minutes"])]
    analysis: bool,

    /// Start from this position instead of the initial one.
    #[arg(long)]
    fen: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PresetArg {
    Bullet,
    Blitz,
    Rapid,
    Classical,
    Custom,
}

impl From<PresetArg> for Preset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Bullet => Preset::Bullet,
            PresetArg::Blitz => Preset::Blitz,
            PresetArg::Rapid => Preset::Rapid,
            PresetArg::Classical => Preset::Classical,
            PresetArg::Custom => Preset::Custom,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    Fischer,
    Bronstein,
    Delay,
}

impl From<ModeArg> for IncrementMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Fischer => IncrementMode::Fischer,
            ModeArg::Bronstein => IncrementMode::Bronstein,
            ModeArg::Delay => IncrementMode::SimpleDelay,
        }
    }
}

impl Cli {
    fn time_control(&self) -> anyhow::Result<Option<TimeControl>> {
        if self.analysis {
            return Ok(None);
        }
        let mode = IncrementMode::from(self.mode);
        let control = match (self.base_minutes, self.preset) {
            (Some(minutes), _) => TimeControl::custom(minutes, self.increment, mode)?,
            (None, Some(preset)) => Preset::from(preset).time_control(mode),
            (None, None) => TimeControl::default().with_mode(mode),
        };
        Ok(Some(control))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_dir = config::get_log_dir();
    std::fs::create_dir_all(&log_dir).ok();
    let file_appender = tracing_appender::rolling::daily(&log_dir, "tapchess");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!("tapchess starting up");

    let control = cli.time_control()?;
    let mut game = Game::new();
    if let Some(fen) = &cli.fen {
        game.load_fen(fen)?;
    }

    let handle = spawn_session(GameSession::new(game, control), config::get_tick_period());
    println!("tapchess - type 'help' for commands");
    println!("Debug logs: {}/tapchess.YYYY-MM-DD", log_dir.display());
    println!();

    let result = run_prompt(&handle, control).await;
    handle.shutdown().await;

    tracing::info!("tapchess shutting down");
    result
}

async fn run_prompt(handle: &SessionHandle, control: Option<TimeControl>) -> anyhow::Result<()> {
    let (snapshot, mut events) = handle.subscribe().await?;
    print!("{}", render::render_snapshot(&snapshot));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match parse_input(&line) {
                    Ok(Input::Quit) => break,
                    Ok(input) => {
                        if let Err(e) = execute(handle, input, control).await {
                            println!("{}", e);
                        }
                    }
                    Err(input::InputError::Empty) => {}
                    Err(e) => println!("{}", e),
                }
            }

            event = events.recv() => {
                match event {
                    Ok(SessionEvent::GameOver(outcome)) => {
                        if let Some(status) = outcome.status_text() {
                            println!("\n*** {} ***", status);
                        }
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(n)) => {
                        tracing::debug!(skipped = n, "Prompt fell behind session events");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }

    Ok(())
}

async fn execute(
    handle: &SessionHandle,
    input: Input,
    control: Option<TimeControl>,
) -> Result<(), SessionError> {
    match input {
        Input::Tap(square) => report_tap(handle.tap(square).await?),
        Input::Move(from, to) => {
            report_tap(handle.tap(from).await?);
            report_tap(handle.tap(to).await?);
        }
        Input::Start => handle.start().await?,
        Input::Pause => {
            let paused = handle.toggle_pause().await?;
            println!("{}", if paused { "Paused" } else { "Running" });
        }
        Input::Undo => {
            handle.undo().await?;
        }
        Input::New => {
            handle.new_game(control).await?;
        }
        Input::Back => {
            let snap = handle.get_snapshot().await?;
            match snap.cursor.checked_sub(1) {
                Some(ply) => {
                    handle.go_to_ply(ply).await?;
                }
                None => println!("Already at the start"),
            }
        }
        Input::Forward => {
            let snap = handle.get_snapshot().await?;
            if snap.cursor < snap.history.len() {
                handle.go_to_ply(snap.cursor + 1).await?;
            } else {
                println!("Already at the latest move");
            }
        }
        Input::GoTo(ply) => {
            handle.go_to_ply(ply).await?;
        }
        Input::Fen(fen) => {
            handle.import_fen(fen).await?;
        }
        Input::Export => {
            println!("{}", handle.export_fen().await?);
            return Ok(());
        }
        Input::Json => {
            let snap = handle.get_snapshot().await?;
            match serde_json::to_string_pretty(&snap) {
                Ok(json) => println!("{}", json),
                Err(e) => println!("Could not serialise snapshot: {}", e),
            }
            return Ok(());
        }
        Input::Presets => {
            let mode = control.map(|c| c.mode()).unwrap_or_default();
            print!("{}", render::render_time_controls(mode));
            return Ok(());
        }
        Input::Help => {
            println!("{}", HELP);
            return Ok(());
        }
        Input::Quit => return Ok(()),
    }

    let snap = handle.get_snapshot().await?;
    print!("{}", render::render_snapshot(&snap));
    Ok(())
}

fn report_tap(outcome: TapOutcome) {
    match outcome {
        TapOutcome::Ignored => println!("Nothing to select there"),
        TapOutcome::Selected { destinations, .. } if destinations.is_empty() => {
            println!("That piece has no legal moves")
        }
        TapOutcome::Selected { .. } | TapOutcome::Deselected => {}
        TapOutcome::MoveCompleted(done) => println!("Played {}", done.san),
        TapOutcome::MoveRejected => println!("Move refused"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("tapchess").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_default_control_is_ten_minutes() {
        let control = cli(&[]).time_control().unwrap().unwrap();
        assert_eq!(control, TimeControl::default());
    }

    #[test]
    fn test_preset_with_mode() {
        let control = cli(&["--preset", "blitz", "--mode", "bronstein"])
            .time_control()
            .unwrap()
            .unwrap();
        assert_eq!(control.base_time_ms(), 180_000);
        assert_eq!(control.increment_secs(), 2);
        assert_eq!(control.mode(), IncrementMode::Bronstein);
    }

    #[test]
    fn test_custom_control_validated() {
        assert!(cli(&["--base-minutes", "200"]).time_control().is_err());
        let control = cli(&["--base-minutes", "5", "--increment", "3", "--mode", "delay"])
            .time_control()
            .unwrap()
            .unwrap();
        assert_eq!(control.label(), "5 min 3s delay");
    }

    #[test]
    fn test_analysis_has_no_clock() {
        assert_eq!(cli(&["--analysis"]).time_control().unwrap(), None);
        assert!(Cli::try_parse_from(["tapchess", "--analysis", "--preset", "rapid"]).is_err());
    }
}
