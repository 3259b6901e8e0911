use chess::RulesEngine;
use tokio::sync::{broadcast, mpsc};
use tracing::Instrument;

use crate::commands::*;
use crate::events::SessionEvent;
use crate::game_session::GameSession;
use crate::selection::TapOutcome;
use crate::ticker::Ticker;

/// The main session actor loop.
/// Owns the session and its ticker. Processes commands and ticks sequentially.
pub(crate) async fn run_session_actor<R: RulesEngine>(
    session: GameSession<R>,
    ticker: Ticker,
    cmd_rx: mpsc::Receiver<SessionCommand>,
    event_tx: broadcast::Sender<SessionEvent>,
) {
    let session_id = session.session_id().to_string();
    run_session_actor_inner(session, ticker, cmd_rx, event_tx)
        .instrument(tracing::info_span!("session", id = %session_id))
        .await;
}

async fn run_session_actor_inner<R: RulesEngine>(
    mut session: GameSession<R>,
    mut ticker: Ticker,
    mut cmd_rx: mpsc::Receiver<SessionCommand>,
    event_tx: broadcast::Sender<SessionEvent>,
) {
    tracing::info!("Session actor started");
    ticker.sync(session.clock_ticking());

    loop {
        tokio::select! {
            biased;

            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(SessionCommand::Shutdown) | None => {
                        tracing::info!("Session actor shutting down");
                        break;
                    }
                    Some(cmd) => {
                        // Charge the partial period to whoever was on move
                        // before the command changes the turn
                        let elapsed = ticker.flush();
                        if elapsed > 0 {
                            advance_clock(&mut session, elapsed, &event_tx, false);
                        }
                        handle_command(&mut session, cmd, &event_tx);
                    }
                }
            }

            elapsed = ticker.next_tick() => {
                advance_clock(&mut session, elapsed, &event_tx, true);
            }
        }

        // Every path ends here, so a stopped clock never sees another tick
        ticker.sync(session.clock_ticking());
    }

    ticker.release();
    tracing::info!("Session actor exited");
}

fn advance_clock<R: RulesEngine>(
    session: &mut GameSession<R>,
    elapsed_ms: u64,
    event_tx: &broadcast::Sender<SessionEvent>,
    announce: bool,
) {
    match session.tick(elapsed_ms) {
        Some(outcome) => {
            let _ = event_tx.send(SessionEvent::StateChanged(session.snapshot()));
            let _ = event_tx.send(SessionEvent::GameOver(outcome));
        }
        None if announce => {
            let _ = event_tx.send(SessionEvent::StateChanged(session.snapshot()));
        }
        None => {}
    }
}

fn handle_command<R: RulesEngine>(
    session: &mut GameSession<R>,
    cmd: SessionCommand,
    event_tx: &broadcast::Sender<SessionEvent>,
) {
    let was_over = session.outcome().is_terminal();

    match cmd {
        SessionCommand::Tap { square, reply } => {
            let outcome = session.on_square_tapped(square);
            if outcome != TapOutcome::Ignored {
                if let TapOutcome::MoveCompleted(done) = &outcome {
                    let _ = event_tx.send(SessionEvent::MoveCompleted {
                        san: done.san.clone(),
                    });
                }
                let _ = event_tx.send(SessionEvent::StateChanged(session.snapshot()));
            }
            let _ = reply.send(outcome);
        }
        SessionCommand::Start { reply } => {
            let result = session.start();
            if result.is_ok() {
                let _ = event_tx.send(SessionEvent::StateChanged(session.snapshot()));
            }
            let _ = reply.send(result);
        }
        SessionCommand::TogglePause { reply } => {
            let result = session.toggle_pause();
            if result.is_ok() {
                let _ = event_tx.send(SessionEvent::StateChanged(session.snapshot()));
            }
            let _ = reply.send(result);
        }
        SessionCommand::NewGame { control, reply } => {
            session.new_game(control);
            let snap = session.snapshot();
            let _ = event_tx.send(SessionEvent::StateChanged(snap.clone()));
            let _ = reply.send(snap);
        }
        SessionCommand::ImportFen { fen, reply } => {
            let result = session.import_fen(&fen).map(|_| session.snapshot());
            if let Ok(ref snap) = result {
                let _ = event_tx.send(SessionEvent::StateChanged(snap.clone()));
            }
            let _ = reply.send(result);
        }
        SessionCommand::ExportFen { reply } => {
            let _ = reply.send(session.export_fen());
        }
        SessionCommand::Undo { reply } => {
            let result = session.undo().map(|_| session.snapshot());
            if let Ok(ref snap) = result {
                let _ = event_tx.send(SessionEvent::StateChanged(snap.clone()));
            }
            let _ = reply.send(result);
        }
        SessionCommand::GoToPly { ply, reply } => {
            let result = session.go_to_ply(ply).map(|_| session.snapshot());
            if let Ok(ref snap) = result {
                let _ = event_tx.send(SessionEvent::StateChanged(snap.clone()));
            }
            let _ = reply.send(result);
        }
        SessionCommand::GetSnapshot { reply } => {
            let _ = reply.send(session.snapshot());
        }
        SessionCommand::Subscribe { reply } => {
            let snapshot = session.snapshot();
            let rx = event_tx.subscribe();
            let _ = reply.send((snapshot, rx));
        }
        SessionCommand::Shutdown => unreachable!(),
    }

    let outcome = session.outcome();
    if !was_over && outcome.is_terminal() {
        let _ = event_tx.send(SessionEvent::GameOver(outcome));
    }
}
