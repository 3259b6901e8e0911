use std::time::Duration;

use chess::{parse_square, PlayerSide};
use session::{
    spawn_session, GameOutcome, GameSession, IncrementMode, SessionError, SessionEvent,
    SessionHandle, TapOutcome, TimeControl,
};
use tokio::sync::broadcast::error::RecvError;
use tokio::time::sleep;

fn one_minute() -> TimeControl {
    TimeControl::new(60_000, 0, IncrementMode::Fischer).unwrap()
}

fn spawn_timed() -> SessionHandle {
    spawn_session(
        GameSession::standard(Some(one_minute())),
        Duration::from_millis(1000),
    )
}

async fn play(handle: &SessionHandle, from: &str, to: &str) {
    let from = parse_square(from).unwrap();
    let to = parse_square(to).unwrap();
    assert!(matches!(
        handle.tap(from).await.unwrap(),
        TapOutcome::Selected { .. }
    ));
    assert!(matches!(
        handle.tap(to).await.unwrap(),
        TapOutcome::MoveCompleted(_)
    ));
}

async fn remaining(handle: &SessionHandle, side: PlayerSide) -> u64 {
    let clock = handle.get_snapshot().await.unwrap().clock.unwrap();
    match side {
        PlayerSide::White => clock.white.remaining_ms,
        PlayerSide::Black => clock.black.remaining_ms,
    }
}

#[tokio::test(start_paused = true)]
async fn clock_does_not_run_before_first_move() {
    let handle = spawn_timed();
    sleep(Duration::from_secs(10)).await;
    assert_eq!(remaining(&handle, PlayerSide::White).await, 60_000);
    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn first_move_starts_opponent_clock() {
    let handle = spawn_timed();
    play(&handle, "e2", "e4").await;
    sleep(Duration::from_millis(3000)).await;
    assert_eq!(remaining(&handle, PlayerSide::White).await, 60_000);
    assert_eq!(remaining(&handle, PlayerSide::Black).await, 57_000);
    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn flag_fall_ends_game_once() {
    let handle = spawn_timed();
    let (_, mut events) = handle.subscribe().await.unwrap();
    handle.start().await.unwrap();

    let outcome = loop {
        match events.recv().await {
            Ok(SessionEvent::GameOver(outcome)) => break outcome,
            Ok(_) | Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => panic!("actor stopped before the flag fell"),
        }
    };
    assert_eq!(
        outcome,
        GameOutcome::TimeForfeit {
            winner: PlayerSide::Black
        }
    );

    let snap = handle.get_snapshot().await.unwrap();
    let clock = snap.clock.unwrap();
    assert_eq!(clock.white.remaining_ms, 0);
    assert!(!clock.white.is_running);
    assert!(!clock.black.is_running);

    // Ticker is gone: nothing else arrives however long we wait
    sleep(Duration::from_secs(30)).await;
    assert!(matches!(
        events.try_recv(),
        Err(tokio::sync::broadcast::error::TryRecvError::Empty)
    ));
    assert_eq!(handle.start().await, Err(SessionError::GameNotOngoing));
    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn pause_releases_ticker() {
    let handle = spawn_timed();
    handle.start().await.unwrap();
    sleep(Duration::from_millis(2500)).await;
    assert_eq!(handle.toggle_pause().await, Ok(true));
    assert_eq!(remaining(&handle, PlayerSide::White).await, 57_500);

    let (_, mut events) = handle.subscribe().await.unwrap();
    sleep(Duration::from_secs(20)).await;
    assert_eq!(remaining(&handle, PlayerSide::White).await, 57_500);
    assert!(events.try_recv().is_err());

    assert_eq!(handle.toggle_pause().await, Ok(false));
    sleep(Duration::from_millis(1000)).await;
    assert_eq!(remaining(&handle, PlayerSide::White).await, 56_500);
    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn checkmate_releases_ticker() {
    let handle = spawn_timed();
    for (from, to) in [("f2", "f3"), ("e7", "e5"), ("g2", "g4"), ("d8", "h4")] {
        play(&handle, from, to).await;
    }
    let snap = handle.get_snapshot().await.unwrap();
    assert_eq!(
        snap.outcome,
        GameOutcome::Checkmate {
            winner: PlayerSide::Black
        }
    );
    let before = snap.clock.unwrap();
    assert_eq!(before.active_side, None);

    sleep(Duration::from_secs(30)).await;
    let after = handle.get_snapshot().await.unwrap().clock.unwrap();
    assert_eq!(before, after);
    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn new_game_stops_running_clock() {
    let handle = spawn_timed();
    play(&handle, "e2", "e4").await;
    let snap = handle.new_game(Some(one_minute())).await.unwrap();
    assert!(snap.history.is_empty());
    sleep(Duration::from_secs(5)).await;
    assert_eq!(remaining(&handle, PlayerSide::White).await, 60_000);
    assert_eq!(remaining(&handle, PlayerSide::Black).await, 60_000);
    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn invalid_fen_is_reported() {
    let handle = spawn_timed();
    let before = handle.get_snapshot().await.unwrap();
    let err = handle.import_fen("8/8/8".to_string()).await.unwrap_err();
    assert!(matches!(err, SessionError::InvalidFen(_)));
    assert_eq!(handle.get_snapshot().await.unwrap(), before);
    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn handle_errors_after_shutdown() {
    let handle = spawn_timed();
    handle.shutdown().await;
    assert!(handle.get_snapshot().await.is_err());
}
