use cozy_chess::Square;
use tokio::sync::{broadcast, oneshot};

use crate::clock::ClockError;
use crate::events::SessionEvent;
use crate::selection::TapOutcome;
use crate::snapshot::SessionSnapshot;
use crate::time_control::TimeControl;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("Invalid FEN: {0}")]
    InvalidFen(String),
    #[error("Game is not ongoing")]
    GameNotOngoing,
    #[error("Nothing to undo")]
    NothingToUndo,
    #[error("Undo is only possible from the latest move")]
    NotAtLatestMove,
    #[error("Pause the clock to browse moves")]
    ClockRunning,
    #[error("No position at ply {0}")]
    InvalidPly(usize),
    #[error("This board has no clock")]
    NoClock,
    #[error(transparent)]
    Clock(#[from] ClockError),
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Commands sent to the session actor. Each embeds a oneshot for the reply.
pub enum SessionCommand {
    Tap {
        square: Square,
        reply: oneshot::Sender<TapOutcome>,
    },
    Start {
        reply: oneshot::Sender<Result<(), SessionError>>,
    },
    TogglePause {
        reply: oneshot::Sender<Result<bool, SessionError>>,
    },
    NewGame {
        control: Option<TimeControl>,
        reply: oneshot::Sender<SessionSnapshot>,
    },
    ImportFen {
        fen: String,
        reply: oneshot::Sender<Result<SessionSnapshot, SessionError>>,
    },
    ExportFen {
        reply: oneshot::Sender<String>,
    },
    Undo {
        reply: oneshot::Sender<Result<SessionSnapshot, SessionError>>,
    },
    GoToPly {
        ply: usize,
        reply: oneshot::Sender<Result<SessionSnapshot, SessionError>>,
    },
    GetSnapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    Subscribe {
        reply: oneshot::Sender<(SessionSnapshot, broadcast::Receiver<SessionEvent>)>,
    },
    Shutdown,
}
