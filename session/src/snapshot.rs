use chess::PlayerSide;
use serde::Serialize;

use crate::clock::ClockState;
use crate::history::MovePair;
use crate::outcome::GameOutcome;
use crate::time_control::IncrementMode;

/// Complete, immutable snapshot of session state.
/// Sent to subscribers on every state change and on subscribe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub fen: String,
    pub side_to_move: PlayerSide,
    pub selected: Option<String>,
    pub destinations: Vec<String>,
    pub clock: Option<ClockSnapshot>,
    pub history: Vec<MoveView>,
    pub pairs: Vec<MovePair>,
    /// Ply shown on the board; equals `history.len()` at the latest move.
    pub cursor: usize,
    pub last_move: Option<(String, String)>,
    pub outcome: GameOutcome,
    pub status: Option<String>,
}

/// A single move in the history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveView {
    pub ply: usize,
    pub side: PlayerSide,
    pub from: String,
    pub to: String,
    pub san: String,
}

/// Clock state for the presentation layer to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClockSnapshot {
    pub label: String,
    pub mode: IncrementMode,
    pub white: ClockState,
    pub black: ClockState,
    pub active_side: Option<PlayerSide>,
    pub paused: bool,
    pub white_low_time: bool,
    pub black_low_time: bool,
    pub delay_remaining_ms: u64,
}
