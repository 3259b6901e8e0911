//! The contract between the interaction core and a chess rules backend.

use cozy_chess::{Piece, Square};
use serde::Serialize;

use crate::game::GameError;
use crate::types::PlayerSide;

/// Opaque, reconstructable record of a position.
///
/// Produced by the rules engine after every accepted move and handed back to
/// [`RulesEngine::restore`] for history navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionSnapshot {
    pub(crate) fen: String,
    pub(crate) ply: usize,
    pub(crate) hash: u64,
}

impl PositionSnapshot {
    pub fn fen(&self) -> &str {
        &self.fen
    }

    /// Half-moves played since the game (or imported position) began.
    pub fn ply(&self) -> usize {
        self.ply
    }
}

/// Result of submitting a move. Never an error: a rejection is final for
/// that attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveAttempt {
    Accepted {
        snapshot: PositionSnapshot,
        san: String,
    },
    Rejected,
}

/// Terminal board conditions the rules engine can detect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Termination {
    Checkmate { winner: PlayerSide },
    Stalemate,
    ThreefoldRepetition,
    InsufficientMaterial,
    FiftyMoveRule,
}

pub trait RulesEngine {
    fn side_to_move(&self) -> PlayerSide;

    /// Owner of the piece on `square`, if any.
    fn side_on(&self, square: Square) -> Option<PlayerSide>;

    /// Squares the piece on `from` may move to. Castling destinations are
    /// reported as the king's landing square.
    fn legal_destinations(&self, from: Square) -> Vec<Square>;

    /// Play `from → to`. `promotion` is used only when the move promotes.
    fn attempt_move(&mut self, from: Square, to: Square, promotion: Piece) -> MoveAttempt;

    fn classify_outcome(&self) -> Option<Termination>;

    fn is_game_over(&self) -> bool {
        self.classify_outcome().is_some()
    }

    /// Snapshot of the current position.
    fn snapshot(&self) -> PositionSnapshot;

    /// Return to a previously produced snapshot.
    fn restore(&mut self, snapshot: &PositionSnapshot) -> Result<(), GameError>;

    /// Replace the game with the standard starting position.
    fn reset(&mut self);

    /// Replace the game with an imported position. On error the current
    /// game is left untouched.
    fn load_fen(&mut self, fen: &str) -> Result<(), GameError>;

    fn to_fen(&self) -> String;
}
