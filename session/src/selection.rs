//! Tap-driven move selection.
//!
//! A first tap on a friendly piece selects it and caches its legal
//! destinations; the second tap either completes a move or drops the
//! selection. Legality is always the rules engine's call.

use chess::{format_square, MoveAttempt, PlayerSide, PositionSnapshot, RulesEngine};
use cozy_chess::{Piece, Square};

/// Pawns reaching the last rank always become queens.
pub const AUTO_PROMOTION: Piece = Piece::Queen;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    Idle,
    PieceSelected {
        square: Square,
        destinations: Vec<Square>,
    },
}

/// A move the rules engine accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedMove {
    pub from: Square,
    pub to: Square,
    pub side: PlayerSide,
    pub snapshot: PositionSnapshot,
    pub san: String,
}

/// What a single tap did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TapOutcome {
    /// Nothing changed.
    Ignored,
    Selected {
        square: Square,
        destinations: Vec<Square>,
    },
    Deselected,
    MoveCompleted(CompletedMove),
    /// The engine refused a move to a listed destination.
    MoveRejected,
}

impl Selection {
    pub fn selected_square(&self) -> Option<Square> {
        match self {
            Self::Idle => None,
            Self::PieceSelected { square, .. } => Some(*square),
        }
    }

    pub fn destinations(&self) -> &[Square] {
        match self {
            Self::Idle => &[],
            Self::PieceSelected { destinations, .. } => destinations,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn clear(&mut self) {
        *self = Self::Idle;
    }

    /// Advance the machine by one tap. `game_over` freezes it.
    pub fn on_square_tapped<R: RulesEngine + ?Sized>(
        &mut self,
        rules: &mut R,
        square: Square,
        game_over: bool,
    ) -> TapOutcome {
        if game_over {
            return TapOutcome::Ignored;
        }

        match std::mem::take(self) {
            Self::Idle => {
                let mover = rules.side_to_move();
                if rules.side_on(square) != Some(mover) {
                    return TapOutcome::Ignored;
                }
                let destinations = rules.legal_destinations(square);
                tracing::debug!(
                    square = %format_square(square),
                    destinations = destinations.len(),
                    "Piece selected"
                );
                *self = Self::PieceSelected {
                    square,
                    destinations: destinations.clone(),
                };
                TapOutcome::Selected {
                    square,
                    destinations,
                }
            }
            Self::PieceSelected {
                square: from,
                destinations,
            } => {
                if !destinations.contains(&square) {
                    tracing::debug!(square = %format_square(square), "Selection dropped");
                    return TapOutcome::Deselected;
                }

                let side = rules.side_to_move();
                match rules.attempt_move(from, square, AUTO_PROMOTION) {
                    MoveAttempt::Accepted { snapshot, san } => {
                        TapOutcome::MoveCompleted(CompletedMove {
                            from,
                            to: square,
                            side,
                            snapshot,
                            san,
                        })
                    }
                    MoveAttempt::Rejected => {
                        tracing::warn!(
                            from = %format_square(from),
                            to = %format_square(square),
                            "Listed destination refused"
                        );
                        TapOutcome::MoveRejected
                    }
                }
            }
        }
    }
}
