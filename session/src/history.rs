use chess::{format_square, PlayerSide, PositionSnapshot};
use cozy_chess::Square;
use serde::Serialize;

use crate::selection::CompletedMove;

/// One accepted move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    pub from: Square,
    pub to: Square,
    pub side: PlayerSide,
    pub snapshot: PositionSnapshot,
    pub san: String,
}

impl From<CompletedMove> for MoveRecord {
    fn from(done: CompletedMove) -> Self {
        Self {
            from: done.from,
            to: done.to,
            side: done.side,
            snapshot: done.snapshot,
            san: done.san,
        }
    }
}

/// A numbered row of the move list: `3. Nf3 Nc6`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovePair {
    pub number: usize,
    pub white: Option<String>,
    pub black: Option<String>,
}

/// Chronological move list with a navigation cursor.
///
/// The cursor counts plies: 0 is the start position, `n` the position after
/// the first `n` moves. Moves past the cursor are kept until the next
/// `push`, which discards them.
#[derive(Debug, Clone, Default)]
pub struct MoveHistory {
    moves: Vec<MoveRecord>,
    cursor: usize,
}

impl MoveHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: MoveRecord) {
        if self.cursor < self.moves.len() {
            tracing::debug!(
                dropped = self.moves.len() - self.cursor,
                "Branching from earlier position"
            );
            self.moves.truncate(self.cursor);
        }
        self.moves.push(record);
        self.cursor = self.moves.len();
    }

    /// Drop the final move. Only valid with the cursor at the end.
    pub fn pop_last(&mut self) -> Option<MoveRecord> {
        if !self.at_end() {
            return None;
        }
        let record = self.moves.pop()?;
        self.cursor = self.moves.len();
        Some(record)
    }

    /// Returns false when `ply` is past the last move.
    pub fn set_cursor(&mut self, ply: usize) -> bool {
        if ply > self.moves.len() {
            return false;
        }
        self.cursor = ply;
        true
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn at_end(&self) -> bool {
        self.cursor == self.moves.len()
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn moves(&self) -> &[MoveRecord] {
        &self.moves
    }

    /// Record whose position the cursor shows, `None` at the start.
    pub fn current(&self) -> Option<&MoveRecord> {
        self.cursor.checked_sub(1).and_then(|i| self.moves.get(i))
    }

    pub fn get(&self, ply: usize) -> Option<&MoveRecord> {
        ply.checked_sub(1).and_then(|i| self.moves.get(i))
    }

    pub fn last_move(&self) -> Option<(String, String)> {
        self.current()
            .map(|m| (format_square(m.from), format_square(m.to)))
    }

    pub fn clear(&mut self) {
        self.moves.clear();
        self.cursor = 0;
    }

    /// Numbered pairs for display. `first_number` is the full-move number
    /// of the first recorded move; a history that opens with Black gets a
    /// leading row with an empty White slot.
    pub fn pairs(&self, first_number: usize) -> Vec<MovePair> {
        let mut pairs: Vec<MovePair> = Vec::new();
        for record in &self.moves {
            match record.side {
                PlayerSide::White => pairs.push(MovePair {
                    number: first_number + pairs.len(),
                    white: Some(record.san.clone()),
                    black: None,
                }),
                PlayerSide::Black => match pairs.last_mut() {
                    Some(last) if last.black.is_none() => last.black = Some(record.san.clone()),
                    _ => pairs.push(MovePair {
                        number: first_number + pairs.len(),
                        white: None,
                        black: Some(record.san.clone()),
                    }),
                },
            }
        }
        pairs
    }
}
