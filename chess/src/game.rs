use cozy_chess::{Board, Move, Piece, Square};

use crate::castling::display_destination;
use crate::converters::format_square;
use crate::fen::{format_fen, parse_fen, FenError};
use crate::rules::{MoveAttempt, PositionSnapshot, RulesEngine, Termination};
use crate::san::format_san;
use crate::types::PlayerSide;

/// Main game state wrapper around cozy-chess Board
#[derive(Debug, Clone)]
pub struct Game {
    start: Board,
    start_ply: usize,
    position: Board,
    history: Vec<HistoryEntry>,
    /// Number of history entries applied to reach `position`. Entries past
    /// the cursor survive navigation and are discarded by the next move.
    cursor: usize,
}

/// One played move
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub mv: Move,
    pub side: PlayerSide,
    pub san: String, // Standard Algebraic Notation
    pub hash: u64,   // Position hash after this move, for repetition
}

impl Game {
    /// Create a new game from the standard starting position
    pub fn new() -> Self {
        Self::from_board(Board::default())
    }

    /// Create a game from a FEN string
    pub fn from_fen(fen: &str) -> Result<Self, GameError> {
        Ok(Self::from_board(parse_fen(fen)?))
    }

    fn from_board(board: Board) -> Self {
        Self {
            start: board.clone(),
            start_ply: 0,
            position: board,
            history: Vec::new(),
            cursor: 0,
        }
    }

    /// Get the current board position
    pub fn position(&self) -> &Board {
        &self.position
    }

    /// Moves leading to the current position
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history[..self.cursor]
    }

    /// Half-moves from the start of the game to the current position
    pub fn ply(&self) -> usize {
        self.start_ply + self.cursor
    }

    /// Make a move on the board
    pub fn make_move(&mut self, mv: Move) -> Result<HistoryEntry, GameError> {
        // Validate move is legal
        if !self.position.is_legal(mv) {
            return Err(GameError::IllegalMove);
        }

        let side = PlayerSide::from(self.position.side_to_move());
        // Generate SAN notation before making the move
        let san = format_san(&self.position, mv);
        self.position.play_unchecked(mv);

        let entry = HistoryEntry {
            mv,
            side,
            san,
            hash: self.position.hash(),
        };

        // Playing from an earlier position discards the old continuation
        self.history.truncate(self.cursor);
        self.history.push(entry.clone());
        self.cursor += 1;

        Ok(entry)
    }

    /// Get all legal moves for the current position
    pub fn legal_moves(&self) -> Vec<Move> {
        collect_moves(&self.position)
    }

    /// How many times the current position has occurred, itself included.
    pub fn repetition_count(&self) -> usize {
        let current = self.position.hash();
        std::iter::once(self.start.hash())
            .chain(self.history().iter().map(|e| e.hash))
            .filter(|&h| h == current)
            .count()
    }

    /// Export position to FEN string
    pub fn fen(&self) -> String {
        format_fen(&self.position)
    }

    fn hash_after(&self, applied: usize) -> Option<u64> {
        match applied {
            0 => Some(self.start.hash()),
            n => self.history.get(n - 1).map(|e| e.hash),
        }
    }

    /// Rebuild position from start + history up to the cursor
    fn rebuild_position(&mut self) -> Result<(), GameError> {
        let mut board = self.start.clone();

        for entry in &self.history[..self.cursor] {
            if !board.is_legal(entry.mv) {
                return Err(GameError::IllegalMove);
            }
            board.play_unchecked(entry.mv);
        }

        self.position = board;
        Ok(())
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl RulesEngine for Game {
    fn side_to_move(&self) -> PlayerSide {
        self.position.side_to_move().into()
    }

    fn side_on(&self, square: Square) -> Option<PlayerSide> {
        self.position.color_on(square).map(PlayerSide::from)
    }

    fn legal_destinations(&self, from: Square) -> Vec<Square> {
        let mut destinations = Vec::new();
        for mv in self.legal_moves().into_iter().filter(|mv| mv.from == from) {
            // Promotions yield one move per piece but a single square
            let to = display_destination(&self.position, mv);
            if !destinations.contains(&to) {
                destinations.push(to);
            }
        }
        destinations
    }

    fn attempt_move(&mut self, from: Square, to: Square, promotion: Piece) -> MoveAttempt {
        let candidate = self.legal_moves().into_iter().find(|mv| {
            mv.from == from
                && display_destination(&self.position, *mv) == to
                && mv.promotion.map_or(true, |p| p == promotion)
        });

        let Some(mv) = candidate else {
            tracing::debug!(
                from = %format_square(from),
                to = %format_square(to),
                "No legal move matches attempt"
            );
            return MoveAttempt::Rejected;
        };

        match self.make_move(mv) {
            Ok(entry) => MoveAttempt::Accepted {
                snapshot: self.snapshot(),
                san: entry.san,
            },
            Err(e) => {
                tracing::warn!(
                    from = %format_square(from),
                    to = %format_square(to),
                    "Move rejected: {}",
                    e
                );
                MoveAttempt::Rejected
            }
        }
    }

    fn classify_outcome(&self) -> Option<Termination> {
        if self.legal_moves().is_empty() {
            return Some(if self.position.checkers().is_empty() {
                Termination::Stalemate
            } else {
                let mated = PlayerSide::from(self.position.side_to_move());
                Termination::Checkmate {
                    winner: mated.opponent(),
                }
            });
        }

        if self.position.halfmove_clock() >= 100 {
            return Some(Termination::FiftyMoveRule);
        }
        if self.repetition_count() >= 3 {
            return Some(Termination::ThreefoldRepetition);
        }
        if is_insufficient_material(&self.position) {
            return Some(Termination::InsufficientMaterial);
        }
        None
    }

    fn snapshot(&self) -> PositionSnapshot {
        PositionSnapshot {
            fen: self.fen(),
            ply: self.ply(),
            hash: self.position.hash(),
        }
    }

    fn restore(&mut self, snapshot: &PositionSnapshot) -> Result<(), GameError> {
        if let Some(applied) = snapshot.ply.checked_sub(self.start_ply) {
            if applied <= self.history.len() && self.hash_after(applied) == Some(snapshot.hash) {
                self.cursor = applied;
                return self.rebuild_position();
            }
        }

        // Not part of this game's line: start a fresh line from it
        let board = parse_fen(&snapshot.fen)?;
        *self = Self::from_board(board);
        self.start_ply = snapshot.ply;
        Ok(())
    }

    fn reset(&mut self) {
        *self = Self::new();
    }

    fn load_fen(&mut self, fen: &str) -> Result<(), GameError> {
        *self = Self::from_fen(fen)?;
        Ok(())
    }

    fn to_fen(&self) -> String {
        self.fen()
    }
}

/// All legal moves in `board`, in cozy-chess encoding.
pub fn collect_moves(board: &Board) -> Vec<Move> {
    let mut moves = Vec::new();
    board.generate_moves(|mvs| {
        moves.extend(mvs);
        false
    });
    moves
}

/// Neither side can deliver mate with the remaining material.
fn is_insufficient_material(board: &Board) -> bool {
    let heavy = board.pieces(Piece::Pawn) | board.pieces(Piece::Rook) | board.pieces(Piece::Queen);
    if !heavy.is_empty() {
        return false;
    }

    let knights = board.pieces(Piece::Knight);
    let bishops = board.pieces(Piece::Bishop);
    if knights.len() + bishops.len() <= 1 {
        return true;
    }
    if !knights.is_empty() {
        return false;
    }

    // Bishops only: drawn when they all stand on one square colour
    let mut shades = bishops
        .into_iter()
        .map(|sq| (sq.file() as usize + sq.rank() as usize) % 2);
    let first = shades.next();
    shades.all(|shade| Some(shade) == first)
}

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("Illegal move")]
    IllegalMove,
    #[error("FEN parse error: {0}")]
    FenError(#[from] FenError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converters::parse_square;

    fn sq(s: &str) -> Square {
        parse_square(s).unwrap()
    }

    fn play(game: &mut Game, from: &str, to: &str) -> MoveAttempt {
        game.attempt_move(sq(from), sq(to), Piece::Queen)
    }

    #[test]
    fn test_pawn_destinations_at_start() {
        let game = Game::new();
        let dests = game.legal_destinations(sq("e2"));
        assert_eq!(dests.len(), 2);
        assert!(dests.contains(&sq("e3")));
        assert!(dests.contains(&sq("e4")));
    }

    #[test]
    fn test_attempt_legal_move() {
        let mut game = Game::new();
        match play(&mut game, "g1", "f3") {
            MoveAttempt::Accepted { san, snapshot } => {
                assert_eq!(san, "Nf3");
                assert_eq!(snapshot.ply(), 1);
            }
            MoveAttempt::Rejected => panic!("Nf3 should be legal"),
        }
        assert_eq!(game.side_to_move(), PlayerSide::Black);
    }

    #[test]
    fn test_attempt_illegal_move_leaves_position() {
        let mut game = Game::new();
        let before = game.fen();
        assert_eq!(play(&mut game, "e2", "e5"), MoveAttempt::Rejected);
        assert_eq!(game.fen(), before);
        assert!(game.history().is_empty());
    }

    #[test]
    fn test_castling_via_king_landing_square() {
        let mut game = Game::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let dests = game.legal_destinations(sq("e1"));
        assert!(dests.contains(&sq("g1")));
        assert!(dests.contains(&sq("c1")));
        assert!(!dests.contains(&sq("h1")));

        match play(&mut game, "e1", "g1") {
            MoveAttempt::Accepted { san, .. } => assert_eq!(san, "O-O"),
            MoveAttempt::Rejected => panic!("castling should be accepted"),
        }
        assert_eq!(game.position().piece_on(sq("g1")), Some(Piece::King));
        assert_eq!(game.position().piece_on(sq("f1")), Some(Piece::Rook));
    }

    #[test]
    fn test_promotion_uses_requested_piece() {
        let mut game = Game::from_fen("8/4P2k/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert_eq!(game.legal_destinations(sq("e7")), vec![sq("e8")]);
        assert!(matches!(
            play(&mut game, "e7", "e8"),
            MoveAttempt::Accepted { .. }
        ));
        assert_eq!(game.position().piece_on(sq("e8")), Some(Piece::Queen));
    }

    #[test]
    fn test_checkmate_classification() {
        let mut game = Game::new();
        for (from, to) in [("f2", "f3"), ("e7", "e5"), ("g2", "g4"), ("d8", "h4")] {
            assert!(matches!(play(&mut game, from, to), MoveAttempt::Accepted { .. }));
        }
        assert_eq!(
            game.classify_outcome(),
            Some(Termination::Checkmate {
                winner: PlayerSide::Black
            })
        );
        assert!(game.is_game_over());
    }

    #[test]
    fn test_stalemate_classification() {
        let game = Game::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert_eq!(game.classify_outcome(), Some(Termination::Stalemate));
    }

    #[test]
    fn test_threefold_repetition() {
        let mut game = Game::new();
        let shuffle = [("g1", "f3"), ("g8", "f6"), ("f3", "g1"), ("f6", "g8")];
        for (from, to) in shuffle.iter().chain(shuffle.iter()) {
            assert!(matches!(play(&mut game, from, to), MoveAttempt::Accepted { .. }));
        }
        assert_eq!(game.repetition_count(), 3);
        assert_eq!(
            game.classify_outcome(),
            Some(Termination::ThreefoldRepetition)
        );
    }

    #[test]
    fn test_insufficient_material() {
        let kings_only = Game::from_fen("8/8/4k3/8/8/4K3/8/8 w - - 0 1").unwrap();
        assert_eq!(
            kings_only.classify_outcome(),
            Some(Termination::InsufficientMaterial)
        );

        let knight = Game::from_fen("8/8/4k3/8/8/4KN2/8/8 w - - 0 1").unwrap();
        assert_eq!(
            knight.classify_outcome(),
            Some(Termination::InsufficientMaterial)
        );

        let rook = Game::from_fen("8/8/4k3/8/8/4KR2/8/8 w - - 0 1").unwrap();
        assert_eq!(rook.classify_outcome(), None);
    }

    #[test]
    fn test_fifty_move_rule() {
        let game = Game::from_fen("8/8/4k3/8/8/4KR2/8/8 w - - 100 80").unwrap();
        assert_eq!(game.classify_outcome(), Some(Termination::FiftyMoveRule));
    }

    #[test]
    fn test_restore_earlier_snapshot_then_branch() {
        let mut game = Game::new();
        let mut snapshots = Vec::new();
        for (from, to) in [("e2", "e4"), ("e7", "e5"), ("g1", "f3"), ("b8", "c6")] {
            match play(&mut game, from, to) {
                MoveAttempt::Accepted { snapshot, .. } => snapshots.push(snapshot),
                MoveAttempt::Rejected => panic!("{from}{to} rejected"),
            }
        }

        game.restore(&snapshots[1]).unwrap();
        assert_eq!(game.ply(), 2);
        assert_eq!(game.fen(), snapshots[1].fen());
        assert_eq!(game.history().len(), 2);

        // Forward navigation still works before a new move is made
        game.restore(&snapshots[3]).unwrap();
        assert_eq!(game.history().len(), 4);

        game.restore(&snapshots[1]).unwrap();
        assert!(matches!(play(&mut game, "f1", "c4"), MoveAttempt::Accepted { .. }));
        assert_eq!(game.history().len(), 3);
        assert_eq!(game.history()[2].san, "Bc4");
    }

    #[test]
    fn test_restore_foreign_snapshot_starts_new_line() {
        let mut other = Game::from_fen("8/8/4k3/8/8/4KR2/8/8 w - - 0 1").unwrap();
        let snap = other.snapshot();
        other.reset();

        let mut game = Game::new();
        game.restore(&snap).unwrap();
        assert_eq!(game.fen(), snap.fen());
        assert!(game.history().is_empty());
    }

    #[test]
    fn test_load_fen_invalid_keeps_game() {
        let mut game = Game::new();
        play(&mut game, "e2", "e4");
        let before = game.fen();
        assert!(game.load_fen("garbage").is_err());
        assert_eq!(game.fen(), before);
        assert_eq!(game.history().len(), 1);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_every_listed_destination_is_playable(
                choices in prop::collection::vec(any::<prop::sample::Index>(), 0..30),
            ) {
                let mut game = Game::new();
                for choice in choices {
                    let mover = game.side_to_move();
                    let origins: Vec<Square> = game
                        .legal_moves()
                        .iter()
                        .map(|mv| mv.from)
                        .collect();
                    if origins.is_empty() {
                        break;
                    }
                    let from = origins[choice.index(origins.len())];
                    prop_assert_eq!(game.side_on(from), Some(mover));

                    for to in game.legal_destinations(from) {
                        let mut probe = game.clone();
                        let accepted = matches!(
                            probe.attempt_move(from, to, Piece::Queen),
                            MoveAttempt::Accepted { .. }
                        );
                        prop_assert!(accepted);
                    }

                    let to = game.legal_destinations(from)[0];
                    let before = game.snapshot();
                    let MoveAttempt::Accepted { snapshot, .. } = game.attempt_move(from, to, Piece::Queen)
                    else {
                        panic!("listed destination refused");
                    };
                    prop_assert_eq!(snapshot.ply(), before.ply() + 1);

                    // Stepping back and forth through the line is lossless
                    game.restore(&before).unwrap();
                    prop_assert_eq!(game.fen(), before.fen());
                    game.restore(&snapshot).unwrap();
                    prop_assert_eq!(game.fen(), snapshot.fen());
                }
            }
        }
    }
}
