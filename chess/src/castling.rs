//! cozy-chess encodes castling as "king captures own rook" (e1h1). A tap
//! interface expects the king to land two files over (e1g1), so moves are
//! translated at the boundary.

use cozy_chess::{Board, File, Move, Piece, Square};

/// Whether `mv` is cozy-chess's king-takes-own-rook castling encoding.
pub fn is_castling(board: &Board, mv: Move) -> bool {
    board.piece_on(mv.from) == Some(Piece::King)
        && board.color_on(mv.to).is_some()
        && board.color_on(mv.to) == board.color_on(mv.from)
}

/// Whether a castling move goes toward the h-file.
pub fn is_kingside(mv: Move) -> bool {
    (mv.to.file() as usize) > (mv.from.file() as usize)
}

/// The square a player taps to make `mv`.
pub fn display_destination(board: &Board, mv: Move) -> Square {
    if is_castling(board, mv) {
        let file = if is_kingside(mv) { File::G } else { File::C };
        Square::new(file, mv.from.rank())
    } else {
        mv.to
    }
}
