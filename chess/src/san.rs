use cozy_chess::{Board, Move, Piece};

use crate::castling;
use crate::converters::{file_to_char, piece_letter, rank_to_char};
use crate::game::collect_moves;

/// Format a legal move as Standard Algebraic Notation.
///
/// `board` is the position before the move. Includes disambiguation,
/// capture marker, promotion, castling and the check/mate suffix.
pub fn format_san(board: &Board, mv: Move) -> String {
    let mut san = String::new();
    let Some(piece) = board.piece_on(mv.from) else {
        return san;
    };

    if castling::is_castling(board, mv) {
        san.push_str(if castling::is_kingside(mv) { "O-O" } else { "O-O-O" });
    } else {
        // En passant lands on an empty square, so pawn captures are
        // recognised by the file change
        let is_capture = board.piece_on(mv.to).is_some()
            || (piece == Piece::Pawn && mv.from.file() != mv.to.file());

        match piece_letter(piece) {
            Some(letter) => {
                san.push(letter);
                push_disambiguation(&mut san, board, mv, piece);
            }
            None if is_capture => san.push(file_to_char(mv.from.file())),
            None => {}
        }

        if is_capture {
            san.push('x');
        }
        san.push(file_to_char(mv.to.file()));
        san.push(rank_to_char(mv.to.rank()));

        if let Some(promo) = mv.promotion.and_then(piece_letter) {
            san.push('=');
            san.push(promo);
        }
    }

    let mut after = board.clone();
    after.play_unchecked(mv);
    if !after.checkers().is_empty() {
        san.push(if collect_moves(&after).is_empty() { '#' } else { '+' });
    }

    san
}

fn push_disambiguation(san: &mut String, board: &Board, mv: Move, piece: Piece) {
    let rivals: Vec<Move> = collect_moves(board)
        .into_iter()
        .filter(|other| {
            other.to == mv.to
                && other.from != mv.from
                && board.piece_on(other.from) == Some(piece)
        })
        .collect();

    if rivals.is_empty() {
        return;
    }

    let shares_file = rivals.iter().any(|o| o.from.file() == mv.from.file());
    let shares_rank = rivals.iter().any(|o| o.from.rank() == mv.from.rank());

    if !shares_file {
        san.push(file_to_char(mv.from.file()));
    } else if !shares_rank {
        san.push(rank_to_char(mv.from.rank()));
    } else {
        san.push(file_to_char(mv.from.file()));
        san.push(rank_to_char(mv.from.rank()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converters::parse_square;

    fn mv(from: &str, to: &str, promotion: Option<Piece>) -> Move {
        Move {
            from: parse_square(from).unwrap(),
            to: parse_square(to).unwrap(),
            promotion,
        }
    }

    #[test]
    fn test_pawn_push() {
        assert_eq!(format_san(&Board::default(), mv("e2", "e4", None)), "e4");
    }

    #[test]
    fn test_knight_move() {
        assert_eq!(format_san(&Board::default(), mv("g1", "f3", None)), "Nf3");
    }

    #[test]
    fn test_pawn_capture() {
        let board: Board = "rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2"
            .parse()
            .unwrap();
        assert_eq!(format_san(&board, mv("e4", "d5", None)), "exd5");
    }

    #[test]
    fn test_file_disambiguation() {
        // Rooks on a1 and h1 can both reach d1
        let board: Board = "4k3/8/8/8/8/8/4K3/R6R w - - 0 1".parse().unwrap();
        assert_eq!(format_san(&board, mv("a1", "d1", None)), "Rad1");
    }

    #[test]
    fn test_castling() {
        let board: Board = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1".parse().unwrap();
        assert_eq!(format_san(&board, mv("e1", "h1", None)), "O-O");
        assert_eq!(format_san(&board, mv("e1", "a1", None)), "O-O-O");
    }

    #[test]
    fn test_promotion_with_check() {
        let board: Board = "k7/4P3/8/8/8/8/8/4K3 w - - 0 1".parse().unwrap();
        assert_eq!(
            format_san(&board, mv("e7", "e8", Some(Piece::Queen))),
            "e8=Q+"
        );
    }

    #[test]
    fn test_checkmate_suffix() {
        // Fool's mate: 1. f3 e5 2. g4 Qh4#
        let board: Board = "rnbqkbnr/pppp1ppp/8/4p3/6P1/5P2/PPPPP2P/RNBQKBNR b KQkq - 0 2"
            .parse()
            .unwrap();
        assert_eq!(format_san(&board, mv("d8", "h4", None)), "Qh4#");
    }
}
