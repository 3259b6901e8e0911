//! Conversions between cozy-chess coordinates and their algebraic text form.

use cozy_chess::{File, Piece, Rank, Square};

/// Parse a square string like "e4".
pub fn parse_square(s: &str) -> Option<Square> {
    let mut chars = s.trim().chars();
    let file = parse_file(chars.next()?)?;
    let rank = parse_rank(chars.next()?)?;
    if chars.next().is_some() {
        return None;
    }
    Some(Square::new(file, rank))
}

pub fn parse_file(c: char) -> Option<File> {
    match c.to_ascii_lowercase() {
        f @ 'a'..='h' => Some(File::index((f as u8 - b'a') as usize)),
        _ => None,
    }
}

pub fn parse_rank(c: char) -> Option<Rank> {
    match c {
        '1'..='8' => Some(Rank::index((c as u8 - b'1') as usize)),
        _ => None,
    }
}

pub fn format_square(square: Square) -> String {
    let mut s = String::with_capacity(2);
    s.push(file_to_char(square.file()));
    s.push(rank_to_char(square.rank()));
    s
}

pub fn file_to_char(file: File) -> char {
    match file {
        File::A => 'a',
        File::B => 'b',
        File::C => 'c',
        File::D => 'd',
        File::E => 'e',
        File::F => 'f',
        File::G => 'g',
        File::H => 'h',
    }
}

pub fn rank_to_char(rank: Rank) -> char {
    match rank {
        Rank::First => '1',
        Rank::Second => '2',
        Rank::Third => '3',
        Rank::Fourth => '4',
        Rank::Fifth => '5',
        Rank::Sixth => '6',
        Rank::Seventh => '7',
        Rank::Eighth => '8',
    }
}

/// Uppercase SAN letter for a piece. Pawns have none.
pub fn piece_letter(piece: Piece) -> Option<char> {
    match piece {
        Piece::Pawn => None,
        Piece::Knight => Some('N'),
        Piece::Bishop => Some('B'),
        Piece::Rook => Some('R'),
        Piece::Queen => Some('Q'),
        Piece::King => Some('K'),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_square_valid() {
        let sq = parse_square("e4").unwrap();
        assert_eq!(sq.file(), File::E);
        assert_eq!(sq.rank(), Rank::Fourth);
        assert_eq!(parse_square("H8"), Some(Square::new(File::H, Rank::Eighth)));
    }

    #[test]
    fn test_parse_square_invalid() {
        assert_eq!(parse_square(""), None);
        assert_eq!(parse_square("e"), None);
        assert_eq!(parse_square("i1"), None);
        assert_eq!(parse_square("a9"), None);
        assert_eq!(parse_square("e2e4"), None);
    }

    #[test]
    fn test_format_square() {
        assert_eq!(format_square(Square::new(File::A, Rank::First)), "a1");
        assert_eq!(format_square(Square::new(File::G, Rank::Seventh)), "g7");
    }
}
