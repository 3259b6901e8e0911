use cozy_chess::Board;

/// Parse a FEN string into a Board
pub fn parse_fen(fen: &str) -> Result<Board, FenError> {
    let fen = fen.trim();
    if fen.is_empty() {
        return Err(FenError::Empty);
    }

    // Accepts both standard and Shredder castling fields
    fen.parse()
        .map_err(|_| FenError::InvalidFormat(fen.to_string()))
}

/// Format a Board as a FEN string
pub fn format_fen(board: &Board) -> String {
    // Use cozy-chess's Display implementation
    board.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FenError {
    #[error("Empty FEN")]
    Empty,
    #[error("Invalid FEN: {0}")]
    InvalidFormat(String),
}
