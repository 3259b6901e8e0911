//! Canonical side type for the project.
//! cozy-chess types are internal implementation details.

use serde::{Deserialize, Serialize};

/// One of the two players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerSide {
    White,
    Black,
}

impl PlayerSide {
    pub fn opponent(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Black => "black",
        }
    }

    /// Capitalised name used in status lines ("White wins on time").
    pub fn display_name(self) -> &'static str {
        match self {
            Self::White => "White",
            Self::Black => "Black",
        }
    }
}

impl From<cozy_chess::Color> for PlayerSide {
    fn from(c: cozy_chess::Color) -> Self {
        match c {
            cozy_chess::Color::White => Self::White,
            cozy_chess::Color::Black => Self::Black,
        }
    }
}

impl From<PlayerSide> for cozy_chess::Color {
    fn from(s: PlayerSide) -> Self {
        match s {
            PlayerSide::White => Self::White,
            PlayerSide::Black => Self::Black,
        }
    }
}

impl std::fmt::Display for PlayerSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opponent_flips() {
        assert_eq!(PlayerSide::White.opponent(), PlayerSide::Black);
        assert_eq!(PlayerSide::Black.opponent(), PlayerSide::White);
    }

    #[test]
    fn test_cozy_roundtrip() {
        let color: cozy_chess::Color = PlayerSide::Black.into();
        assert_eq!(color, cozy_chess::Color::Black);
        assert_eq!(PlayerSide::from(color), PlayerSide::Black);
    }
}
