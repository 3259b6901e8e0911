use chess::{PlayerSide, Termination};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawReason {
    Stalemate,
    ThreefoldRepetition,
    InsufficientMaterial,
    FiftyMoveRule,
}

impl DrawReason {
    fn describe(self) -> &'static str {
        match self {
            Self::Stalemate => "in stalemate",
            Self::ThreefoldRepetition => "by threefold repetition",
            Self::InsufficientMaterial => "by insufficient material",
            Self::FiftyMoveRule => "by the fifty-move rule",
        }
    }
}

/// How the game stands. Leaves `Ongoing` once and never returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GameOutcome {
    #[default]
    Ongoing,
    Checkmate {
        winner: PlayerSide,
    },
    Draw {
        reason: DrawReason,
    },
    TimeForfeit {
        winner: PlayerSide,
    },
}

impl GameOutcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Ongoing)
    }

    pub fn winner(&self) -> Option<PlayerSide> {
        match self {
            Self::Checkmate { winner } | Self::TimeForfeit { winner } => Some(*winner),
            Self::Ongoing | Self::Draw { .. } => None,
        }
    }

    /// Status line for the game-over banner. `None` while ongoing.
    pub fn status_text(&self) -> Option<String> {
        match self {
            Self::Ongoing => None,
            Self::Checkmate { winner } => {
                Some(format!("{} wins by checkmate", winner.display_name()))
            }
            Self::TimeForfeit { winner } => Some(format!("{} wins on time", winner.display_name())),
            Self::Draw { reason } => Some(format!("Game ended {}", reason.describe())),
        }
    }
}

impl From<Termination> for GameOutcome {
    fn from(termination: Termination) -> Self {
        match termination {
            Termination::Checkmate { winner } => Self::Checkmate { winner },
            Termination::Stalemate => Self::Draw {
                reason: DrawReason::Stalemate,
            },
            Termination::ThreefoldRepetition => Self::Draw {
                reason: DrawReason::ThreefoldRepetition,
            },
            Termination::InsufficientMaterial => Self::Draw {
                reason: DrawReason::InsufficientMaterial,
            },
            Termination::FiftyMoveRule => Self::Draw {
                reason: DrawReason::FiftyMoveRule,
            },
        }
    }
}
