//! Rules-engine adapter over cozy-chess.
//!
//! Legality, SAN, outcome classification and position snapshots all live
//! here; callers talk to it through [`RulesEngine`].

pub mod castling;
pub mod converters;
pub mod fen;
pub mod game;
pub mod rules;
pub mod san;
pub mod types;

pub use converters::*;
pub use fen::FenError;
pub use game::{Game, GameError, HistoryEntry};
pub use rules::{MoveAttempt, PositionSnapshot, RulesEngine, Termination};
pub use types::PlayerSide;
