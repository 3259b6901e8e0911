use crate::outcome::GameOutcome;
use crate::snapshot::SessionSnapshot;

/// Events broadcast from the session actor to all subscribers.
#[derive(Debug, Clone)]
#[allow(clippy::large_enum_variant)]
pub enum SessionEvent {
    /// Full state snapshot after any mutation.
    StateChanged(SessionSnapshot),
    /// A move was played; carries its SAN.
    MoveCompleted { san: String },
    /// Sent once when the outcome becomes terminal.
    GameOver(GameOutcome),
}
