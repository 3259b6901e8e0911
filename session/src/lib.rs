//! Game clock and tap-to-move core.
//!
//! [`GameSession`] ties a rules engine to the selection machine, the clock
//! and the move history. [`spawn_session`] runs one as a tokio actor with a
//! cancellable [`Ticker`] driving the clock.

pub mod actor;
pub mod clock;
pub mod commands;
pub mod events;
pub mod game_session;
pub mod handle;
pub mod history;
pub mod outcome;
pub mod selection;
pub mod snapshot;
pub mod ticker;
pub mod time_control;

use std::time::Duration;

use chess::RulesEngine;
use tokio::sync::{broadcast, mpsc};

pub use clock::{format_clock, ChessClock, ClockError, ClockState, LOW_TIME_THRESHOLD_MS};
pub use commands::SessionError;
pub use events::SessionEvent;
pub use game_session::GameSession;
pub use handle::SessionHandle;
pub use history::{MoveHistory, MovePair, MoveRecord};
pub use outcome::{DrawReason, GameOutcome};
pub use selection::{CompletedMove, Selection, TapOutcome, AUTO_PROMOTION};
pub use snapshot::{ClockSnapshot, MoveView, SessionSnapshot};
pub use ticker::Ticker;
pub use time_control::{IncrementMode, Preset, TimeControl, TimeControlError};

/// Tick period when none is configured.
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_millis(1000);

/// Spawn an actor task owning `session`. Must be called inside a tokio
/// runtime.
pub fn spawn_session<R>(session: GameSession<R>, tick_period: Duration) -> SessionHandle
where
    R: RulesEngine + Send + 'static,
{
    let (cmd_tx, cmd_rx) = mpsc::channel(32);
    let (event_tx, _) = broadcast::channel(100);

    let handle = SessionHandle::new(session.session_id().to_string(), cmd_tx);
    let ticker = Ticker::new(tick_period);
    tokio::spawn(actor::run_session_actor(session, ticker, cmd_rx, event_tx));

    tracing::info!(session_id = %handle.id(), "Session spawned");
    handle
}
