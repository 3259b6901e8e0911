//! One game: rules engine, selection, clock, history and outcome behind a
//! single owner. The actor drives it; tests drive it directly.

use chess::{format_square, Game, PlayerSide, PositionSnapshot, RulesEngine};
use cozy_chess::Square;
use uuid::Uuid;

use crate::clock::ChessClock;
use crate::commands::SessionError;
use crate::history::{MoveHistory, MoveRecord};
use crate::outcome::GameOutcome;
use crate::selection::{Selection, TapOutcome};
use crate::snapshot::{ClockSnapshot, MoveView, SessionSnapshot};
use crate::time_control::TimeControl;

pub struct GameSession<R: RulesEngine = Game> {
    session_id: String,
    rules: R,
    /// Position the current line starts from.
    start: PositionSnapshot,
    selection: Selection,
    /// `None` for an analysis board.
    clock: Option<ChessClock>,
    history: MoveHistory,
    outcome: GameOutcome,
}

impl GameSession<Game> {
    /// Standard starting position.
    pub fn standard(control: Option<TimeControl>) -> Self {
        Self::new(Game::new(), control)
    }
}

impl<R: RulesEngine> GameSession<R> {
    pub fn new(rules: R, control: Option<TimeControl>) -> Self {
        let start = rules.snapshot();
        let clock = control.map(|c| ChessClock::new(c, rules.side_to_move()));
        let mut session = Self {
            session_id: Uuid::new_v4().to_string(),
            rules,
            start,
            selection: Selection::Idle,
            clock,
            history: MoveHistory::new(),
            outcome: GameOutcome::Ongoing,
        };
        session.classify();
        session
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn rules(&self) -> &R {
        &self.rules
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn clock(&self) -> Option<&ChessClock> {
        self.clock.as_ref()
    }

    pub fn time_control(&self) -> Option<TimeControl> {
        self.clock.as_ref().map(ChessClock::control)
    }

    pub fn history(&self) -> &MoveHistory {
        &self.history
    }

    pub fn outcome(&self) -> GameOutcome {
        self.outcome
    }

    /// Time is flowing and the ticker should be armed.
    pub fn clock_ticking(&self) -> bool {
        !self.outcome.is_terminal() && self.clock.as_ref().is_some_and(ChessClock::is_ticking)
    }

    pub fn on_square_tapped(&mut self, square: Square) -> TapOutcome {
        let game_over = self.outcome.is_terminal();
        let branching = !self.history.at_end();
        let tap = self
            .selection
            .on_square_tapped(&mut self.rules, square, game_over);

        if let TapOutcome::MoveCompleted(done) = &tap {
            tracing::info!(
                side = %done.side,
                san = %done.san,
                ply = done.snapshot.ply(),
                "Move played"
            );
            self.history.push(MoveRecord::from(done.clone()));
            if let Some(clock) = self.clock.as_mut() {
                // The clock follows the live line; a move from an earlier
                // position makes that position live
                if branching && clock.turn() != done.side {
                    clock.switch_turn(done.side);
                }
                if let Err(e) = clock.on_move_completed(done.side) {
                    tracing::warn!("Clock out of step with board: {}", e);
                    clock.switch_turn(self.rules.side_to_move());
                }
            }
            self.classify();
        }
        tap
    }

    /// Feed elapsed time to the clock. Returns the outcome if this tick
    /// ended the game.
    pub fn tick(&mut self, elapsed_ms: u64) -> Option<GameOutcome> {
        if self.outcome.is_terminal() {
            return None;
        }
        let loser = self.clock.as_mut()?.tick(elapsed_ms)?;
        self.outcome = GameOutcome::TimeForfeit {
            winner: loser.opponent(),
        };
        self.selection.clear();
        tracing::info!(loser = %loser, "Time forfeit");
        Some(self.outcome)
    }

    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.outcome.is_terminal() {
            return Err(SessionError::GameNotOngoing);
        }
        let clock = self.clock.as_mut().ok_or(SessionError::NoClock)?;
        clock.start()?;
        Ok(())
    }

    /// Returns the new paused state.
    pub fn toggle_pause(&mut self) -> Result<bool, SessionError> {
        if self.outcome.is_terminal() {
            return Err(SessionError::GameNotOngoing);
        }
        let clock = self.clock.as_mut().ok_or(SessionError::NoClock)?;
        Ok(clock.toggle_pause()?)
    }

    /// Fresh board and fresh clocks. `None` gives an analysis board.
    pub fn new_game(&mut self, control: Option<TimeControl>) {
        self.rules.reset();
        self.clock = control.map(|c| ChessClock::new(c, self.rules.side_to_move()));
        self.restart_line();
        tracing::info!(
            control = %control.map_or_else(|| "analysis".to_string(), |c| c.label()),
            "New game"
        );
    }

    /// Replace the board with `fen`. On error nothing changes.
    pub fn import_fen(&mut self, fen: &str) -> Result<(), SessionError> {
        self.rules
            .load_fen(fen)
            .map_err(|e| SessionError::InvalidFen(e.to_string()))?;

        let first_to_move = self.rules.side_to_move();
        if let Some(clock) = self.clock.as_mut() {
            clock.reset(clock.control(), first_to_move);
        }
        self.restart_line();
        tracing::info!(fen = %self.rules.to_fen(), "Position imported");
        Ok(())
    }

    pub fn export_fen(&self) -> String {
        self.rules.to_fen()
    }

    /// Take back the latest move. The clock follows the side to move and
    /// nobody is credited.
    pub fn undo(&mut self) -> Result<(), SessionError> {
        if self.outcome.is_terminal() {
            return Err(SessionError::GameNotOngoing);
        }
        if !self.history.at_end() {
            return Err(SessionError::NotAtLatestMove);
        }
        let undone = self.history.pop_last().ok_or(SessionError::NothingToUndo)?;
        let target = self.position_at(self.history.cursor());
        self.restore(&target)?;
        let side = self.rules.side_to_move();
        if let Some(clock) = self.clock.as_mut() {
            clock.switch_turn(side);
        }
        tracing::info!(san = %undone.san, "Move taken back");
        Ok(())
    }

    /// Show the position after `ply` moves. Playing a move from there
    /// discards the later moves.
    ///
    /// Refused while the clock runs. Browsing never touches the clock: it
    /// keeps counting for the side on move in the latest position.
    pub fn go_to_ply(&mut self, ply: usize) -> Result<(), SessionError> {
        if self.clock_ticking() {
            return Err(SessionError::ClockRunning);
        }
        if ply > self.history.len() {
            return Err(SessionError::InvalidPly(ply));
        }
        let target = self.position_at(ply);
        self.restore(&target)?;
        self.history.set_cursor(ply);
        tracing::debug!(ply, "Navigated history");
        Ok(())
    }

    /// Returns false at the start of the game.
    pub fn step_back(&mut self) -> Result<bool, SessionError> {
        match self.history.cursor().checked_sub(1) {
            Some(ply) => self.go_to_ply(ply).map(|_| true),
            None => Ok(false),
        }
    }

    /// Returns false at the latest move.
    pub fn step_forward(&mut self) -> Result<bool, SessionError> {
        if self.history.at_end() {
            return Ok(false);
        }
        self.go_to_ply(self.history.cursor() + 1).map(|_| true)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let history = self
            .history
            .moves()
            .iter()
            .enumerate()
            .map(|(i, m)| MoveView {
                ply: i + 1,
                side: m.side,
                from: format_square(m.from),
                to: format_square(m.to),
                san: m.san.clone(),
            })
            .collect();

        SessionSnapshot {
            session_id: self.session_id.clone(),
            fen: self.rules.to_fen(),
            side_to_move: self.rules.side_to_move(),
            selected: self.selection.selected_square().map(format_square),
            destinations: self
                .selection
                .destinations()
                .iter()
                .copied()
                .map(format_square)
                .collect(),
            clock: self.clock.as_ref().map(clock_snapshot),
            history,
            pairs: self.history.pairs(fullmove_number(self.start.fen())),
            cursor: self.history.cursor(),
            last_move: self.history.last_move(),
            outcome: self.outcome,
            status: self.outcome.status_text(),
        }
    }

    fn position_at(&self, ply: usize) -> PositionSnapshot {
        self.history
            .get(ply)
            .map_or_else(|| self.start.clone(), |m| m.snapshot.clone())
    }

    fn restore(&mut self, target: &PositionSnapshot) -> Result<(), SessionError> {
        self.rules
            .restore(target)
            .map_err(|e| SessionError::Internal(e.to_string()))?;
        self.selection.clear();
        Ok(())
    }

    /// Reset everything but the rules engine and clock to a fresh line
    /// starting at the engine's current position.
    fn restart_line(&mut self) {
        self.start = self.rules.snapshot();
        self.selection.clear();
        self.history.clear();
        self.outcome = GameOutcome::Ongoing;
        self.classify();
    }

    fn classify(&mut self) {
        if self.outcome.is_terminal() {
            return;
        }
        if let Some(termination) = self.rules.classify_outcome() {
            self.outcome = termination.into();
            if let Some(clock) = self.clock.as_mut() {
                clock.finish();
            }
            tracing::info!(outcome = ?self.outcome, "Game over");
        }
    }
}

fn clock_snapshot(clock: &ChessClock) -> ClockSnapshot {
    let control = clock.control();
    ClockSnapshot {
        label: control.label(),
        mode: control.mode(),
        white: clock.state(PlayerSide::White),
        black: clock.state(PlayerSide::Black),
        active_side: clock.active_side(),
        paused: clock.is_paused(),
        white_low_time: clock.is_low_time(PlayerSide::White),
        black_low_time: clock.is_low_time(PlayerSide::Black),
        delay_remaining_ms: clock.delay_remaining_ms(),
    }
}

/// Full-move counter of a FEN, 1 when absent.
fn fullmove_number(fen: &str) -> usize {
    fen.split_whitespace()
        .nth(5)
        .and_then(|n| n.parse().ok())
        .unwrap_or(1)
}
