//! Two-sided game clock with Fischer, Bronstein and simple-delay handling.
//!
//! The clock is driven entirely from outside: `tick` is fed elapsed
//! milliseconds by whatever timer the owner runs, and `on_move_completed` is
//! called when a move is accepted. It never reads the wall clock itself.

use chess::PlayerSide;
use serde::Serialize;

use crate::time_control::{IncrementMode, TimeControl};

/// Below this the presentation layer shows a low-time warning.
pub const LOW_TIME_THRESHOLD_MS: u64 = 60_000;

/// One side's countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClockState {
    pub remaining_ms: u64,
    pub is_running: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    #[error("Clock has stopped for good")]
    GameOver,
    #[error("Clock is already running")]
    AlreadyRunning,
    #[error("It is not {0}'s turn")]
    NotOnTurn(PlayerSide),
}

/// Manages two chess clocks (one per player).
#[derive(Debug, Clone)]
pub struct ChessClock {
    control: TimeControl,
    white: ClockState,
    black: ClockState,
    /// Side whose clock runs while not paused.
    turn: PlayerSide,
    paused: bool,
    finished: bool,
    flagged: Option<PlayerSide>,
    /// Bank time `turn` has consumed since its turn began.
    spent_ms: u64,
    /// Simple-delay grace left for `turn`.
    delay_left_ms: u64,
}

impl ChessClock {
    /// Both clocks stopped at base time, paused until the first move.
    pub fn new(control: TimeControl, first_to_move: PlayerSide) -> Self {
        let stopped = ClockState {
            remaining_ms: control.base_time_ms(),
            is_running: false,
        };
        let mut clock = Self {
            control,
            white: stopped,
            black: stopped,
            turn: first_to_move,
            paused: true,
            finished: false,
            flagged: None,
            spent_ms: 0,
            delay_left_ms: 0,
        };
        clock.begin_turn(first_to_move);
        clock
    }

    pub fn reset(&mut self, control: TimeControl, first_to_move: PlayerSide) {
        *self = Self::new(control, first_to_move);
    }

    /// Run the side-to-move's clock. Only valid while paused (before the
    /// first move or after a pause) and before the game ends.
    pub fn start(&mut self) -> Result<(), ClockError> {
        if self.finished {
            return Err(ClockError::GameOver);
        }
        if !self.paused {
            return Err(ClockError::AlreadyRunning);
        }
        self.paused = false;
        self.sync_running();
        tracing::debug!(side = %self.turn, "Clock started");
        Ok(())
    }

    /// Flip the pause flag. Returns the new paused state.
    pub fn toggle_pause(&mut self) -> Result<bool, ClockError> {
        if self.finished {
            return Err(ClockError::GameOver);
        }
        self.paused = !self.paused;
        self.sync_running();
        tracing::debug!(paused = self.paused, "Clock pause toggled");
        Ok(self.paused)
    }

    /// Count `elapsed_ms` against the running side. Returns the side whose
    /// flag fell on this tick; a fallen flag ends the clock, so this fires
    /// at most once.
    pub fn tick(&mut self, elapsed_ms: u64) -> Option<PlayerSide> {
        if !self.is_ticking() {
            return None;
        }

        let grace = elapsed_ms.min(self.delay_left_ms);
        self.delay_left_ms -= grace;
        let debit = elapsed_ms - grace;

        let side = self.turn;
        let clock = self.state_mut(side);
        let charged = debit.min(clock.remaining_ms);
        clock.remaining_ms -= charged;
        let flag_fell = clock.remaining_ms == 0;
        self.spent_ms += charged;

        if flag_fell {
            tracing::info!(side = %side, "Flag fell");
            self.flagged = Some(side);
            self.finish();
            return Some(side);
        }
        None
    }

    /// Stop `moving`'s clock, credit its increment, start the opponent.
    /// Also releases the initial pause: the clock starts with the first move.
    pub fn on_move_completed(&mut self, moving: PlayerSide) -> Result<(), ClockError> {
        if self.finished {
            tracing::debug!(side = %moving, "Move after clock finished ignored");
            return Ok(());
        }
        if moving != self.turn {
            return Err(ClockError::NotOnTurn(moving));
        }

        let credit = match self.control.mode() {
            IncrementMode::Fischer => self.control.increment_ms(),
            IncrementMode::Bronstein => self.spent_ms.min(self.control.increment_ms()),
            IncrementMode::SimpleDelay => 0,
        };
        self.state_mut(moving).remaining_ms += credit;
        tracing::debug!(
            side = %moving,
            spent_ms = self.spent_ms,
            credit_ms = credit,
            "Move completed"
        );

        self.paused = false;
        self.begin_turn(moving.opponent());
        Ok(())
    }

    /// Hand the turn to `side` without crediting anything, as when a move
    /// is taken back.
    pub fn switch_turn(&mut self, side: PlayerSide) {
        if self.finished {
            return;
        }
        self.begin_turn(side);
    }

    /// Stop both clocks permanently.
    pub fn finish(&mut self) {
        self.finished = true;
        self.sync_running();
    }

    /// Time is currently flowing for some side.
    pub fn is_ticking(&self) -> bool {
        !self.paused && !self.finished
    }

    pub fn state(&self, side: PlayerSide) -> ClockState {
        match side {
            PlayerSide::White => self.white,
            PlayerSide::Black => self.black,
        }
    }

    pub fn remaining_ms(&self, side: PlayerSide) -> u64 {
        self.state(side).remaining_ms
    }

    pub fn is_low_time(&self, side: PlayerSide) -> bool {
        self.remaining_ms(side) < LOW_TIME_THRESHOLD_MS
    }

    /// The side whose clock is running, if any.
    pub fn active_side(&self) -> Option<PlayerSide> {
        self.is_ticking().then_some(self.turn)
    }

    pub fn turn(&self) -> PlayerSide {
        self.turn
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn flagged(&self) -> Option<PlayerSide> {
        self.flagged
    }

    pub fn control(&self) -> TimeControl {
        self.control
    }

    /// Grace left before the side to move starts losing bank time.
    pub fn delay_remaining_ms(&self) -> u64 {
        self.delay_left_ms
    }

    fn begin_turn(&mut self, side: PlayerSide) {
        self.turn = side;
        self.spent_ms = 0;
        self.delay_left_ms = match self.control.mode() {
            IncrementMode::SimpleDelay => self.control.increment_ms(),
            IncrementMode::Fischer | IncrementMode::Bronstein => 0,
        };
        self.sync_running();
    }

    fn sync_running(&mut self) {
        let active = self.active_side();
        self.white.is_running = active == Some(PlayerSide::White);
        self.black.is_running = active == Some(PlayerSide::Black);
    }

    fn state_mut(&mut self, side: PlayerSide) -> &mut ClockState {
        match side {
            PlayerSide::White => &mut self.white,
            PlayerSide::Black => &mut self.black,
        }
    }
}

/// Format milliseconds as MM:SS, truncating partial seconds.
pub fn format_clock(remaining_ms: u64) -> String {
    let total_secs = remaining_ms / 1000;
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}
