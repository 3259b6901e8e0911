//! Time controls: base time, per-move increment, and how the increment is
//! credited.

use serde::{Deserialize, Serialize};

/// Default play clock when no control is chosen: 10 minutes, no increment.
pub const DEFAULT_BASE_TIME_MS: u64 = 10 * 60 * 1000;

/// Custom control bounds offered by the picker.
pub const MIN_BASE_MINUTES: u32 = 1;
pub const MAX_BASE_MINUTES: u32 = 180;
pub const MAX_INCREMENT_SECS: u32 = 60;

/// How the per-move increment is applied. The variants are mutually
/// exclusive: choosing Bronstein clears simple delay and vice versa.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncrementMode {
    /// Full increment added after every move.
    #[default]
    Fischer,
    /// Time actually used is credited back, up to the increment.
    Bronstein,
    /// Nothing is added; the clock waits out a grace period each turn.
    SimpleDelay,
}

impl IncrementMode {
    /// One-line explanation shown next to the mode picker.
    pub fn description(self) -> &'static str {
        match self {
            Self::Fischer => "Fischer: Full increment is added after each move.",
            Self::Bronstein => {
                "Bronstein: Increment is only added for the time spent on the move (up to max increment)."
            }
            Self::SimpleDelay => "Simple Delay: Timer starts after the delay period for each move.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimeControlError {
    #[error("Base time must be greater than zero")]
    ZeroBaseTime,
    #[error("Base time {0} min outside 1..=180")]
    BaseOutOfRange(u32),
    #[error("Increment {0}s outside 0..=60")]
    IncrementOutOfRange(u32),
}

/// Immutable for the duration of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeControl {
    base_time_ms: u64,
    increment_secs: u32,
    mode: IncrementMode,
}

impl TimeControl {
    pub fn new(
        base_time_ms: u64,
        increment_secs: u32,
        mode: IncrementMode,
    ) -> Result<Self, TimeControlError> {
        if base_time_ms == 0 {
            return Err(TimeControlError::ZeroBaseTime);
        }
        Ok(Self {
            base_time_ms,
            increment_secs,
            mode,
        })
    }

    /// A user-built control, validated against the picker's bounds.
    pub fn custom(
        base_minutes: u32,
        increment_secs: u32,
        mode: IncrementMode,
    ) -> Result<Self, TimeControlError> {
        if !(MIN_BASE_MINUTES..=MAX_BASE_MINUTES).contains(&base_minutes) {
            return Err(TimeControlError::BaseOutOfRange(base_minutes));
        }
        if increment_secs > MAX_INCREMENT_SECS {
            return Err(TimeControlError::IncrementOutOfRange(increment_secs));
        }
        Self::new(u64::from(base_minutes) * 60_000, increment_secs, mode)
    }

    pub fn base_time_ms(&self) -> u64 {
        self.base_time_ms
    }

    pub fn increment_secs(&self) -> u32 {
        self.increment_secs
    }

    pub fn increment_ms(&self) -> u64 {
        u64::from(self.increment_secs) * 1000
    }

    pub fn mode(&self) -> IncrementMode {
        self.mode
    }

    /// Same base and increment under another mode. Only meaningful before
    /// a game starts; a running clock keeps the control it was reset with.
    pub fn with_mode(self, mode: IncrementMode) -> Self {
        Self { mode, ..self }
    }

    /// "3 min +2s", "10 min +5 Bronstein", "1h 30m 3s delay".
    pub fn label(&self) -> String {
        format!(
            "{} {}",
            format_base_time(self.base_time_ms / 60_000),
            self.increment_text()
        )
    }

    pub fn increment_text(&self) -> String {
        match self.mode {
            IncrementMode::Fischer => format!("+{}s", self.increment_secs),
            IncrementMode::Bronstein => format!("+{} Bronstein", self.increment_secs),
            IncrementMode::SimpleDelay => format!("{}s delay", self.increment_secs),
        }
    }
}

impl Default for TimeControl {
    fn default() -> Self {
        Self {
            base_time_ms: DEFAULT_BASE_TIME_MS,
            increment_secs: 0,
            mode: IncrementMode::Fischer,
        }
    }
}

/// "45 min" below an hour, "1h" / "1h 30m" above.
pub fn format_base_time(minutes: u64) -> String {
    if minutes < 60 {
        format!("{} min", minutes)
    } else {
        let hours = minutes / 60;
        let mins = minutes % 60;
        if mins > 0 {
            format!("{}h {}m", hours, mins)
        } else {
            format!("{}h", hours)
        }
    }
}

/// Named controls offered on the picker screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    Bullet,
    #[default]
    Blitz,
    Rapid,
    Classical,
    Custom,
}

impl Preset {
    pub const ALL: [Preset; 5] = [
        Preset::Bullet,
        Preset::Blitz,
        Preset::Rapid,
        Preset::Classical,
        Preset::Custom,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Bullet => "Bullet",
            Self::Blitz => "Blitz",
            Self::Rapid => "Rapid",
            Self::Classical => "Classical",
            Self::Custom => "Custom",
        }
    }

    /// (base minutes, increment seconds)
    pub fn minutes_and_increment(self) -> (u32, u32) {
        match self {
            Self::Bullet => (1, 0),
            Self::Blitz => (3, 2),
            Self::Rapid => (10, 5),
            Self::Classical => (30, 10),
            Self::Custom => (5, 3),
        }
    }

    pub fn time_control(self, mode: IncrementMode) -> TimeControl {
        let (minutes, increment) = self.minutes_and_increment();
        TimeControl {
            base_time_ms: u64::from(minutes) * 60_000,
            increment_secs: increment,
            mode,
        }
    }
}
