//! Timer state structure and its pure transitions

use serde::{Deserialize, Serialize};

/// Default break length in minutes
pub const DEFAULT_BREAK_LENGTH: u32 = 5;
/// Default session length in minutes
pub const DEFAULT_SESSION_LENGTH: u32 = 25;
/// Shortest allowed phase length in minutes
pub const MIN_LENGTH: u32 = 1;
/// Longest allowed phase length in minutes
pub const MAX_LENGTH: u32 = 60;

/// The two alternating phases of the clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Work interval
    Session,
    /// Rest interval
    Break,
}

impl Phase {
    /// The phase that follows this one
    pub fn next(self) -> Self {
        match self {
            Phase::Session => Phase::Break,
            Phase::Break => Phase::Session,
        }
    }

    /// Human readable label shown above the countdown
    pub fn label(self) -> &'static str {
        match self {
            Phase::Session => "Session",
            Phase::Break => "Break",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A single-minute step applied to a phase length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Adjustment {
    Increment,
    Decrement,
}

impl Adjustment {
    /// Apply the step to `minutes`, or `None` if the result would leave [1, 60]
    pub fn apply(self, minutes: u32) -> Option<u32> {
        let adjusted = match self {
            Adjustment::Increment => minutes.checked_add(1)?,
            Adjustment::Decrement => minutes.checked_sub(1)?,
        };
        (MIN_LENGTH..=MAX_LENGTH).contains(&adjusted).then_some(adjusted)
    }
}

impl std::fmt::Display for Adjustment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Adjustment::Increment => write!(f, "increment"),
            Adjustment::Decrement => write!(f, "decrement"),
        }
    }
}

/// Everything the clock knows: both lengths, the countdown and the phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    /// Break length in minutes
    pub break_length: u32,
    /// Session length in minutes
    pub session_length: u32,
    /// Seconds left in the current phase. Signed because a tick may briefly
    /// take it below zero.
    pub time_left_seconds: i64,
    pub is_running: bool,
    pub phase: Phase,
}

impl TimerState {
    /// Create the default idle state: 25 minute session, 5 minute break
    pub fn new() -> Self {
        Self {
            break_length: DEFAULT_BREAK_LENGTH,
            session_length: DEFAULT_SESSION_LENGTH,
            time_left_seconds: i64::from(DEFAULT_SESSION_LENGTH) * 60,
            is_running: false,
            phase: Phase::Session,
        }
    }

    /// Whether the work interval is the active phase
    pub fn is_session_phase(&self) -> bool {
        self.phase == Phase::Session
    }

    /// Configured length of `phase` in minutes
    pub fn length(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Session => self.session_length,
            Phase::Break => self.break_length,
        }
    }

    /// Configured length of `phase` in seconds
    pub fn phase_seconds(&self, phase: Phase) -> i64 {
        i64::from(self.length(phase)) * 60
    }

    /// Change one of the lengths by a minute.
    ///
    /// Returns `false` without touching anything if the clock is running or
    /// the step would leave [1, 60]. Editing the active phase also restarts
    /// its countdown at the new length.
    pub fn adjust_length(&mut self, target: Phase, adjustment: Adjustment) -> bool {
        if self.is_running {
            return false;
        }

        let Some(minutes) = adjustment.apply(self.length(target)) else {
            return false;
        };

        match target {
            Phase::Session => self.session_length = minutes,
            Phase::Break => self.break_length = minutes,
        }

        if target == self.phase {
            self.time_left_seconds = self.phase_seconds(target);
        }

        true
    }

    /// Switch to the other phase and load its full length
    pub fn flip_phase(&mut self) {
        self.phase = self.phase.next();
        self.time_left_seconds = self.phase_seconds(self.phase);
    }

    /// Countdown formatted as `MM:SS`
    pub fn time_left(&self) -> String {
        format_time(self.time_left_seconds)
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new()
    }
}

/// Format seconds as zero padded `MM:SS`; negative values show as `00:00`
pub fn format_time(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
