//! Events emitted by the timer state machine
//!
//! Consumers (the alert task, anything else that subscribes) react to these
//! instead of the machine calling side effects directly.

use serde::{Deserialize, Serialize};

use crate::state::Phase;

/// Transitions of the clock worth telling the outside world about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClockEvent {
    /// Countdown resumed
    Started { phase: Phase, time_left_seconds: i64 },

    /// Countdown paused
    Stopped { phase: Phase, time_left_seconds: i64 },

    /// A phase length was edited while idle
    LengthAdjusted { target: Phase, minutes: u32 },

    /// Countdown reached zero; the alert should sound now
    PhaseEnded { phase: Phase },

    /// The display switched to the next phase after the alert delay
    PhaseTransitioned { phase: Phase, time_left_seconds: i64 },

    /// Everything went back to defaults
    Reset,
}

impl std::fmt::Display for ClockEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClockEvent::Started { phase, time_left_seconds } => {
                write!(f, "STARTED ({} {}s)", phase, time_left_seconds)
            }
            ClockEvent::Stopped { phase, time_left_seconds } => {
                write!(f, "STOPPED ({} {}s)", phase, time_left_seconds)
            }
            ClockEvent::LengthAdjusted { target, minutes } => {
                write!(f, "LENGTH_ADJUSTED ({} {}min)", target, minutes)
            }
            ClockEvent::PhaseEnded { phase } => write!(f, "PHASE_ENDED ({})", phase),
            ClockEvent::PhaseTransitioned { phase, time_left_seconds } => {
                write!(f, "PHASE_TRANSITIONED ({} {}s)", phase, time_left_seconds)
            }
            ClockEvent::Reset => write!(f, "RESET"),
        }
    }
}
