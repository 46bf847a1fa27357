//! State management module
//!
//! This module contains the timer state, the state machine that drives it,
//! and the shared handle the HTTP layer talks to.

pub mod app_state;
pub mod machine;
pub mod timer_state;

// Re-export main types
pub use app_state::AppState;
pub use machine::{Action, Command, TimerStateMachine};
pub use timer_state::{format_time, Adjustment, Phase, TimerState};
