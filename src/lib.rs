//! Pomodoro Clock - a countdown timer alternating work sessions and breaks
//!
//! The core is [`TimerStateMachine`]: one task owning the timer state, a
//! 1 Hz ticker and the delayed phase flip. An HTTP control surface and an
//! optional terminal status line render it; an [`AlertPlayer`] sounds the
//! alert when a phase ends.

pub mod api;
pub mod config;
pub mod events;
pub mod services;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use events::ClockEvent;
pub use services::AlertPlayer;
pub use state::{AppState, TimerState, TimerStateMachine};
pub use utils::signals::shutdown_signal;
