//! External collaborators module
//!
//! This module contains the interfaces to things outside the timer core,
//! currently the alert player.

pub mod audio;

// Re-export main types
pub use audio::{AlertPlayer, SilentPlayer, TerminalBell};
