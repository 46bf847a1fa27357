//! Background tasks module
//!
//! This module contains background tasks that run alongside the timer and
//! the HTTP server.

pub mod alert;
pub mod display;

// Re-export main functions
pub use alert::alert_task;
pub use display::display_task;
