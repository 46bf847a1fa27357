//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::TimerState;

/// What a client needs to draw the clock
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerView {
    pub break_length: u32,
    pub session_length: u32,
    /// Countdown as `MM:SS`
    pub time_left: String,
    pub time_left_seconds: i64,
    /// "Session" or "Break"
    pub timer_label: String,
    pub running: bool,
}

impl From<&TimerState> for TimerView {
    fn from(state: &TimerState) -> Self {
        Self {
            break_length: state.break_length,
            session_length: state.session_length,
            time_left: state.time_left(),
            time_left_seconds: state.time_left_seconds,
            timer_label: state.phase.label().to_string(),
            running: state.is_running,
        }
    }
}

/// API response structure for action endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerView,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: String, message: String, timer: TimerView) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            timer,
        }
    }

    /// Create a response whose status reflects whether the clock is running
    pub fn for_state(message: String, state: &TimerState) -> Self {
        let status = if state.is_running { "running" } else { "stopped" };
        Self::new(status.to_string(), message, TimerView::from(state))
    }
}

/// Status response with server information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub timer: TimerView,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_view_from_state() {
        let mut state = TimerState::new();
        state.time_left_seconds = 61;

        let view = TimerView::from(&state);
        assert_eq!(view.time_left, "01:01");
        assert_eq!(view.timer_label, "Session");
        assert_eq!(view.session_length, 25);
        assert_eq!(view.break_length, 5);
        assert!(!view.running);
    }

    #[test]
    fn test_response_status_follows_running() {
        let mut state = TimerState::new();
        assert_eq!(ApiResponse::for_state("idle".to_string(), &state).status, "stopped");

        state.is_running = true;
        assert_eq!(ApiResponse::for_state("go".to_string(), &state).status, "running");
    }
}
