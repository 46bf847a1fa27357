//! Shared application state handed to the HTTP layer

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use super::{
    machine::{Action, Command},
    Adjustment, Phase, TimerState,
};

/// Handle to the running timer plus server metadata
#[derive(Debug)]
pub struct AppState {
    /// Commands for the timer state machine task
    pub command_tx: mpsc::Sender<Command>,
    /// Latest state published by the machine
    pub timer_update_rx: watch::Receiver<TimerState>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl AppState {
    /// Create a new AppState around the machine's channels
    pub fn new(
        port: u16,
        host: String,
        command_tx: mpsc::Sender<Command>,
        timer_update_rx: watch::Receiver<TimerState>,
    ) -> Self {
        Self {
            command_tx,
            timer_update_rx,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
        }
    }

    /// Send an action to the machine and wait for the resulting state
    pub async fn dispatch(&self, action: Action) -> Result<TimerState, String> {
        let (command, reply) = Command::new(action);

        self.command_tx.send(command).await
            .map_err(|e| format!("Failed to send {} to timer: {}", action, e))?;

        let state = reply.await
            .map_err(|e| format!("Timer dropped reply to {}: {}", action, e))?;

        debug!("Dispatched {}: {:?}", action, state);

        // Update last action tracking
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }

        Ok(state)
    }

    /// Change a phase length by one minute
    pub async fn adjust_length(&self, target: Phase, adjustment: Adjustment) -> Result<TimerState, String> {
        self.dispatch(Action::AdjustLength(target, adjustment)).await
    }

    /// Start or stop the countdown
    pub async fn toggle_start_stop(&self) -> Result<TimerState, String> {
        self.dispatch(Action::ToggleStartStop).await
    }

    /// Restore the default state
    pub async fn reset(&self) -> Result<TimerState, String> {
        self.dispatch(Action::Reset).await
    }

    /// Stop the machine task, cancelling its timers
    pub async fn shutdown(&self) -> Result<TimerState, String> {
        let result = self.dispatch(Action::Shutdown).await;
        if let Err(e) = &result {
            warn!("Timer shutdown failed: {}", e);
        }
        result
    }

    /// Get current timer state
    pub fn get_timer_state(&self) -> TimerState {
        self.timer_update_rx.borrow().clone()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
