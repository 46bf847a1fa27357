//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use tracing::{error, info};

use crate::state::{Adjustment, AppState, Phase};
use super::responses::{ApiResponse, HealthResponse, StatusResponse, TimerView};

/// Handle POST /length/:target/:adjustment - Change a phase length by a minute
pub async fn adjust_length_handler(
    State(state): State<Arc<AppState>>,
    Path((target, adjustment)): Path<(Phase, Adjustment)>,
) -> Result<Json<ApiResponse>, StatusCode> {
    match state.adjust_length(target, adjustment).await {
        Ok(timer) => {
            info!("Length endpoint called - {} {}", target, adjustment);
            Ok(Json(ApiResponse::for_state(
                format!("{} length is {} minutes", target, timer.length(target)),
                &timer,
            )))
        }
        Err(e) => {
            error!("Failed to adjust {} length: {}", target, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /start_stop - Start or stop the countdown
pub async fn start_stop_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    match state.toggle_start_stop().await {
        Ok(timer) => {
            info!("Start/stop endpoint called - running={}", timer.is_running);
            let message = if timer.is_running { "Countdown started" } else { "Countdown stopped" };
            Ok(Json(ApiResponse::for_state(message.to_string(), &timer)))
        }
        Err(e) => {
            error!("Failed to toggle countdown: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /reset - Restore the default state
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    match state.reset().await {
        Ok(timer) => {
            info!("Reset endpoint called - timer restored to defaults");
            Ok(Json(ApiResponse::for_state("Timer reset".to_string(), &timer)))
        }
        Err(e) => {
            error!("Failed to reset timer: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle GET /status - Return current timer and server status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let timer = state.get_timer_state();
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        timer: TimerView::from(&timer),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
