//! HTTP API module
//!
//! This module contains the control endpoints a client uses to drive and
//! display the clock.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/length/:target/:adjustment", post(adjust_length_handler))
        .route("/start_stop", post(start_stop_handler))
        .route("/reset", post(reset_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{self, Body},
        http::{Method, Request, StatusCode},
    };
    use tokio::sync::mpsc;
    use tower::ServiceExt;

    use crate::state::TimerStateMachine;
    use super::responses::{ApiResponse, HealthResponse, StatusResponse};

    fn spawn_app() -> Router {
        let machine = TimerStateMachine::new();
        let (command_tx, command_rx) = mpsc::channel(8);
        let state = Arc::new(AppState::new(
            20525,
            "127.0.0.1".to_string(),
            command_tx,
            machine.watch_updates(),
        ));
        tokio::spawn(machine.run(command_rx));
        create_router(state)
    }

    async fn call<T: serde::de::DeserializeOwned>(app: &Router, method: Method, uri: &str) -> T {
        let response = app
            .clone()
            .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_session_increment_updates_countdown() {
        let app = spawn_app();

        let response: ApiResponse = call(&app, Method::POST, "/length/session/increment").await;
        assert_eq!(response.status, "stopped");
        assert_eq!(response.timer.session_length, 26);
        assert_eq!(response.timer.time_left, "26:00");
        assert_eq!(response.timer.time_left_seconds, 1560);

        let status: StatusResponse = call(&app, Method::GET, "/status").await;
        assert_eq!(status.timer.session_length, 26);
        assert_eq!(status.last_action.as_deref(), Some("session-increment"));
        assert_eq!(status.port, 20525);
    }

    #[tokio::test]
    async fn test_lengths_locked_while_running() {
        let app = spawn_app();

        let started: ApiResponse = call(&app, Method::POST, "/start_stop").await;
        assert_eq!(started.status, "running");
        assert!(started.timer.running);

        let response: ApiResponse = call(&app, Method::POST, "/length/break/decrement").await;
        assert_eq!(response.timer.break_length, 5);

        let stopped: ApiResponse = call(&app, Method::POST, "/start_stop").await;
        assert_eq!(stopped.status, "stopped");
    }

    #[tokio::test]
    async fn test_reset_restores_defaults() {
        let app = spawn_app();
        let _: ApiResponse = call(&app, Method::POST, "/length/break/increment").await;
        let _: ApiResponse = call(&app, Method::POST, "/length/session/decrement").await;
        let _: ApiResponse = call(&app, Method::POST, "/start_stop").await;

        let response: ApiResponse = call(&app, Method::POST, "/reset").await;
        assert_eq!(response.timer.break_length, 5);
        assert_eq!(response.timer.session_length, 25);
        assert_eq!(response.timer.time_left, "25:00");
        assert_eq!(response.timer.timer_label, "Session");
        assert!(!response.timer.running);
    }

    #[tokio::test]
    async fn test_unknown_target_rejected() {
        let app = spawn_app();
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/length/lunch/increment")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_health() {
        let app = spawn_app();
        let health: HealthResponse = call(&app, Method::GET, "/health").await;
        assert_eq!(health.status, "ok");
        assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
    }
}
