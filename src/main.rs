//! Pomodoro Clock - a countdown timer alternating work sessions and breaks
//!
//! This is the main entry point for the pomodoro-clock daemon.

use std::sync::Arc;
use tokio::{net::TcpListener, sync::mpsc};
use tracing::info;

use pomodoro_clock::{
    api::create_router,
    config::Config,
    state::{AppState, TimerStateMachine},
    tasks::{alert_task, display_task},
    utils::shutdown_signal,
};

/// Pending commands buffered between the HTTP layer and the timer
const COMMAND_BUFFER: usize = 32;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    let filter = format!("pomodoro_clock={},tower_http=info", config.log_level());
    if config.logs_to_stderr() {
        // Keep stdout for the status line
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .init();
    }

    info!("Starting pomodoro-clock server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, silent={}, display={}",
          config.host, config.port, config.silent, config.display);

    // Create the timer state machine and the handle shared with the API
    let machine = TimerStateMachine::new();
    let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        command_tx,
        machine.watch_updates(),
    ));

    // Start the alert player and the optional status line before the clock
    tokio::spawn(alert_task(machine.subscribe_events(), config.alert_player()));
    if config.display {
        tokio::spawn(display_task(machine.watch_updates()));
    }

    let clock = tokio::spawn(machine.run(command_rx));

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /length/:target/:adjustment - Change session/break length (increment|decrement)");
    info!("  POST /start_stop                 - Start or stop the countdown");
    info!("  POST /reset                      - Restore the default timer");
    info!("  GET  /status                     - Current countdown and server status");
    info!("  GET  /health                     - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    // Cancel the ticker and any pending phase flip before exiting
    if state.shutdown().await.is_ok() {
        clock.await?;
    }

    info!("Server shutdown complete");
    Ok(())
}
