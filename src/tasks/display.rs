//! Terminal status line

use std::io::{self, Write};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::state::TimerState;

/// Render the status line for a state, e.g. `Session 24:59 [running]`
pub fn render_line(state: &TimerState) -> String {
    format!(
        "{} {} [{}]",
        state.phase.label(),
        state.time_left(),
        if state.is_running { "running" } else { "stopped" }
    )
}

/// Background task that redraws the status line whenever the timer changes
pub async fn display_task(mut updates: watch::Receiver<TimerState>) {
    info!("Starting display task");

    loop {
        let line = render_line(&updates.borrow_and_update());
        {
            let mut stdout = io::stdout().lock();
            if let Err(e) = write!(stdout, "\r{}", line).and_then(|_| stdout.flush()) {
                warn!("Failed to draw status line: {}", e);
            }
        }

        if updates.changed().await.is_err() {
            info!("Timer stopped publishing, stopping display task");
            break;
        }
    }
}
