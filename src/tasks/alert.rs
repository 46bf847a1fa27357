//! Alert background task

use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

use crate::{events::ClockEvent, services::AlertPlayer};

/// Background task that plays the alert when a phase ends and rewinds it on reset
pub async fn alert_task<P: AlertPlayer>(mut events: broadcast::Receiver<ClockEvent>, mut player: P) {
    info!("Starting alert task");

    loop {
        match events.recv().await {
            Ok(ClockEvent::PhaseEnded { phase }) => {
                info!("{} ended, sounding alert", phase);
                player.play();
            }
            Ok(ClockEvent::Reset) => {
                debug!("Timer reset, rewinding alert");
                player.pause();
                player.set_position(Duration::ZERO);
            }
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => {
                warn!("Alert task lagged, skipped {} events", skipped);
            }
            Err(RecvError::Closed) => {
                info!("Event channel closed, stopping alert task");
                break;
            }
        }
    }
}
