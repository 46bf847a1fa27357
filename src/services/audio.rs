//! Alert playback

use std::{
    io::{self, Write},
    time::Duration,
};
use tracing::{debug, info, warn};

/// ASCII bell, the alert sound of a terminal
const BELL: &[u8] = b"\x07";

/// Something that can play the phase alert
pub trait AlertPlayer: Send {
    /// Start playing from the current position
    fn play(&mut self);

    /// Stop playing, keeping the position
    fn pause(&mut self);

    /// Move the playback position
    fn set_position(&mut self, position: Duration);
}

impl<P: AlertPlayer + ?Sized> AlertPlayer for Box<P> {
    fn play(&mut self) {
        (**self).play()
    }

    fn pause(&mut self) {
        (**self).pause()
    }

    fn set_position(&mut self, position: Duration) {
        (**self).set_position(position)
    }
}

/// Rings the terminal bell on stdout
#[derive(Debug, Default)]
pub struct TerminalBell {
    playing: bool,
    position: Duration,
}

impl TerminalBell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the alert is playing
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Current playback position
    pub fn position(&self) -> Duration {
        self.position
    }

    fn ring(&self) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(BELL)?;
        stdout.flush()
    }
}

impl AlertPlayer for TerminalBell {
    fn play(&mut self) {
        info!("Playing alert");
        self.playing = true;
        if let Err(e) = self.ring() {
            warn!("Failed to ring terminal bell: {}", e);
        }
    }

    fn pause(&mut self) {
        debug!("Pausing alert");
        self.playing = false;
    }

    fn set_position(&mut self, position: Duration) {
        self.position = position;
    }
}

/// Logs alerts instead of making noise
#[derive(Debug, Default)]
pub struct SilentPlayer;

impl AlertPlayer for SilentPlayer {
    fn play(&mut self) {
        info!("Alert (silent)");
    }

    fn pause(&mut self) {
        debug!("Alert paused (silent)");
    }

    fn set_position(&mut self, position: Duration) {
        debug!("Alert rewound to {:?} (silent)", position);
    }
}
