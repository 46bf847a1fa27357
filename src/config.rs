//! Configuration and CLI argument handling

use clap::Parser;

use crate::services::{AlertPlayer, SilentPlayer, TerminalBell};

/// CLI argument parsing structure
#[derive(Parser)]
#[command(name = "pomodoro-clock")]
#[command(about = "A countdown timer alternating work sessions and breaks")]
#[command(version)]
pub struct Config {
    /// Port to bind the control server to
    #[arg(short, long, default_value = "20525")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Log alerts instead of ringing the terminal bell
    #[arg(short, long)]
    pub silent: bool,

    /// Draw a status line with the countdown on stdout
    #[arg(short, long)]
    pub display: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Whether logs must stay off stdout because the status line owns it
    pub fn logs_to_stderr(&self) -> bool {
        self.display
    }

    /// Build the alert player selected on the command line
    pub fn alert_player(&self) -> Box<dyn AlertPlayer> {
        if self.silent {
            Box::new(SilentPlayer)
        } else {
            Box::new(TerminalBell::new())
        }
    }
}
