//! Configuration and CLI argument handling

use std::time::Duration;

use clap::Parser;

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "tiny-timer")]
#[command(about = "A countdown timer with question laps, driven from stdin")]
#[command(version = "0.3.0")]
pub struct Config {
    /// Countdown duration as HH:MM:SS, MM:SS or seconds
    #[arg(short, long, default_value = "00:05:00")]
    pub duration: String,

    /// Tick period in milliseconds; each tick removes one second
    #[arg(short, long, default_value = "1000")]
    pub interval_ms: u64,

    /// Print events as JSON lines
    #[arg(long)]
    pub json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Period of the repeating timer
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}
