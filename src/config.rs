//! Configuration and CLI argument handling

use std::{path::PathBuf, time::Duration};

use clap::Parser;

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "interval-timer")]
#[command(about = "An interval-training timer daemon with drift-free phase tracking")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Directory holding the settings file
    #[arg(short, long, default_value = ".")]
    pub settings_dir: PathBuf,

    /// Wake granularity of the session ticker in milliseconds
    #[arg(long, default_value = "250")]
    pub tick_ms: u64,

    /// Command used to play cue tones; receives the tone name as its argument
    #[arg(long)]
    pub cue_command: Option<String>,

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

    /// Ticker wake interval, never below one millisecond
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::try_parse_from(["interval-timer"]).unwrap();
        assert_eq!(config.address(), "0.0.0.0:20554");
        assert_eq!(config.tick(), Duration::from_millis(250));
        assert_eq!(config.log_level(), "info");
        assert!(config.cue_command.is_none());
    }

    #[test]
    fn zero_tick_is_raised() {
        let config = Config::try_parse_from(["interval-timer", "--tick-ms", "0", "-v"]).unwrap();
        assert_eq!(config.tick(), Duration::from_millis(1));
        assert_eq!(config.log_level(), "debug");
    }
}
