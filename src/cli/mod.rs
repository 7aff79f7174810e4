//! Command-line interface

use crate::defaults::{MAX_PHASE_DURATION_MS, MAX_TICK_INTERVAL_MS};
use clap::Parser;

/// PingPanic - a simulated internet speed test with a live gauge
#[derive(Parser, Debug, Clone)]
#[command(name = "pingpanic")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Server to show results against (see --list-servers)
    #[arg(short, long, value_name = "ID")]
    pub server: Option<u32>,

    /// List the available servers and exit
    #[arg(long)]
    pub list_servers: bool,

    /// Show supported environment variables and an example .env file, then exit
    #[arg(long)]
    pub env_help: bool,

    /// Number of back-to-back test runs
    #[arg(short, long, value_name = "N", value_parser = parse_runs)]
    pub runs: Option<u32>,

    /// Seed for reproducible results
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Download phase length in milliseconds
    #[arg(long, value_name = "MS", value_parser = parse_phase_millis)]
    pub download_ms: Option<u64>,

    /// Upload phase length in milliseconds
    #[arg(long, value_name = "MS", value_parser = parse_phase_millis)]
    pub upload_ms: Option<u64>,

    /// Ping phase length in milliseconds
    #[arg(long, value_name = "MS", value_parser = parse_phase_millis)]
    pub ping_ms: Option<u64>,

    /// Gauge update interval in milliseconds
    #[arg(long, value_name = "MS", value_parser = parse_tick_millis)]
    pub tick_ms: Option<u64>,

    /// Pause before the download phase starts, in milliseconds
    #[arg(long, value_name = "MS")]
    pub start_delay_ms: Option<u64>,

    /// Skip the ISP/location lookup
    #[arg(long)]
    pub no_geo: bool,

    /// Geolocation endpoint
    #[arg(long, value_name = "URL")]
    pub geo_url: Option<String>,

    /// Share the results when the test completes
    #[arg(long)]
    pub share: bool,

    /// Program that receives the share text on stdin
    #[arg(long, value_name = "CMD")]
    pub share_command: Option<String>,

    /// Link appended to the share text
    #[arg(long, value_name = "URL")]
    pub share_url: Option<String>,

    /// Print the session report as JSON instead of the result card
    #[arg(long)]
    pub json: bool,

    /// Force colored output
    #[arg(long)]
    pub color: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Validate CLI arguments for conflicts and requirements
    pub fn validate(&self) -> Result<(), String> {
        if self.color && self.no_color {
            return Err("Cannot specify both --color and --no-color".to_string());
        }

        if self.no_geo && self.geo_url.is_some() {
            return Err("--geo-url has no effect with --no-geo".to_string());
        }

        if let Some(url) = &self.geo_url {
            url::Url::parse(url).map_err(|e| format!("Invalid geolocation URL '{}': {}", url, e))?;
        }

        if let Some(url) = &self.share_url {
            url::Url::parse(url).map_err(|e| format!("Invalid share URL '{}': {}", url, e))?;
        }

        if let Some(command) = &self.share_command {
            if command.trim().is_empty() {
                return Err("--share-command cannot be empty".to_string());
            }
        }

        Ok(())
    }

    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        if self.color {
            true
        } else if self.no_color {
            false
        } else {
            supports_color()
        }
    }

    /// Whether color was set explicitly on the command line
    pub fn color_overridden(&self) -> bool {
        self.color || self.no_color
    }
}

fn parse_millis(s: &str, max: u64, what: &str) -> Result<u64, String> {
    if s.starts_with('+') || s.starts_with("0x") || s.starts_with("0X") {
        return Err(format!("Invalid {}: {}", what, s));
    }

    s.parse::<u64>()
        .map_err(|_| format!("Invalid {}: {}", what, s))
        .and_then(|ms| {
            if ms == 0 {
                Err(format!("{} must be greater than 0", what))
            } else if ms > max {
                Err(format!("{} cannot exceed {} ms", what, max))
            } else {
                Ok(ms)
            }
        })
}

fn parse_phase_millis(s: &str) -> Result<u64, String> {
    parse_millis(s, MAX_PHASE_DURATION_MS, "phase duration")
}

fn parse_tick_millis(s: &str) -> Result<u64, String> {
    parse_millis(s, MAX_TICK_INTERVAL_MS, "tick interval")
}

fn parse_runs(s: &str) -> Result<u32, String> {
    match s.parse::<u32>() {
        Ok(0) => Err("runs must be at least 1".to_string()),
        Ok(runs) => Ok(runs),
        Err(_) => Err(format!("Invalid run count: {}", s)),
    }
}

/// Check if the terminal supports color output
fn supports_color() -> bool {
    supports_color_with(|key| std::env::var(key).ok())
}

fn supports_color_with<F>(lookup: F) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    if lookup("TERM").is_some_and(|term| term == "dumb") {
        return false;
    }

    if lookup("NO_COLOR").is_some() {
        return false;
    }

    if lookup("FORCE_COLOR").is_some() {
        return true;
    }

    #[cfg(target_os = "windows")]
    {
        if lookup("ANSICON").is_some() || lookup("ConEmuANSI").is_some() {
            return true;
        }
    }

    cfg!(unix)
}
