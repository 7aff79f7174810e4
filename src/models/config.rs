//! Configuration data model and validation

use crate::types::{AppError, Phase, Result};
use crate::defaults;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Download phase duration in milliseconds
    #[serde(default = "default_download_ms")]
    pub download_duration_ms: u64,

    /// Upload phase duration in milliseconds
    #[serde(default = "default_upload_ms")]
    pub upload_duration_ms: u64,

    /// Ping phase duration in milliseconds
    #[serde(default = "default_ping_ms")]
    pub ping_duration_ms: u64,

    /// Interval between emitted samples in milliseconds
    #[serde(default = "default_tick_ms")]
    pub tick_interval_ms: u64,

    /// Delay between reset and the download phase in milliseconds
    #[serde(default = "default_start_delay_ms")]
    pub start_delay_ms: u64,

    /// IP geolocation endpoint
    #[serde(default = "default_geo_url")]
    pub geo_lookup_url: String,

    /// Geolocation request timeout
    #[serde(default = "default_geo_timeout_secs")]
    pub geo_timeout_seconds: u64,

    /// Perform the geolocation lookup at all
    #[serde(default = "default_true")]
    pub geo_enabled: bool,

    /// Catalog id of the displayed test server
    #[serde(default = "default_server_id")]
    pub server_id: u32,

    /// Link appended to shared results
    #[serde(default)]
    pub share_url: Option<String>,

    /// Platform share command, receives the result text on stdin
    #[serde(default)]
    pub share_command: Option<String>,

    /// Export results after the final run
    #[serde(default)]
    pub share: bool,

    /// Number of back-to-back runs
    #[serde(default = "default_runs")]
    pub runs: u32,

    /// Fixed RNG seed for reproducible runs
    #[serde(default)]
    pub seed: Option<u64>,

    /// Emit the run report as JSON instead of the result card
    #[serde(default)]
    pub json_output: bool,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            download_duration_ms: default_download_ms(),
            upload_duration_ms: default_upload_ms(),
            ping_duration_ms: default_ping_ms(),
            tick_interval_ms: default_tick_ms(),
            start_delay_ms: default_start_delay_ms(),
            geo_lookup_url: default_geo_url(),
            geo_timeout_seconds: default_geo_timeout_secs(),
            geo_enabled: true,
            server_id: default_server_id(),
            share_url: None,
            share_command: None,
            share: false,
            runs: default_runs(),
            seed: None,
            json_output: false,
            enable_color: default_enable_color(),
            verbose: false,
            debug: false,
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Duration of a single phase
    pub fn phase_duration(&self, phase: Phase) -> Duration {
        Duration::from_millis(match phase {
            Phase::Download => self.download_duration_ms,
            Phase::Upload => self.upload_duration_ms,
            Phase::Ping => self.ping_duration_ms,
        })
    }

    /// Get tick interval as Duration
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Get start delay as Duration
    pub fn start_delay(&self) -> Duration {
        Duration::from_millis(self.start_delay_ms)
    }

    /// Get geolocation timeout as Duration
    pub fn geo_timeout(&self) -> Duration {
        Duration::from_secs(self.geo_timeout_seconds)
    }

    /// Wall time of one full sequence, excluding scheduling slack
    pub fn total_run_duration(&self) -> Duration {
        Phase::ALL
            .iter()
            .map(|phase| self.phase_duration(*phase))
            .sum::<Duration>()
            + self.start_delay()
    }

    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Result<()> {
        for phase in Phase::ALL {
            let ms = self.phase_duration(phase).as_millis() as u64;
            if ms == 0 {
                return Err(AppError::config(format!("{} duration must be greater than 0", phase)));
            }
            if ms > defaults::MAX_PHASE_DURATION_MS {
                return Err(AppError::config(format!(
                    "{} duration cannot exceed {}ms",
                    phase,
                    defaults::MAX_PHASE_DURATION_MS
                )));
            }
        }

        if self.tick_interval_ms == 0 {
            return Err(AppError::config("Tick interval must be greater than 0"));
        }

        if self.tick_interval_ms > defaults::MAX_TICK_INTERVAL_MS {
            return Err(AppError::config(format!(
                "Tick interval cannot exceed {}ms",
                defaults::MAX_TICK_INTERVAL_MS
            )));
        }

        if self.start_delay_ms > defaults::MAX_PHASE_DURATION_MS {
            return Err(AppError::config("Start delay is unreasonably large"));
        }

        if self.runs == 0 {
            return Err(AppError::config("Run count must be greater than 0"));
        }

        if crate::servers::find_server(self.server_id).is_none() {
            return Err(AppError::config(format!(
                "Unknown server id {} (valid ids: {})",
                self.server_id,
                crate::servers::server_ids()
            )));
        }

        if self.geo_enabled {
            match url::Url::parse(&self.geo_lookup_url) {
                Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
                Ok(parsed) => {
                    return Err(AppError::config(format!(
                        "Geolocation URL must use HTTP(S), got '{}'",
                        parsed.scheme()
                    )));
                }
                Err(e) => {
                    return Err(AppError::config(format!(
                        "Invalid geolocation URL '{}': {}",
                        self.geo_lookup_url, e
                    )));
                }
            }

            if self.geo_timeout_seconds == 0 {
                return Err(AppError::config("Geolocation timeout must be greater than 0"));
            }
        }

        if let Some(share_url) = &self.share_url {
            if let Err(e) = url::Url::parse(share_url) {
                return Err(AppError::config(format!("Invalid share URL '{}': {}", share_url, e)));
            }
        }

        if let Some(command) = &self.share_command {
            if command.trim().is_empty() {
                return Err(AppError::config("Share command cannot be empty"));
            }
        }

        Ok(())
    }

    /// Merge values from an arbitrary key lookup
    pub fn merge_from_lookup<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parse_var<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T>
        where
            T::Err: std::fmt::Display,
        {
            raw.trim()
                .parse()
                .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, raw, e)))
        }

        if let Some(raw) = lookup("DOWNLOAD_DURATION_MS") {
            self.download_duration_ms = parse_var("DOWNLOAD_DURATION_MS", &raw)?;
        }

        if let Some(raw) = lookup("UPLOAD_DURATION_MS") {
            self.upload_duration_ms = parse_var("UPLOAD_DURATION_MS", &raw)?;
        }

        if let Some(raw) = lookup("PING_DURATION_MS") {
            self.ping_duration_ms = parse_var("PING_DURATION_MS", &raw)?;
        }

        if let Some(raw) = lookup("TICK_INTERVAL_MS") {
            self.tick_interval_ms = parse_var("TICK_INTERVAL_MS", &raw)?;
        }

        if let Some(raw) = lookup("START_DELAY_MS") {
            self.start_delay_ms = parse_var("START_DELAY_MS", &raw)?;
        }

        if let Some(raw) = lookup("GEO_LOOKUP_URL") {
            self.geo_lookup_url = raw.trim().to_string();
        }

        if let Some(raw) = lookup("GEO_TIMEOUT_SECONDS") {
            self.geo_timeout_seconds = parse_var("GEO_TIMEOUT_SECONDS", &raw)?;
        }

        if let Some(raw) = lookup("SERVER_ID") {
            self.server_id = parse_var("SERVER_ID", &raw)?;
        }

        if let Some(raw) = lookup("SHARE_URL") {
            let raw = raw.trim();
            self.share_url = (!raw.is_empty()).then(|| raw.to_string());
        }

        if let Some(raw) = lookup("SHARE_COMMAND") {
            let raw = raw.trim();
            self.share_command = (!raw.is_empty()).then(|| raw.to_string());
        }

        if let Some(raw) = lookup("ENABLE_COLOR") {
            self.enable_color = parse_var("ENABLE_COLOR", &raw)?;
        }

        Ok(())
    }
}

// Default value functions for serde
fn default_download_ms() -> u64 {
    defaults::DEFAULT_DOWNLOAD_DURATION.as_millis() as u64
}

fn default_upload_ms() -> u64 {
    defaults::DEFAULT_UPLOAD_DURATION.as_millis() as u64
}

fn default_ping_ms() -> u64 {
    defaults::DEFAULT_PING_DURATION.as_millis() as u64
}

fn default_tick_ms() -> u64 {
    defaults::DEFAULT_TICK_INTERVAL.as_millis() as u64
}

fn default_start_delay_ms() -> u64 {
    defaults::DEFAULT_START_DELAY.as_millis() as u64
}

fn default_geo_url() -> String {
    defaults::DEFAULT_GEO_LOOKUP_URL.to_string()
}

fn default_geo_timeout_secs() -> u64 {
    defaults::DEFAULT_GEO_TIMEOUT.as_secs()
}

fn default_server_id() -> u32 {
    defaults::DEFAULT_SERVER_ID
}

fn default_runs() -> u32 {
    defaults::DEFAULT_RUNS
}

fn default_enable_color() -> bool {
    defaults::DEFAULT_ENABLE_COLOR
}

fn default_true() -> bool {
    true
}
