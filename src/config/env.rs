//! Environment variable handling and .env file management

use crate::defaults::{MAX_PHASE_DURATION_MS, MAX_TICK_INTERVAL_MS};
use crate::error::{AppError, Result};
use std::path::Path;

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load .env file if it exists
    pub fn load_env_file(debug: bool) -> Result<()> {
        Self::load_env_file_from(Path::new(".env"), debug)
    }

    /// Load a specific env file. Variables already set in the process win.
    pub fn load_env_file_from(path: &Path, debug: bool) -> Result<()> {
        if path.exists() {
            dotenv::from_path(path)
                .map_err(|e| AppError::config(format!("Failed to load {}: {}", path.display(), e)))?;

            if debug {
                eprintln!("Loaded configuration from {}", path.display());
            }
        } else if debug {
            eprintln!("No {} file found, using defaults and CLI arguments", path.display());
        }

        Ok(())
    }

    /// Create example .env file content
    pub fn create_example_env_content() -> String {
        r#"# PingPanic Configuration
#
# Values here are used as defaults and can be overridden by
# environment variables and command-line arguments.

# Phase lengths in milliseconds
# DOWNLOAD_DURATION_MS=8000
# UPLOAD_DURATION_MS=8000
# PING_DURATION_MS=1500

# Gauge update interval in milliseconds
# TICK_INTERVAL_MS=150

# Pause before the download phase starts
# START_DELAY_MS=100

# ISP/location lookup
# GEO_LOOKUP_URL=https://api.ip.sb/geoip
# GEO_TIMEOUT_SECONDS=5

# Server shown with the results (1-5, see --list-servers)
# SERVER_ID=1

# Sharing
# SHARE_URL=https://pingpanic.example
# SHARE_COMMAND=termux-share

# Enable colored output (true/false)
# ENABLE_COLOR=true

# Quick demo run:
# DOWNLOAD_DURATION_MS=2000
# UPLOAD_DURATION_MS=2000
# PING_DURATION_MS=500
"#
        .to_string()
    }

    /// Validate environment variable format before parsing
    pub fn validate_env_var(key: &str, value: &str) -> Result<()> {
        fn millis(key: &str, value: &str, max: u64) -> Result<()> {
            let ms: u64 = value
                .trim()
                .parse()
                .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))?;
            if ms == 0 || ms > max {
                return Err(AppError::config(format!(
                    "{} must be between 1 and {}, got: {}",
                    key, max, ms
                )));
            }
            Ok(())
        }

        match key {
            "DOWNLOAD_DURATION_MS" | "UPLOAD_DURATION_MS" | "PING_DURATION_MS" => {
                millis(key, value, MAX_PHASE_DURATION_MS)?;
            }
            "TICK_INTERVAL_MS" => {
                millis(key, value, MAX_TICK_INTERVAL_MS)?;
            }
            "START_DELAY_MS" => {
                value
                    .trim()
                    .parse::<u64>()
                    .map_err(|e| AppError::config(format!("Invalid START_DELAY_MS value '{}': {}", value, e)))?;
            }
            "GEO_LOOKUP_URL" | "SHARE_URL" => {
                url::Url::parse(value.trim())
                    .map_err(|e| AppError::config(format!("Invalid {} entry '{}': {}", key, value, e)))?;
            }
            "GEO_TIMEOUT_SECONDS" => {
                let secs: u64 = value
                    .trim()
                    .parse()
                    .map_err(|e| AppError::config(format!("Invalid GEO_TIMEOUT_SECONDS value '{}': {}", value, e)))?;
                if secs == 0 || secs > 60 {
                    return Err(AppError::config(format!(
                        "GEO_TIMEOUT_SECONDS must be between 1 and 60, got: {}",
                        secs
                    )));
                }
            }
            "SERVER_ID" => {
                let id: u32 = value
                    .trim()
                    .parse()
                    .map_err(|e| AppError::config(format!("Invalid SERVER_ID value '{}': {}", value, e)))?;
                if crate::servers::find_server(id).is_none() {
                    return Err(AppError::config(format!(
                        "SERVER_ID must be one of {}, got: {}",
                        crate::servers::server_ids(),
                        id
                    )));
                }
            }
            "ENABLE_COLOR" => {
                value
                    .trim()
                    .parse::<bool>()
                    .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", value, e)))?;
            }
            _ => {}
        }

        Ok(())
    }

    /// Supported environment variables with descriptions and examples
    pub fn get_supported_env_vars() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            ("DOWNLOAD_DURATION_MS", "Download phase length in ms", "8000"),
            ("UPLOAD_DURATION_MS", "Upload phase length in ms", "8000"),
            ("PING_DURATION_MS", "Ping phase length in ms", "1500"),
            ("TICK_INTERVAL_MS", "Gauge update interval in ms", "150"),
            ("START_DELAY_MS", "Pause before the first phase in ms", "100"),
            ("GEO_LOOKUP_URL", "Geolocation endpoint", "https://api.ip.sb/geoip"),
            ("GEO_TIMEOUT_SECONDS", "Geolocation timeout (1-60)", "5"),
            ("SERVER_ID", "Server shown with the results", "1"),
            ("SHARE_URL", "Link appended to the share text", "https://pingpanic.example"),
            ("SHARE_COMMAND", "Program that receives the share text", "termux-share"),
            ("ENABLE_COLOR", "Enable colored output", "true"),
        ]
    }

    /// Display environment variable help
    pub fn display_env_help() -> String {
        let mut help = String::new();
        help.push_str("Supported Environment Variables:\n\n");

        for (var, description, example) in Self::get_supported_env_vars() {
            help.push_str(&format!("  {:<22} {}\n", var, description));
            help.push_str(&format!("  {:<22} Example: {}\n\n", "", example));
        }

        help.push_str("Configuration Priority (highest to lowest):\n");
        help.push_str("  1. Command-line arguments\n");
        help.push_str("  2. Environment variables\n");
        help.push_str("  3. .env file values\n");
        help.push_str("  4. Default values\n");

        help
    }

    /// Validate the lines of an env file, returning one warning per bad entry
    pub fn check_env_content(content: &str) -> Vec<String> {
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| {
                let (key, value) = line.split_once('=')?;
                Self::validate_env_var(key.trim(), value.trim())
                    .err()
                    .map(|e| format!("Line '{}': {}", line, e))
            })
            .collect()
    }

    /// Check an env file's lines, or `None` when it does not exist
    pub fn check_env_file(path: &Path) -> Result<Option<Vec<String>>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::config(format!("Failed to read .env file: {}", e)))?;
        Ok(Some(Self::check_env_content(&content)))
    }
}
