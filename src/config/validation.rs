//! Configuration validation utilities and rules

use crate::{
    error::Result,
    models::Config,
    types::Phase,
};
use colored::*;

/// Runs above this count get a warning about total session length
const MANY_RUNS: u32 = 10;

/// Configuration validator with advisory checks on top of `Config::validate`
pub struct ConfigValidator;

impl ConfigValidator {
    /// Hard validation first, then collect advisory warnings
    pub fn validate_comprehensive(config: &Config) -> Result<Vec<ValidationWarning>> {
        config.validate()?;

        let mut warnings = Vec::new();
        warnings.extend(Self::validate_timing(config));
        warnings.extend(Self::validate_geo(config));
        warnings.extend(Self::validate_share(config));
        Ok(warnings)
    }

    fn validate_timing(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();
        let tick = config.tick_interval();

        for phase in Phase::ALL {
            let duration = config.phase_duration(phase);
            if tick >= duration {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Warning,
                    format!(
                        "Tick interval ({}ms) is not shorter than the {} phase ({}ms); only the final value will be shown",
                        config.tick_interval_ms,
                        phase,
                        duration.as_millis()
                    ),
                ));
            }
        }

        if config.tick_interval_ms < 16 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!(
                    "Tick interval of {}ms redraws faster than most terminals refresh",
                    config.tick_interval_ms
                ),
            ));
        }

        if config.runs > MANY_RUNS {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!(
                    "{} runs will take about {}s",
                    config.runs,
                    (config.total_run_duration() * config.runs).as_secs()
                ),
            ));
        }

        warnings
    }

    fn validate_geo(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();
        if !config.geo_enabled {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                "Location lookup disabled; ISP and location will show as Unavailable".to_string(),
            ));
            return warnings;
        }

        if let Ok(parsed) = url::Url::parse(&config.geo_lookup_url) {
            if parsed.scheme() == "http" {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Warning,
                    format!("Geolocation URL '{}' uses HTTP instead of HTTPS", config.geo_lookup_url),
                ));
            }
            if let Some(url::Host::Ipv4(ip)) = parsed.host() {
                if ip.is_private() || ip.is_loopback() {
                    warnings.push(ValidationWarning::new(
                        ValidationLevel::Info,
                        format!("Geolocation URL '{}' targets a private/local network", config.geo_lookup_url),
                    ));
                }
            }
        }

        warnings
    }

    fn validate_share(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();
        if !config.share && (config.share_command.is_some() || config.share_url.is_some()) {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                "Share settings are ignored without --share".to_string(),
            ));
        }
        warnings
    }
}

/// Validation warning levels
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationLevel {
    Info,
    Warning,
    Error,
}

impl ValidationLevel {
    /// Get display string for level
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }

    /// Get color for terminal display
    pub fn color(&self) -> Color {
        match self {
            Self::Info => Color::Blue,
            Self::Warning => Color::Yellow,
            Self::Error => Color::Red,
        }
    }
}

/// Configuration validation warning
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub level: ValidationLevel,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(level: ValidationLevel, message: String) -> Self {
        Self { level, message }
    }

    /// Format warning for display
    pub fn format(&self, use_color: bool) -> String {
        let tag = format!("[{}]", self.level.as_str());
        if use_color {
            format!("{} {}", tag.color(self.level.color()).bold(), self.message)
        } else {
            format!("{} {}", tag, self.message)
        }
    }
}

/// Convenience function for comprehensive configuration validation
pub fn validate_config(config: &Config) -> Result<Vec<ValidationWarning>> {
    ConfigValidator::validate_comprehensive(config)
}
