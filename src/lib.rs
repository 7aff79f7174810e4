//! PingPanic
//!
//! A terminal speed test simulator. Download, upload and ping values are
//! synthetic: a timer-driven phase runner ramps towards a randomly drawn
//! ceiling with jitter, and a sequencer chains the three phases while
//! streaming samples to a live gauge and a fluctuation chart.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod geo;
pub mod logging;
pub mod models;
pub mod output;
pub mod servers;
pub mod share;
pub mod simulation;
pub mod types;

// Re-export commonly used types
pub use error::{AppError, Result};
pub use models::{Config, RunReport, SamplePoint, SessionReport, TestOutcome, UserInfo};
pub use simulation::{PhaseRunner, PhaseObserver, SpeedTest, StateStore, SpeedTestState};
pub use types::{Phase, TestStatus};
pub use output::{OutputFormatter, ColoredFormatter, PlainFormatter, OutputFormatterFactory};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// One-line build description for debug output
pub fn build_info() -> String {
    format!(
        "{} v{} ({}, built {}, {})",
        PKG_NAME,
        VERSION,
        option_env!("GIT_COMMIT").unwrap_or("unknown commit"),
        env!("BUILD_TIME"),
        env!("TARGET_TRIPLE")
    )
}

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    pub const DEFAULT_DOWNLOAD_DURATION: Duration = Duration::from_millis(8000);
    pub const DEFAULT_UPLOAD_DURATION: Duration = Duration::from_millis(8000);
    pub const DEFAULT_PING_DURATION: Duration = Duration::from_millis(1500);
    pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(150);
    pub const DEFAULT_START_DELAY: Duration = Duration::from_millis(100);

    pub const DEFAULT_GEO_LOOKUP_URL: &str = "https://api.ip.sb/geoip";
    pub const DEFAULT_GEO_TIMEOUT: Duration = Duration::from_secs(5);

    pub const DEFAULT_SERVER_ID: u32 = 1;
    pub const DEFAULT_RUNS: u32 = 1;
    pub const DEFAULT_ENABLE_COLOR: bool = true;

    /// Upper bound for any single phase duration
    pub const MAX_PHASE_DURATION_MS: u64 = 600_000;
    /// Upper bound for the tick interval
    pub const MAX_TICK_INTERVAL_MS: u64 = 10_000;
}
