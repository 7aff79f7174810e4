//! Data models and structures for the speed test simulator

pub mod config;
pub mod results;

// Re-export main model types
pub use config::Config;
pub use results::{SamplePoint, TestOutcome, UserInfo, RunReport, SessionReport, UNAVAILABLE};
