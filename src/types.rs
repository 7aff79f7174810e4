//! Type definitions and aliases

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

// Re-export commonly used types
pub use crate::error::{AppError, Result};

/// One of the three timed simulation segments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Download,
    Upload,
    Ping,
}

impl Phase {
    /// Phases in execution order
    pub const ALL: [Phase; 3] = [Phase::Download, Phase::Upload, Phase::Ping];

    /// Range the phase ceiling is drawn from
    pub fn ceiling_range(&self) -> Range<f64> {
        match self {
            Phase::Download => 80.0..480.0,
            Phase::Upload => 20.0..100.0,
            Phase::Ping => 5.0..50.0,
        }
    }

    /// Draw a ceiling uniformly from this phase's range
    pub fn draw_ceiling<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        rng.gen_range(self.ceiling_range())
    }

    /// Whether samples of this phase go into the fluctuation chart
    pub fn is_charted(&self) -> bool {
        !matches!(self, Phase::Ping)
    }

    /// Display unit
    pub fn unit(&self) -> &'static str {
        match self {
            Phase::Download | Phase::Upload => "Mbps",
            Phase::Ping => "ms",
        }
    }

    /// Human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Download => "Download",
            Phase::Upload => "Upload",
            Phase::Ping => "Ping",
        }
    }

    /// Status the sequencer is in while this phase runs
    pub fn status(&self) -> TestStatus {
        match self {
            Phase::Download => TestStatus::TestingDownload,
            Phase::Upload => TestStatus::TestingUpload,
            Phase::Ping => TestStatus::TestingPing,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Sequencer state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TestStatus {
    #[default]
    Idle,
    TestingDownload,
    TestingUpload,
    TestingPing,
    Complete,
}

impl TestStatus {
    /// Next state in the fixed sequence. `Complete` is terminal.
    pub fn advance(self) -> Self {
        match self {
            TestStatus::Idle => TestStatus::TestingDownload,
            TestStatus::TestingDownload => TestStatus::TestingUpload,
            TestStatus::TestingUpload => TestStatus::TestingPing,
            TestStatus::TestingPing | TestStatus::Complete => TestStatus::Complete,
        }
    }

    /// Phase being simulated in this state, if any
    pub fn phase(&self) -> Option<Phase> {
        match self {
            TestStatus::TestingDownload => Some(Phase::Download),
            TestStatus::TestingUpload => Some(Phase::Upload),
            TestStatus::TestingPing => Some(Phase::Ping),
            TestStatus::Idle | TestStatus::Complete => None,
        }
    }

    /// True while a phase is running
    pub fn is_testing(&self) -> bool {
        self.phase().is_some()
    }

    /// Gauge caption for this state
    pub fn gauge_label(&self) -> &'static str {
        match self {
            TestStatus::TestingDownload => "Download (Mbps)",
            TestStatus::TestingUpload => "Upload (Mbps)",
            TestStatus::TestingPing => "Ping (ms)",
            TestStatus::Idle | TestStatus::Complete => "Mbps",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_status_advances_in_fixed_order() {
        let mut status = TestStatus::Idle;
        let mut seen = vec![status];
        while status != TestStatus::Complete {
            status = status.advance();
            seen.push(status);
        }
        assert_eq!(seen, vec![
            TestStatus::Idle,
            TestStatus::TestingDownload,
            TestStatus::TestingUpload,
            TestStatus::TestingPing,
            TestStatus::Complete,
        ]);
        assert_eq!(TestStatus::Complete.advance(), TestStatus::Complete);
    }

    #[test]
    fn test_status_phase_mapping() {
        for phase in Phase::ALL {
            assert_eq!(phase.status().phase(), Some(phase));
            assert!(phase.status().is_testing());
        }
        assert_eq!(TestStatus::Idle.phase(), None);
        assert!(!TestStatus::Complete.is_testing());
    }

    #[test]
    fn test_gauge_labels() {
        assert_eq!(TestStatus::TestingDownload.gauge_label(), "Download (Mbps)");
        assert_eq!(TestStatus::TestingUpload.gauge_label(), "Upload (Mbps)");
        assert_eq!(TestStatus::TestingPing.gauge_label(), "Ping (ms)");
        assert_eq!(TestStatus::Idle.gauge_label(), "Mbps");
        assert_eq!(TestStatus::Complete.gauge_label(), "Mbps");
    }

    #[test]
    fn test_ceiling_draws_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for phase in Phase::ALL {
            let range = phase.ceiling_range();
            for _ in 0..500 {
                let ceiling = phase.draw_ceiling(&mut rng);
                assert!(range.contains(&ceiling), "{} ceiling {} out of range", phase, ceiling);
            }
        }
    }

    #[test]
    fn test_only_throughput_phases_are_charted() {
        assert!(Phase::Download.is_charted());
        assert!(Phase::Upload.is_charted());
        assert!(!Phase::Ping.is_charted());
        assert_eq!(Phase::Ping.unit(), "ms");
    }
}
