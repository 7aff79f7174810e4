//! Result data structures: samples, outcomes and run reports

use crate::servers::Server;
use crate::types::Phase;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Label used for every location field when the lookup fails
pub const UNAVAILABLE: &str = "Unavailable";

/// One timestamped value emitted while a phase runs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplePoint {
    pub phase: Phase,
    /// Seconds since the phase started
    pub elapsed_secs: f64,
    pub value: f64,
}

impl SamplePoint {
    pub fn new(phase: Phase, elapsed: Duration, value: f64) -> Self {
        Self {
            phase,
            elapsed_secs: elapsed.as_secs_f64(),
            value,
        }
    }

    /// X coordinate on the fluctuation chart (whole seconds)
    pub fn chart_second(&self) -> u64 {
        self.elapsed_secs.round().max(0.0) as u64
    }

    /// Y coordinate on the fluctuation chart (two decimals)
    pub fn chart_value(&self) -> f64 {
        (self.value * 100.0).round() / 100.0
    }
}

/// Final ceilings of a completed run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestOutcome {
    pub download: f64,
    pub upload: f64,
    pub ping: f64,
    pub completed_at: DateTime<Utc>,
}

impl TestOutcome {
    pub fn new(download: f64, upload: f64, ping: f64) -> Self {
        Self {
            download,
            upload,
            ping,
            completed_at: Utc::now(),
        }
    }

    /// Ceiling recorded for a phase
    pub fn value(&self, phase: Phase) -> f64 {
        match phase {
            Phase::Download => self.download,
            Phase::Upload => self.upload,
            Phase::Ping => self.ping,
        }
    }

    /// Displayed jitter, derived from ping rather than measured
    pub fn jitter_ms(&self) -> f64 {
        self.ping * 0.15
    }

    /// Plain-text summary used when sharing results
    pub fn share_text(&self, share_url: Option<&str>) -> String {
        let mut text = format!(
            "⚡️ I just tested my internet with PingPanic!\n\nDownload: {:.1} Mbps\nUpload: {:.1} Mbps\nPing: {:.0} ms",
            self.download, self.upload, self.ping
        );
        if let Some(url) = share_url {
            text.push_str(&format!("\n\nTest your speed at: {}", url));
        }
        text
    }
}

/// Connection details shown next to the results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub isp: String,
    pub city: String,
    pub country: String,
}

impl UserInfo {
    /// Placeholder shown when the lookup fails or is disabled
    pub fn unavailable() -> Self {
        Self {
            isp: UNAVAILABLE.to_string(),
            city: UNAVAILABLE.to_string(),
            country: String::new(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.isp != UNAVAILABLE || self.city != UNAVAILABLE
    }

    /// "City, Country" with empty parts dropped
    pub fn location_label(&self) -> String {
        [self.city.as_str(), self.country.as_str()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Everything printed for a finished run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run: u32,
    pub outcome: TestOutcome,
    pub user_info: UserInfo,
    pub server: Server,
    pub samples: Vec<SamplePoint>,
}

impl RunReport {
    /// Samples of a single phase, in emission order
    pub fn samples_for(&self, phase: Phase) -> impl Iterator<Item = &SamplePoint> {
        self.samples.iter().filter(move |s| s.phase == phase)
    }
}

/// Everything a session produced: every run's outcome plus the full
/// report of the last run. Earlier runs' samples are discarded when the
/// next run resets the state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    pub version: String,
    pub runs: Vec<TestOutcome>,
    pub report: RunReport,
}

impl SessionReport {
    pub fn new(runs: Vec<TestOutcome>, report: RunReport) -> Self {
        Self {
            version: crate::VERSION.to_string(),
            runs,
            report,
        }
    }

    /// Outcomes before the final run
    pub fn previous_runs(&self) -> &[TestOutcome] {
        let earlier = self.runs.len().saturating_sub(1);
        &self.runs[..earlier]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_chart_coordinates() {
        let sample = SamplePoint::new(Phase::Download, Duration::from_millis(7_499), 123.456);
        assert_eq!(sample.chart_second(), 7);
        assert_eq!(sample.chart_value(), 123.46);

        let sample = SamplePoint::new(Phase::Upload, Duration::from_millis(7_500), 1.0);
        assert_eq!(sample.chart_second(), 8);
    }

    #[test]
    fn test_share_text_format() {
        let outcome = TestOutcome::new(254.83, 98.21, 12.4);
        let text = outcome.share_text(None);
        assert!(text.starts_with("⚡️ I just tested my internet with PingPanic!"));
        assert!(text.contains("Download: 254.8 Mbps"));
        assert!(text.contains("Upload: 98.2 Mbps"));
        assert!(text.contains("Ping: 12 ms"));
        assert!(!text.contains("Test your speed at"));

        let with_url = outcome.share_text(Some("https://example.com"));
        assert!(with_url.ends_with("\n\nTest your speed at: https://example.com"));
    }

    #[test]
    fn test_jitter_is_derived_from_ping() {
        let outcome = TestOutcome::new(100.0, 50.0, 20.0);
        assert!((outcome.jitter_ms() - 3.0).abs() < f64::EPSILON);
        assert_eq!(outcome.value(Phase::Ping), 20.0);
    }

    #[test]
    fn test_user_info_labels() {
        let info = UserInfo {
            isp: "Comcast".to_string(),
            city: "Denver".to_string(),
            country: "United States".to_string(),
        };
        assert!(info.is_available());
        assert_eq!(info.location_label(), "Denver, United States");

        let fallback = UserInfo::unavailable();
        assert!(!fallback.is_available());
        assert_eq!(fallback.location_label(), "Unavailable");
    }

    #[test]
    fn test_session_previous_runs() {
        let report = RunReport {
            run: 3,
            outcome: TestOutcome::new(3.0, 3.0, 3.0),
            user_info: UserInfo::unavailable(),
            server: crate::servers::find_server(1).unwrap(),
            samples: Vec::new(),
        };
        let runs = vec![
            TestOutcome::new(1.0, 1.0, 1.0),
            TestOutcome::new(2.0, 2.0, 2.0),
            report.outcome.clone(),
        ];
        let session = SessionReport::new(runs, report);
        assert_eq!(session.previous_runs().len(), 2);
        assert_eq!(session.previous_runs()[1].download, 2.0);

        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["report"]["run"], 3);
        assert_eq!(json["runs"].as_array().unwrap().len(), 3);
        assert_eq!(json["version"], crate::VERSION);
    }
}
