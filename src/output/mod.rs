//! Output formatting and display system
//!
//! Live gauge while the test runs, then the result card and fluctuation
//! chart, either colored or plain. `--json` bypasses the formatters.

mod colored;
mod formatter;
mod live;

pub use colored::{ColorScheme, ColoredFormatter};
pub use formatter::{FormattingOptions, OutputFormatter, PlainFormatter};
pub use live::LiveDisplay;

use crate::{
    error::Result,
    models::SessionReport,
};

/// Output formatting factory for creating appropriate formatters
pub struct OutputFormatterFactory;

impl OutputFormatterFactory {
    /// Create a formatter based on color support and preferences
    pub fn create_formatter(enable_color: bool, verbose: bool) -> Box<dyn OutputFormatter> {
        let options = FormattingOptions {
            enable_color,
            verbose_mode: verbose,
            ..FormattingOptions::default()
        };

        if enable_color {
            Box::new(ColoredFormatter::new(options))
        } else {
            Box::new(PlainFormatter::new(options))
        }
    }

    /// Plain text formatter for scripts and logs
    pub fn create_plain_formatter() -> Box<dyn OutputFormatter> {
        Self::create_formatter(false, false)
    }
}

/// Renders a finished session
pub struct OutputCoordinator {
    formatter: Box<dyn OutputFormatter>,
}

impl OutputCoordinator {
    pub fn new(formatter: Box<dyn OutputFormatter>) -> Self {
        Self { formatter }
    }

    pub fn formatter(&self) -> &dyn OutputFormatter {
        self.formatter.as_ref()
    }

    /// Earlier runs as summary lines, then the card and chart of the last run
    pub fn display_session(&self, session: &SessionReport) -> Result<String> {
        let mut output = String::new();

        let previous = session.previous_runs();
        if !previous.is_empty() {
            for (idx, outcome) in previous.iter().enumerate() {
                output.push_str(&self.formatter.format_run_summary(idx as u32 + 1, outcome)?);
                output.push('\n');
            }
            output.push('\n');
        }

        output.push_str(&self.formatter.format_report(&session.report)?);
        output.push_str("\n\n");
        output.push_str(&self.formatter.format_chart(&session.report.samples)?);

        Ok(output)
    }

    /// Pretty-printed JSON for `--json`
    pub fn display_json(session: &SessionReport) -> Result<String> {
        Ok(serde_json::to_string_pretty(session)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RunReport, SamplePoint, TestOutcome, UserInfo};
    use crate::servers::find_server;
    use crate::types::Phase;
    use std::time::Duration;

    fn session(runs: usize) -> SessionReport {
        let outcomes: Vec<TestOutcome> = (1..=runs)
            .map(|i| TestOutcome::new(100.0 * i as f64, 30.0, 10.0))
            .collect();
        let report = RunReport {
            run: runs as u32,
            outcome: outcomes[runs - 1].clone(),
            user_info: UserInfo::unavailable(),
            server: find_server(1).unwrap(),
            samples: vec![SamplePoint::new(Phase::Download, Duration::from_secs(1), 40.0)],
        };
        SessionReport::new(outcomes, report)
    }

    #[test]
    fn test_single_run_has_no_summaries() {
        let coordinator = OutputCoordinator::new(OutputFormatterFactory::create_plain_formatter());
        let text = coordinator.display_session(&session(1)).unwrap();
        assert!(!text.contains("Run 1:"));
        assert!(text.contains("Test Results"));
        assert!(text.contains("Speed Fluctuations (Mbps)"));
    }

    #[test]
    fn test_earlier_runs_are_summarized() {
        let coordinator = OutputCoordinator::new(OutputFormatterFactory::create_plain_formatter());
        let text = coordinator.display_session(&session(3)).unwrap();
        assert!(text.contains("Run 1: download 100.00 Mbps"));
        assert!(text.contains("Run 2: download 200.00 Mbps"));
        assert!(!text.contains("Run 3:"));
        assert!(text.contains("Download Speed    300.00 Mbps"));
    }

    #[test]
    fn test_json_output_parses() {
        let json = OutputCoordinator::display_json(&session(2)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["report"]["server"]["name"], "Cloudflare");
        assert_eq!(value["report"]["samples"][0]["phase"], "download");
        assert_eq!(value["runs"][0]["download"], 100.0);
    }
}
