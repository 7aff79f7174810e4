//! Core formatting traits and the plain text implementation

use crate::{
    error::{AppError, Result},
    models::{RunReport, SamplePoint, TestOutcome},
    servers::Server,
    types::{Phase, TestStatus},
};
use std::fmt::Write as _;

/// Glyphs for the fluctuation sparkline, lowest first
pub(crate) const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Main trait for output formatting
pub trait OutputFormatter: Send + Sync {
    /// Format a header section
    fn format_header(&self, title: &str) -> Result<String>;

    /// Live gauge line for the running phase
    fn format_gauge(&self, status: TestStatus, value: f64, progress: f64) -> Result<String>;

    /// Line printed when a phase finishes
    fn format_phase_result(&self, phase: Phase, value: f64) -> Result<String>;

    /// Result card for a finished run
    fn format_report(&self, report: &RunReport) -> Result<String>;

    /// "Speed Fluctuations" chart over the sample log
    fn format_chart(&self, samples: &[SamplePoint]) -> Result<String>;

    /// One-line summary of an earlier run
    fn format_run_summary(&self, run: u32, outcome: &TestOutcome) -> Result<String>;

    /// Server catalog with the selection marked
    fn format_server_list(&self, servers: &[Server], selected: u32) -> Result<String>;

    fn format_error(&self, error: &str) -> Result<String>;

    fn format_warning(&self, warning: &str) -> Result<String>;

    fn format_success(&self, message: &str) -> Result<String>;
}

/// Configuration options for formatting
#[derive(Debug, Clone)]
pub struct FormattingOptions {
    pub enable_color: bool,
    /// Show per-second chart axis and sample counts
    pub verbose_mode: bool,
    /// Width of the gauge bar in cells
    pub gauge_width: usize,
}

impl Default for FormattingOptions {
    fn default() -> Self {
        Self {
            enable_color: true,
            verbose_mode: false,
            gauge_width: 30,
        }
    }
}

pub(crate) fn fmt_err(e: std::fmt::Error) -> AppError {
    AppError::io(format!("Failed to format output: {}", e))
}

/// Value with the precision used on the live gauge
pub(crate) fn gauge_number(status: TestStatus, value: f64) -> String {
    match status {
        TestStatus::TestingPing => format!("{:.0}", value),
        _ => format!("{:.1}", value),
    }
}

/// Value with the precision used on the result card
pub(crate) fn card_number(phase: Phase, value: f64) -> String {
    match phase {
        Phase::Ping => format!("{:.0}", value),
        Phase::Download | Phase::Upload => format!("{:.2}", value),
    }
}

/// Filled cells of a progress bar
pub(crate) fn filled_cells(progress: f64, width: usize) -> usize {
    ((progress.clamp(0.0, 1.0) * width as f64).round() as usize).min(width)
}

/// Charted values of one phase, rounded as the chart shows them
pub(crate) fn series(samples: &[SamplePoint], phase: Phase) -> Vec<f64> {
    samples
        .iter()
        .filter(|s| s.phase == phase)
        .map(SamplePoint::chart_value)
        .collect()
}

/// Render values as block glyphs scaled against `max`
pub(crate) fn sparkline(values: &[f64], max: f64) -> String {
    if max <= 0.0 {
        return values.iter().map(|_| SPARK_LEVELS[0]).collect();
    }
    let top = (SPARK_LEVELS.len() - 1) as f64;
    values
        .iter()
        .map(|v| {
            let idx = ((v / max).clamp(0.0, 1.0) * top).round() as usize;
            SPARK_LEVELS[idx]
        })
        .collect()
}

/// Largest charted value across download and upload
pub(crate) fn chart_max(samples: &[SamplePoint]) -> f64 {
    samples
        .iter()
        .filter(|s| s.phase.is_charted())
        .map(SamplePoint::chart_value)
        .fold(0.0, f64::max)
}

/// Last whole second on the chart's x axis
pub(crate) fn chart_span_secs(samples: &[SamplePoint], phase: Phase) -> u64 {
    samples
        .iter()
        .filter(|s| s.phase == phase)
        .map(SamplePoint::chart_second)
        .max()
        .unwrap_or(0)
}

/// Plain text formatter implementation
pub struct PlainFormatter {
    options: FormattingOptions,
}

impl PlainFormatter {
    pub fn new(options: FormattingOptions) -> Self {
        Self { options }
    }

    fn bar(&self, progress: f64) -> String {
        let width = self.options.gauge_width;
        let filled = filled_cells(progress, width);
        format!("[{}{}]", "=".repeat(filled), " ".repeat(width - filled))
    }
}

impl OutputFormatter for PlainFormatter {
    fn format_header(&self, title: &str) -> Result<String> {
        let border = "=".repeat(title.chars().count() + 4);
        Ok(format!("{}\n  {}\n{}", border, title, border))
    }

    fn format_gauge(&self, status: TestStatus, value: f64, progress: f64) -> Result<String> {
        Ok(format!(
            "{:<16} {} {:>8}",
            status.gauge_label(),
            self.bar(progress),
            gauge_number(status, value)
        ))
    }

    fn format_phase_result(&self, phase: Phase, value: f64) -> Result<String> {
        Ok(format!("{:<8} {:>8} {}", phase.name(), card_number(phase, value), phase.unit()))
    }

    fn format_report(&self, report: &RunReport) -> Result<String> {
        let mut output = String::new();
        let outcome = &report.outcome;

        writeln!(output, "{}", self.format_header("Test Results")?).map_err(fmt_err)?;
        for (title, phase) in [
            ("Download Speed", Phase::Download),
            ("Upload Speed", Phase::Upload),
            ("Ping", Phase::Ping),
        ] {
            writeln!(
                output,
                "  {:<15} {:>8} {}",
                title,
                card_number(phase, outcome.value(phase)),
                phase.unit()
            )
            .map_err(fmt_err)?;
        }

        writeln!(output).map_err(fmt_err)?;
        writeln!(output, "Your Location").map_err(fmt_err)?;
        writeln!(output, "  ISP:      {}", report.user_info.isp).map_err(fmt_err)?;
        writeln!(output, "  Location: {}", report.user_info.location_label()).map_err(fmt_err)?;

        writeln!(output).map_err(fmt_err)?;
        writeln!(output, "Connection Stability").map_err(fmt_err)?;
        writeln!(output, "  Jitter:   {:.0} ms (Excellent)", outcome.jitter_ms()).map_err(fmt_err)?;

        writeln!(output).map_err(fmt_err)?;
        write!(output, "Server: {}", report.server).map_err(fmt_err)?;

        Ok(output)
    }

    fn format_chart(&self, samples: &[SamplePoint]) -> Result<String> {
        let mut output = String::new();
        writeln!(output, "Speed Fluctuations (Mbps)").map_err(fmt_err)?;

        let max = chart_max(samples);
        for phase in [Phase::Download, Phase::Upload] {
            let values = series(samples, phase);
            if values.is_empty() {
                writeln!(output, "  {:<8} (no samples)", phase.name()).map_err(fmt_err)?;
                continue;
            }
            writeln!(output, "  {:<8} {}", phase.name(), sparkline(&values, max)).map_err(fmt_err)?;
            if self.options.verbose_mode {
                writeln!(
                    output,
                    "  {:<8} {} samples over 0-{}s",
                    "",
                    values.len(),
                    chart_span_secs(samples, phase)
                )
                .map_err(fmt_err)?;
            }
        }
        write!(output, "  scale: 0-{:.2} Mbps", max).map_err(fmt_err)?;
        Ok(output)
    }

    fn format_run_summary(&self, run: u32, outcome: &TestOutcome) -> Result<String> {
        Ok(format!(
            "Run {}: download {:.2} Mbps, upload {:.2} Mbps, ping {:.0} ms",
            run, outcome.download, outcome.upload, outcome.ping
        ))
    }

    fn format_server_list(&self, servers: &[Server], selected: u32) -> Result<String> {
        let mut output = String::new();
        writeln!(output, "Available servers:").map_err(fmt_err)?;
        for server in servers {
            let marker = if server.id == selected { "*" } else { " " };
            writeln!(
                output,
                " {} {:>2}  {:<13} {:<19} {}",
                marker, server.id, server.name, server.provider, server.location
            )
            .map_err(fmt_err)?;
        }
        Ok(output.trim_end().to_string())
    }

    fn format_error(&self, error: &str) -> Result<String> {
        Ok(format!("ERROR: {}", error))
    }

    fn format_warning(&self, warning: &str) -> Result<String> {
        Ok(format!("WARNING: {}", warning))
    }

    fn format_success(&self, message: &str) -> Result<String> {
        Ok(format!("OK: {}", message))
    }
}
