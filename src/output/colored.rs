//! Colored formatter implementation with terminal color support

use super::formatter::{
    card_number, chart_max, chart_span_secs, filled_cells, fmt_err, gauge_number, series,
    sparkline, FormattingOptions, OutputFormatter,
};
use crate::{
    error::Result,
    models::{RunReport, SamplePoint, TestOutcome},
    servers::Server,
    types::{Phase, TestStatus},
};
use colored::*;
use std::fmt::Write as _;

/// Color scheme configuration
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub header: Color,
    pub download: Color,
    pub upload: Color,
    pub ping: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub muted: Color,
}

impl ColorScheme {
    pub fn for_phase(&self, phase: Phase) -> Color {
        match phase {
            Phase::Download => self.download,
            Phase::Upload => self.upload,
            Phase::Ping => self.ping,
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            header: Color::Blue,
            download: Color::Cyan,
            upload: Color::Magenta,
            ping: Color::Yellow,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            muted: Color::BrightBlack,
        }
    }
}

/// Colored formatter implementation
pub struct ColoredFormatter {
    options: FormattingOptions,
    color_scheme: ColorScheme,
}

impl ColoredFormatter {
    pub fn new(options: FormattingOptions) -> Self {
        Self {
            options,
            color_scheme: ColorScheme::default(),
        }
    }

    /// Apply color to text if colors are enabled
    fn colorize(&self, text: &str, color: Color) -> ColoredString {
        if self.options.enable_color {
            text.color(color)
        } else {
            text.normal()
        }
    }

    fn bold(&self, text: &str) -> ColoredString {
        if self.options.enable_color {
            text.bold()
        } else {
            text.normal()
        }
    }

    fn dimmed(&self, text: &str) -> ColoredString {
        if self.options.enable_color {
            text.dimmed()
        } else {
            text.normal()
        }
    }

    fn create_section_header(&self, title: &str, icon: &str) -> String {
        if self.options.enable_color {
            format!("{} {}", icon, title.bold().color(self.color_scheme.header))
        } else {
            format!("{} {}", icon, title)
        }
    }

    fn gauge_bar(&self, progress: f64, color: Color) -> String {
        let width = self.options.gauge_width;
        let filled = filled_cells(progress, width);
        format!(
            "{}{}",
            self.colorize(&"█".repeat(filled), color),
            self.colorize(&"░".repeat(width - filled), self.color_scheme.muted)
        )
    }

    /// Status color while the gauge is moving, header color otherwise
    fn status_color(&self, status: TestStatus) -> Color {
        status
            .phase()
            .map(|phase| self.color_scheme.for_phase(phase))
            .unwrap_or(self.color_scheme.header)
    }
}

impl OutputFormatter for ColoredFormatter {
    fn format_header(&self, title: &str) -> Result<String> {
        let border = "━".repeat(title.chars().count() + 6);
        Ok(format!(
            "{}\n   {}\n{}",
            self.colorize(&border, self.color_scheme.header),
            self.bold(title),
            self.colorize(&border, self.color_scheme.header)
        ))
    }

    fn format_gauge(&self, status: TestStatus, value: f64, progress: f64) -> Result<String> {
        let color = self.status_color(status);
        Ok(format!(
            "{} {} {}",
            self.colorize(&format!("{:<16}", status.gauge_label()), color),
            self.gauge_bar(progress, color),
            self.bold(&format!("{:>8}", gauge_number(status, value)))
        ))
    }

    fn format_phase_result(&self, phase: Phase, value: f64) -> Result<String> {
        Ok(format!(
            "{} {:<8} {} {}",
            self.colorize("✓", self.color_scheme.success),
            phase.name(),
            self.colorize(
                &format!("{:>8}", card_number(phase, value)),
                self.color_scheme.for_phase(phase)
            ),
            self.dimmed(phase.unit())
        ))
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
                "  {:<15} {} {}",
                title,
                self.colorize(
                    &format!("{:>8}", card_number(phase, outcome.value(phase))),
                    self.color_scheme.for_phase(phase)
                ),
                self.dimmed(phase.unit())
            )
            .map_err(fmt_err)?;
        }

        writeln!(output).map_err(fmt_err)?;
        writeln!(output, "{}", self.create_section_header("Your Location", "📍")).map_err(fmt_err)?;
        let muted = self.color_scheme.muted;
        let isp = if report.user_info.is_available() {
            self.bold(&report.user_info.isp)
        } else {
            self.colorize(&report.user_info.isp, muted)
        };
        writeln!(output, "  {} {}", self.dimmed("ISP:     "), isp).map_err(fmt_err)?;
        writeln!(
            output,
            "  {} {}",
            self.dimmed("Location:"),
            report.user_info.location_label()
        )
        .map_err(fmt_err)?;

        writeln!(output).map_err(fmt_err)?;
        writeln!(output, "{}", self.create_section_header("Connection Stability", "📶"))
            .map_err(fmt_err)?;
        writeln!(
            output,
            "  {} {} {}",
            self.dimmed("Jitter:  "),
            self.bold(&format!("{:.0} ms", outcome.jitter_ms())),
            self.colorize("(Excellent)", self.color_scheme.success)
        )
        .map_err(fmt_err)?;

        writeln!(output).map_err(fmt_err)?;
        write!(output, "{} {}", self.dimmed("Server:"), report.server).map_err(fmt_err)?;

        Ok(output)
    }

    fn format_chart(&self, samples: &[SamplePoint]) -> Result<String> {
        let mut output = String::new();
        writeln!(output, "{}", self.create_section_header("Speed Fluctuations (Mbps)", "📈"))
            .map_err(fmt_err)?;

        let max = chart_max(samples);
        for phase in [Phase::Download, Phase::Upload] {
            let values = series(samples, phase);
            let label = format!("{:<8}", phase.name());
            if values.is_empty() {
                writeln!(output, "  {} {}", label, self.dimmed("(no samples)")).map_err(fmt_err)?;
                continue;
            }
            writeln!(
                output,
                "  {} {}",
                label,
                self.colorize(&sparkline(&values, max), self.color_scheme.for_phase(phase))
            )
            .map_err(fmt_err)?;
            if self.options.verbose_mode {
                writeln!(
                    output,
                    "  {:<8} {}",
                    "",
                    self.dimmed(&format!(
                        "{} samples over 0-{}s",
                        values.len(),
                        chart_span_secs(samples, phase)
                    ))
                )
                .map_err(fmt_err)?;
            }
        }
        write!(output, "  {}", self.dimmed(&format!("scale: 0-{:.2} Mbps", max))).map_err(fmt_err)?;
        Ok(output)
    }

    fn format_run_summary(&self, run: u32, outcome: &TestOutcome) -> Result<String> {
        Ok(format!(
            "{} ↓ {} Mbps  ↑ {} Mbps  {} ms",
            self.dimmed(&format!("Run {}:", run)),
            self.colorize(&format!("{:.2}", outcome.download), self.color_scheme.download),
            self.colorize(&format!("{:.2}", outcome.upload), self.color_scheme.upload),
            self.colorize(&format!("{:.0}", outcome.ping), self.color_scheme.ping)
        ))
    }

    fn format_server_list(&self, servers: &[Server], selected: u32) -> Result<String> {
        let mut output = String::new();
        writeln!(output, "{}", self.create_section_header("Available servers", "🌐")).map_err(fmt_err)?;
        for server in servers {
            let line = format!(
                "{:>2}  {:<13} {:<19} {}",
                server.id, server.name, server.provider, server.location
            );
            if server.id == selected {
                writeln!(output, " {} {}", self.colorize("*", self.color_scheme.success), self.bold(&line))
                    .map_err(fmt_err)?;
            } else {
                writeln!(output, "   {}", line).map_err(fmt_err)?;
            }
        }
        Ok(output.trim_end().to_string())
    }

    fn format_error(&self, error: &str) -> Result<String> {
        Ok(format!("{} {}", self.colorize("❌", self.color_scheme.error), self.colorize(error, self.color_scheme.error)))
    }

    fn format_warning(&self, warning: &str) -> Result<String> {
        Ok(format!("{} {}", self.colorize("⚠️", self.color_scheme.warning), self.colorize(warning, self.color_scheme.warning)))
    }

    fn format_success(&self, message: &str) -> Result<String> {
        Ok(format!("{} {}", self.colorize("✅", self.color_scheme.success), message))
    }
}

/// Color support detection
impl ColoredFormatter {
    pub fn supports_color() -> bool {
        std::env::var("NO_COLOR").is_err()
            && std::env::var("TERM").map(|term| term != "dumb").unwrap_or(true)
    }
}
