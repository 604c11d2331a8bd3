//! Colored formatter implementation with terminal color support

use super::formatter::{
    fmt_error, format_percentage, format_seconds, status_label, worker_rows, FormattingOptions,
    OutputFormatter, PlainFormatter, WORKER_COLUMNS,
};
use crate::{
    error::Result,
    models::ProbeResult,
    stats::RunReport,
    types::{CompletionState, WorkerStatus},
};
use colored::*;
use std::fmt::Write as _;

/// Latency classification for color coding
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LatencyLevel {
    Fast,     // < 100ms
    Moderate, // 100ms-1s
    Slow,     // 1s-10s
    VerySlow, // > 10s
}

impl LatencyLevel {
    pub fn from_seconds(seconds: f64) -> Self {
        if seconds < 0.1 {
            Self::Fast
        } else if seconds < 1.0 {
            Self::Moderate
        } else if seconds < 10.0 {
            Self::Slow
        } else {
            Self::VerySlow
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Self::Fast => Color::Green,
            Self::Moderate => Color::Cyan,
            Self::Slow => Color::Yellow,
            Self::VerySlow => Color::Red,
        }
    }
}

/// Color scheme configuration
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub header: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,
    pub muted: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            header: Color::Blue,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            info: Color::Cyan,
            muted: Color::BrightBlack,
        }
    }
}

pub struct ColoredFormatter {
    plain_formatter: PlainFormatter,
    options: FormattingOptions,
    color_scheme: ColorScheme,
}

impl ColoredFormatter {
    pub fn new(options: FormattingOptions) -> Self {
        Self {
            plain_formatter: PlainFormatter::new(options.clone()),
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

    fn seconds_colored(&self, seconds: f64) -> ColoredString {
        self.colorize(&format_seconds(seconds), LatencyLevel::from_seconds(seconds).color())
    }

    fn percentage_colored(&self, percentage: f64) -> ColoredString {
        let color = if percentage >= 95.0 {
            self.color_scheme.success
        } else if percentage >= 80.0 {
            self.color_scheme.warning
        } else {
            self.color_scheme.error
        };
        self.colorize(&format_percentage(percentage), color)
    }

    fn count_colored(&self, count: usize, color: Color) -> ColoredString {
        if count == 0 {
            self.colorize("0", self.color_scheme.muted)
        } else {
            self.colorize(&count.to_string(), color)
        }
    }

    fn status_color(&self, status: WorkerStatus) -> Color {
        match status {
            WorkerStatus::Completed => self.color_scheme.success,
            WorkerStatus::Exhausted | WorkerStatus::Cancelled => self.color_scheme.warning,
            WorkerStatus::Failed => self.color_scheme.error,
        }
    }
}

impl OutputFormatter for ColoredFormatter {
    fn format_status(&self, state: CompletionState) -> String {
        let color = if state.timed_out() {
            self.color_scheme.warning
        } else {
            self.color_scheme.success
        };
        self.colorize(state.status_line(), color).bold().to_string()
    }

    fn format_summary(&self, report: &RunReport) -> Result<String> {
        let mut output = String::new();

        writeln!(output, "{}", self.colorize("Run Summary", self.color_scheme.header).bold())
            .map_err(fmt_error)?;
        writeln!(
            output,
            "Workers:     {} launched, {} completed, {} exhausted, {} cancelled, {} failed",
            self.colorize(&report.launched.to_string(), self.color_scheme.info),
            self.count_colored(report.completed, self.color_scheme.success),
            self.count_colored(report.exhausted, self.color_scheme.warning),
            self.count_colored(report.cancelled, self.color_scheme.warning),
            self.count_colored(report.failed, self.color_scheme.error),
        )
        .map_err(fmt_error)?;
        if report.unreported > 0 {
            writeln!(
                output,
                "Unreported:  {}",
                self.colorize(&report.unreported.to_string(), self.color_scheme.error)
            )
            .map_err(fmt_error)?;
        }
        writeln!(output, "Success:     {}", self.percentage_colored(report.success_rate()))
            .map_err(fmt_error)?;

        match &report.latency {
            Some(latency) => {
                writeln!(
                    output,
                    "Latency:     min {} | median {} | mean {} | p95 {} | max {}",
                    self.seconds_colored(latency.min),
                    self.seconds_colored(latency.median),
                    self.seconds_colored(latency.mean),
                    self.seconds_colored(latency.p95),
                    self.seconds_colored(latency.max)
                )
                .map_err(fmt_error)?;
            }
            None => writeln!(
                output,
                "Latency:     {}",
                self.colorize("no measurements", self.color_scheme.muted)
            )
            .map_err(fmt_error)?,
        }

        if let Some(throughput) = report.throughput {
            writeln!(
                output,
                "Throughput:  {} events/s",
                self.colorize(&format!("{:.1}", throughput), self.color_scheme.info)
            )
            .map_err(fmt_error)?;
        }
        if report.dropped_progress > 0 {
            writeln!(
                output,
                "Dropped progress lines: {}",
                self.colorize(&report.dropped_progress.to_string(), self.color_scheme.warning)
            )
            .map_err(fmt_error)?;
        }
        write!(output, "Wall time:   {}", format_seconds(report.wall_time.as_secs_f64())).map_err(fmt_error)?;

        Ok(output)
    }

    fn format_worker_table(&self, results: &[ProbeResult]) -> Result<String> {
        let table = self.plain_formatter.create_table(&WORKER_COLUMNS, &worker_rows(results));
        if !self.options.enable_color {
            return Ok(table);
        }

        // Color the status column in place; padding was computed on plain text
        let mut output = table;
        for status in [
            WorkerStatus::Completed,
            WorkerStatus::Exhausted,
            WorkerStatus::Cancelled,
            WorkerStatus::Failed,
        ] {
            let label = status_label(status);
            let painted = self.colorize(label, self.status_color(status)).to_string();
            output = output.replace(&format!(" {} ", label), &format!(" {} ", painted));
        }
        Ok(output)
    }

    fn format_error(&self, error: &str) -> String {
        format!("{} {}", self.colorize("ERROR:", self.color_scheme.error).bold(), error)
    }

    fn format_warning(&self, warning: &str) -> String {
        format!("{} {}", self.colorize("WARNING:", self.color_scheme.warning).bold(), warning)
    }
}
