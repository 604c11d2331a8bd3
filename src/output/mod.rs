//! Output formatting for the end-of-run report
//!
//! Supports colored and plain text output; the per-worker table is only
//! rendered in verbose mode.

mod colored;
mod formatter;

pub use colored::{ColorScheme, ColoredFormatter, LatencyLevel};
pub use formatter::{
    format_percentage, format_seconds, Alignment, Column, FormattingOptions, OutputFormatter,
    PlainFormatter, RowData,
};

use crate::{
    error::Result,
    models::ProbeResult,
    stats::RunReport,
};

/// Output formatting factory for creating appropriate formatters
pub struct OutputFormatterFactory;

impl OutputFormatterFactory {
    /// Create a formatter based on color support and preferences
    pub fn create_formatter(enable_color: bool) -> Box<dyn OutputFormatter> {
        let options = FormattingOptions {
            enable_color,
            ..Default::default()
        };

        if enable_color {
            Box::new(ColoredFormatter::new(options))
        } else {
            Box::new(PlainFormatter::new(options))
        }
    }
}

/// Assembles the final report from the formatter's pieces
pub struct OutputCoordinator {
    formatter: Box<dyn OutputFormatter>,
    show_workers: bool,
}

impl OutputCoordinator {
    pub fn new(formatter: Box<dyn OutputFormatter>, show_workers: bool) -> Self {
        Self {
            formatter,
            show_workers,
        }
    }

    pub fn formatter(&self) -> &dyn OutputFormatter {
        self.formatter.as_ref()
    }

    /// Status line, optional worker table, then the summary
    pub fn render_report(&self, report: &RunReport, results: &[ProbeResult]) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.formatter.format_status(report.state));
        output.push_str("\n\n");

        if self.show_workers && !results.is_empty() {
            output.push_str(&self.formatter.format_worker_table(results)?);
            output.push_str("\n\n");
        }

        output.push_str(&self.formatter.format_summary(report)?);

        Ok(output)
    }
}
