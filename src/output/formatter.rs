//! Core formatting trait and the plain text implementation

use crate::{
    error::{AppError, Result},
    models::ProbeResult,
    stats::RunReport,
    types::{CompletionState, WorkerStatus},
};
use std::fmt::Write as _;

/// Renders the end-of-run output
pub trait OutputFormatter: Send + Sync {
    /// Final status line
    fn format_status(&self, state: CompletionState) -> String;

    /// Aggregate summary printed after the status line
    fn format_summary(&self, report: &RunReport) -> Result<String>;

    /// One row per recorded worker
    fn format_worker_table(&self, results: &[ProbeResult]) -> Result<String>;

    fn format_error(&self, error: &str) -> String;

    fn format_warning(&self, warning: &str) -> String;
}

/// Configuration options for formatting
#[derive(Debug, Clone)]
pub struct FormattingOptions {
    /// Enable colored output
    pub enable_color: bool,
    /// Show table borders
    pub table_borders: bool,
}

impl Default for FormattingOptions {
    fn default() -> Self {
        Self {
            enable_color: true,
            table_borders: true,
        }
    }
}

/// Column definition for table formatting
#[derive(Debug, Clone)]
pub struct Column {
    pub header: &'static str,
    pub alignment: Alignment,
    pub max_width: usize,
}

/// Text alignment options
#[derive(Debug, Clone, Copy)]
pub enum Alignment {
    Left,
    Right,
}

/// Row data for table formatting
pub type RowData = Vec<String>;

pub(crate) const WORKER_COLUMNS: [Column; 4] = [
    Column { header: "Worker", alignment: Alignment::Right, max_width: 8 },
    Column { header: "Topic", alignment: Alignment::Left, max_width: 40 },
    Column { header: "Status", alignment: Alignment::Left, max_width: 10 },
    Column { header: "Elapsed", alignment: Alignment::Right, max_width: 14 },
];

pub(crate) fn fmt_error(error: std::fmt::Error) -> AppError {
    AppError::io(format!("Failed to format output: {}", error))
}

/// Seconds in a human-readable unit
pub fn format_seconds(seconds: f64) -> String {
    if seconds < 0.001 {
        format!("{:.1}µs", seconds * 1_000_000.0)
    } else if seconds < 1.0 {
        format!("{:.1}ms", seconds * 1000.0)
    } else if seconds < 60.0 {
        format!("{:.3}s", seconds)
    } else {
        let minutes = (seconds / 60.0) as u64;
        format!("{}m{:.1}s", minutes, seconds % 60.0)
    }
}

/// Percentage with one decimal, clamped at the ends
pub fn format_percentage(percentage: f64) -> String {
    if percentage >= 99.95 {
        "100.0%".to_string()
    } else if percentage < 0.05 {
        "0.0%".to_string()
    } else {
        format!("{:.1}%", percentage)
    }
}

pub fn status_label(status: WorkerStatus) -> &'static str {
    match status {
        WorkerStatus::Completed => "completed",
        WorkerStatus::Exhausted => "exhausted",
        WorkerStatus::Cancelled => "cancelled",
        WorkerStatus::Failed => "failed",
    }
}

/// Worker rows sorted by worker index
pub(crate) fn worker_rows(results: &[ProbeResult]) -> Vec<RowData> {
    let mut sorted: Vec<&ProbeResult> = results.iter().collect();
    sorted.sort_by_key(|r| r.worker);

    sorted
        .into_iter()
        .map(|r| {
            vec![
                r.worker.to_string(),
                r.topic.clone(),
                status_label(r.status).to_string(),
                r.elapsed_seconds.map(format_seconds).unwrap_or_else(|| "-".to_string()),
            ]
        })
        .collect()
}

/// Plain text formatter implementation
pub struct PlainFormatter {
    options: FormattingOptions,
}

impl PlainFormatter {
    pub fn new(options: FormattingOptions) -> Self {
        Self { options }
    }

    /// Create a table with the given columns and data
    pub(crate) fn create_table(&self, columns: &[Column], rows: &[RowData]) -> String {
        if rows.is_empty() {
            return String::new();
        }

        let widths = Self::column_widths(columns, rows);
        let mut output = String::new();

        if self.options.table_borders {
            output.push_str(&Self::horizontal_border(&widths));
            output.push('\n');
        }

        let headers: Vec<String> = columns.iter().map(|c| c.header.to_string()).collect();
        output.push_str(&self.create_row(&headers, &widths, columns));
        output.push('\n');

        if self.options.table_borders {
            output.push_str(&Self::horizontal_border(&widths));
            output.push('\n');
        }

        for row in rows {
            output.push_str(&self.create_row(row, &widths, columns));
            output.push('\n');
        }

        if self.options.table_borders {
            output.push_str(&Self::horizontal_border(&widths));
        }

        output
    }

    fn column_widths(columns: &[Column], rows: &[RowData]) -> Vec<usize> {
        columns
            .iter()
            .enumerate()
            .map(|(idx, column)| {
                rows.iter()
                    .filter_map(|row| row.get(idx))
                    .map(|cell| cell.chars().count())
                    .fold(column.header.len(), usize::max)
                    .min(column.max_width)
            })
            .collect()
    }

    fn create_row(&self, data: &[String], widths: &[usize], columns: &[Column]) -> String {
        let mut row = String::new();

        if self.options.table_borders {
            row.push('|');
        }

        for ((cell, &width), column) in data.iter().zip(widths).zip(columns) {
            let padded = align_text(cell, width, column.alignment);
            if self.options.table_borders {
                row.push(' ');
                row.push_str(&padded);
                row.push_str(" |");
            } else {
                row.push_str(&padded);
                row.push_str("  ");
            }
        }

        row.trim_end().to_string()
    }

    fn horizontal_border(widths: &[usize]) -> String {
        let mut border = String::from("+");
        for &width in widths {
            border.push_str(&"-".repeat(width + 2));
            border.push('+');
        }
        border
    }
}

/// Align text within the specified width, truncating if needed
pub(crate) fn align_text(text: &str, width: usize, alignment: Alignment) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.chars().take(width).collect();
    }

    let padding = " ".repeat(width - len);
    match alignment {
        Alignment::Left => format!("{}{}", text, padding),
        Alignment::Right => format!("{}{}", padding, text),
    }
}

impl OutputFormatter for PlainFormatter {
    fn format_status(&self, state: CompletionState) -> String {
        state.status_line().to_string()
    }

    fn format_summary(&self, report: &RunReport) -> Result<String> {
        let mut output = String::new();

        writeln!(output, "Run Summary:").map_err(fmt_error)?;
        writeln!(output, "------------").map_err(fmt_error)?;
        writeln!(
            output,
            "Workers:     {} launched, {} completed, {} exhausted, {} cancelled, {} failed",
            report.launched, report.completed, report.exhausted, report.cancelled, report.failed
        )
        .map_err(fmt_error)?;
        if report.unreported > 0 {
            writeln!(output, "Unreported:  {}", report.unreported).map_err(fmt_error)?;
        }
        writeln!(output, "Success:     {}", format_percentage(report.success_rate())).map_err(fmt_error)?;

        match &report.latency {
            Some(latency) => {
                writeln!(
                    output,
                    "Latency:     min {} | median {} | mean {} | p95 {} | max {}",
                    format_seconds(latency.min),
                    format_seconds(latency.median),
                    format_seconds(latency.mean),
                    format_seconds(latency.p95),
                    format_seconds(latency.max)
                )
                .map_err(fmt_error)?;
            }
            None => writeln!(output, "Latency:     no measurements").map_err(fmt_error)?,
        }

        if let Some(throughput) = report.throughput {
            writeln!(output, "Throughput:  {:.1} events/s", throughput).map_err(fmt_error)?;
        }
        if report.dropped_progress > 0 {
            writeln!(output, "Dropped progress lines: {}", report.dropped_progress).map_err(fmt_error)?;
        }
        write!(output, "Wall time:   {}", format_seconds(report.wall_time.as_secs_f64())).map_err(fmt_error)?;

        Ok(output)
    }

    fn format_worker_table(&self, results: &[ProbeResult]) -> Result<String> {
        Ok(self.create_table(&WORKER_COLUMNS, &worker_rows(results)))
    }

    fn format_error(&self, error: &str) -> String {
        format!("ERROR: {}", error)
    }

    fn format_warning(&self, warning: &str) -> String {
        format!("WARNING: {}", warning)
    }
}
