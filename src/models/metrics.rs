//! Per-worker probe results

use crate::error::{AppError, Result};
use crate::types::WorkerStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of one worker's latency probe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeResult {
    /// 1-based worker index
    pub worker: usize,

    /// Topic the worker subscribed to
    pub topic: String,

    /// Seconds from the clock-start event to the target event
    pub elapsed_seconds: Option<f64>,

    /// Error message if the probe did not complete
    pub error: Option<String>,

    /// Outcome classification
    pub status: WorkerStatus,

    /// When the result was recorded
    pub finished_at: DateTime<Utc>,
}

impl ProbeResult {
    /// Build a result from a probe's return value
    pub fn from_outcome(worker: usize, topic: String, outcome: Result<f64>) -> Self {
        match outcome {
            Ok(elapsed) => Self {
                worker,
                topic,
                elapsed_seconds: Some(elapsed),
                error: None,
                status: WorkerStatus::Completed,
                finished_at: Utc::now(),
            },
            Err(error) => {
                let status = match error {
                    AppError::StreamExhausted { .. } => WorkerStatus::Exhausted,
                    AppError::Cancelled { .. } => WorkerStatus::Cancelled,
                    _ => WorkerStatus::Failed,
                };
                Self {
                    worker,
                    topic,
                    elapsed_seconds: None,
                    error: Some(error.to_string()),
                    status,
                    finished_at: Utc::now(),
                }
            }
        }
    }

    pub fn is_successful(&self) -> bool {
        matches!(self.status, WorkerStatus::Completed)
    }

    /// Line printed when the worker reports
    pub fn report_line(&self) -> String {
        match (self.elapsed_seconds, &self.error) {
            (Some(elapsed), _) => format!("Worker {} finished in {} s", self.worker, elapsed),
            (None, Some(error)) => format!("Worker {} failed: {}", self.worker, error),
            (None, None) => format!("Worker {} finished without a measurement", self.worker),
        }
    }
}
