//! Aggregate statistics over a run's probe results

use crate::{
    models::{ProbeResult, Workload},
    probe::CLOCK_START_EVENT,
    types::{CompletionState, WorkerStatus},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Distribution of measured latencies, in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatencySummary {
    pub samples: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub p95: f64,
    pub std_dev: f64,
}

impl LatencySummary {
    /// Summarize the given samples; `None` when there are none
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        let mut sorted = samples.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let mean = sorted.iter().sum::<f64>() / sorted.len() as f64;

        Some(Self {
            samples: sorted.len(),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            mean,
            median: percentile(&sorted, 50.0),
            p95: percentile(&sorted, 95.0),
            std_dev: standard_deviation(&sorted, mean),
        })
    }
}

/// Linear-interpolated percentile of already sorted values
pub fn percentile(sorted_values: &[f64], percentile: f64) -> f64 {
    if sorted_values.is_empty() {
        return 0.0;
    }

    let index = (percentile / 100.0) * (sorted_values.len() as f64 - 1.0);
    let lower_index = index.floor() as usize;
    let upper_index = index.ceil() as usize;

    if lower_index == upper_index {
        sorted_values[lower_index]
    } else {
        let lower_value = sorted_values[lower_index];
        let upper_value = sorted_values[upper_index];
        let weight = index - lower_index as f64;
        lower_value + weight * (upper_value - lower_value)
    }
}

fn standard_deviation(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }

    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Everything printed after the status line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub state: CompletionState,
    pub launched: usize,
    pub completed: usize,
    pub exhausted: usize,
    pub cancelled: usize,
    pub failed: usize,
    /// Launched workers that never recorded a result
    pub unreported: usize,
    pub latency: Option<LatencySummary>,
    /// Sum over completed workers of timed events per second
    pub throughput: Option<f64>,
    /// Progress lines lost to a full channel
    pub dropped_progress: u64,
    pub wall_time: Duration,
}

impl RunReport {
    pub fn build(
        results: &[ProbeResult],
        launched: usize,
        state: CompletionState,
        workload: &Workload,
        wall_time: Duration,
    ) -> Self {
        let count = |status: WorkerStatus| results.iter().filter(|r| r.status == status).count();

        let samples: Vec<f64> = results.iter().filter_map(|r| r.elapsed_seconds).collect();

        let timed_events = workload.target_count.saturating_sub(CLOCK_START_EVENT) as f64;
        let rates: Vec<f64> = samples
            .iter()
            .filter(|elapsed| **elapsed > 0.0)
            .map(|elapsed| timed_events / elapsed)
            .collect();

        Self {
            state,
            launched,
            completed: count(WorkerStatus::Completed),
            exhausted: count(WorkerStatus::Exhausted),
            cancelled: count(WorkerStatus::Cancelled),
            failed: count(WorkerStatus::Failed),
            unreported: launched.saturating_sub(results.len()),
            latency: LatencySummary::from_samples(&samples),
            throughput: if rates.is_empty() { None } else { Some(rates.iter().sum()) },
            dropped_progress: 0,
            wall_time,
        }
    }

    pub fn with_dropped_progress(mut self, dropped: u64) -> Self {
        self.dropped_progress = dropped;
        self
    }

    pub fn success_rate(&self) -> f64 {
        if self.launched == 0 {
            0.0
        } else {
            self.completed as f64 / self.launched as f64 * 100.0
        }
    }
}
