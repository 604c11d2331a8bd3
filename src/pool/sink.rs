//! Shared, lock-protected collection of per-worker results

use crate::models::ProbeResult;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Every worker records its result here exactly once.
///
/// The per-worker report line is printed while the lock is held so lines
/// from concurrent workers never interleave.
#[derive(Debug, Clone)]
pub struct ResultSink {
    results: Arc<Mutex<Vec<ProbeResult>>>,
    echo: bool,
}

impl ResultSink {
    /// Sink that prints each result's report line as it is recorded
    pub fn new() -> Self {
        Self {
            results: Arc::new(Mutex::new(Vec::new())),
            echo: true,
        }
    }

    /// Sink that only collects
    pub fn quiet() -> Self {
        Self {
            echo: false,
            ..Self::new()
        }
    }

    pub async fn record(&self, result: ProbeResult) {
        let mut results = self.results.lock().await;
        if self.echo {
            println!("{}", result.report_line());
        }
        results.push(result);
    }

    /// Copy of the results recorded so far, in completion order
    pub async fn snapshot(&self) -> Vec<ProbeResult> {
        self.results.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.results.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for ResultSink {
    fn default() -> Self {
        Self::new()
    }
}
