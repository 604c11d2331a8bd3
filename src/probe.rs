//! Per-worker latency measurement

use crate::{
    error::{AppError, Result},
    logging::Logger,
    models::Workload,
    progress::ProgressSink,
    source::{EventSource, Subscription},
};
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Matching event number at which the clock starts.
///
/// Events are numbered from 1; the first one is treated as warm-up.
pub const CLOCK_START_EVENT: u64 = 2;

/// Measures how long one subscription takes to see its target number of events
pub struct LatencyProbe {
    source: Arc<dyn EventSource>,
    target_count: u64,
    print_every: u64,
    progress: ProgressSink,
    cancel: CancellationToken,
    logger: Logger,
}

impl LatencyProbe {
    pub fn new(
        source: Arc<dyn EventSource>,
        workload: &Workload,
        progress: ProgressSink,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            source,
            target_count: workload.target_count,
            print_every: workload.print_every,
            progress,
            cancel,
            logger: Logger::new("probe"),
        }
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub fn target_count(&self) -> u64 {
        self.target_count
    }

    /// Subscribe to `topic`, fire `ready`, then count matching events.
    ///
    /// Returns the seconds between matching event [`CLOCK_START_EVENT`] and
    /// matching event `target_count`. If subscribing fails, `ready` is
    /// dropped unfired.
    pub async fn measure(&self, worker: usize, topic: &str, ready: oneshot::Sender<()>) -> Result<f64> {
        let subscription = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(AppError::cancelled(worker, topic, 0)),
            subscription = self.source.subscribe(topic) => subscription?,
        };

        self.logger.log_subscribed(worker, topic).await;

        // The launcher may have given up waiting; that is not our failure
        let _ = ready.send(());

        self.consume(worker, subscription).await
    }

    async fn consume(&self, worker: usize, mut subscription: Subscription) -> Result<f64> {
        let topic = subscription.topic().to_string();
        let mut count: u64 = 0;
        let mut clock: Option<Instant> = None;

        loop {
            let next = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    return Err(AppError::cancelled(worker, topic.as_str(), count));
                }
                next = subscription.next_event() => next,
            };

            let event = match next {
                Some(event) => event?,
                None => {
                    return Err(AppError::stream_exhausted(
                        worker,
                        topic.as_str(),
                        count,
                        self.target_count,
                    ));
                }
            };

            if event.label != topic {
                continue;
            }

            count += 1;

            if count == CLOCK_START_EVENT {
                clock = Some(Instant::now());
            }

            if self.print_every > 0 && count % self.print_every == 0 {
                self.progress.report(count, worker, &topic);
            }

            if count >= self.target_count {
                let elapsed = clock.map(|start| start.elapsed()).unwrap_or_default();
                return Ok(elapsed.as_secs_f64());
            }
        }
    }
}
