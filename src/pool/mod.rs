//! Worker pool: launches one latency probe per worker
//!
//! Workers are launched strictly in order. Worker `i + 1` is not spawned until
//! worker `i` has confirmed its subscription is live (or failed trying), which
//! keeps subscription storms off the gateway and makes startup order
//! deterministic. Completion order is unconstrained.

pub mod completion;
pub mod sink;

pub use completion::{CompletionToken, CompletionTracker};
pub use sink::ResultSink;

use crate::{
    logging::Logger,
    models::{ProbeResult, TopicPlan},
    probe::LatencyProbe,
};
use std::sync::Arc;
use tokio::sync::oneshot;

pub struct WorkerPool {
    probe: Arc<LatencyProbe>,
    topics: TopicPlan,
    sink: ResultSink,
    logger: Logger,
}

impl WorkerPool {
    pub fn new(probe: Arc<LatencyProbe>, topics: TopicPlan, sink: ResultSink) -> Self {
        Self {
            probe,
            topics,
            sink,
            logger: Logger::new("pool"),
        }
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub fn sink(&self) -> &ResultSink {
        &self.sink
    }

    /// Launch `worker_count` workers and return the tracker they report to.
    ///
    /// Returns once the last worker has been launched and its rendezvous has
    /// fired; the workers themselves may still be running.
    pub async fn run(&self, worker_count: usize) -> CompletionTracker {
        let tracker = CompletionTracker::new();
        self.launch(worker_count, &tracker).await;
        tracker
    }

    /// Launch workers reporting to an existing tracker.
    ///
    /// If this future is dropped part way, workers already launched keep
    /// running and stay registered with `tracker`.
    pub async fn launch(&self, worker_count: usize, tracker: &CompletionTracker) {
        for worker in 1..=worker_count {
            let topic = self.topics.topic_for(worker);
            let (ready_tx, ready_rx) = oneshot::channel();

            self.logger
                .debug(&format!("Launching worker {}", worker))
                .field("worker", worker)
                .field("topic", &topic)
                .log()
                .await;

            let probe = Arc::clone(&self.probe);
            let sink = self.sink.clone();
            let logger = self.logger.clone();

            // No await between registering and spawning
            let token = tracker.register();
            tokio::spawn(async move {
                let _token = token;

                let outcome = probe.measure(worker, &topic, ready_tx).await;
                if let Err(error) = &outcome {
                    logger
                        .debug(&format!("Worker {} stopped", worker))
                        .field("worker", worker)
                        .error_info(error)
                        .log()
                        .await;
                }

                sink.record(ProbeResult::from_outcome(worker, topic, outcome)).await;
            });

            // A dropped sender means the worker failed before subscribing
            if ready_rx.await.is_err() {
                self.logger
                    .debug(&format!("Worker {} never subscribed", worker))
                    .field("worker", worker)
                    .log()
                    .await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        gate::wait_with_timeout,
        models::Workload,
        progress::ProgressSink,
        source::{ScriptedEvent, ScriptedSource},
        types::{CompletionState, WorkerStatus},
    };
    use std::time::Duration;
    use tokio::time::Instant;
    use tokio_util::sync::CancellationToken;

    fn pool(source: Arc<ScriptedSource>, topics: TopicPlan, target_count: u64) -> WorkerPool {
        let workload = Workload {
            target_count,
            print_every: 1000,
            topics: topics.clone(),
        };
        let probe = LatencyProbe::new(
            source,
            &workload,
            ProgressSink::disabled(),
            CancellationToken::new(),
        );
        WorkerPool::new(Arc::new(probe), topics, ResultSink::quiet())
    }

    #[tokio::test(start_paused = true)]
    async fn test_launches_each_worker_after_previous_rendezvous() {
        let source = Arc::new(
            ScriptedSource::new(vec![])
                .with_subscribe_delay(Duration::from_millis(10))
                .hold_open(),
        );
        let topics = TopicPlan::RoundRobin {
            prefix: "room".to_string(),
            max: 3,
        };
        let pool = pool(Arc::clone(&source), topics, 2);

        let start = Instant::now();
        let tracker = pool.run(5).await;

        assert!(start.elapsed() >= Duration::from_millis(50));
        assert_eq!(source.attempts(), 5);
        assert_eq!(
            source.subscribed_topics().await,
            vec!["room1", "room2", "room3", "room1", "room2"]
        );
        assert_eq!(tracker.outstanding(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_worker_reports_once() {
        let script = vec![
            ScriptedEvent::at(Duration::ZERO, "t"),
            ScriptedEvent::at(Duration::from_millis(10), "t"),
            ScriptedEvent::at(Duration::from_millis(30), "t"),
        ];
        let source = Arc::new(ScriptedSource::new(script));
        let pool = pool(source, TopicPlan::Fixed("t".to_string()), 3);

        let tracker = pool.run(4).await;
        let state = wait_with_timeout(&tracker, Duration::from_secs(5)).await;
        assert_eq!(state, CompletionState::Finished);

        let results = pool.sink().snapshot().await;
        assert_eq!(results.len(), 4);
        for result in results {
            assert!(result.is_successful());
            assert!((result.elapsed_seconds.unwrap() - 0.020).abs() < 1e-3);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_still_complete_the_run() {
        let source = Arc::new(
            ScriptedSource::new(vec![ScriptedEvent::at(Duration::ZERO, "t2")]).fail_topic("t1"),
        );
        let topics = TopicPlan::RoundRobin {
            prefix: "t".to_string(),
            max: 2,
        };
        let pool = pool(Arc::clone(&source), topics, 3);

        let tracker = pool.run(2).await;
        let state = wait_with_timeout(&tracker, Duration::from_secs(5)).await;
        assert_eq!(state, CompletionState::Finished);

        let mut results = pool.sink().snapshot().await;
        results.sort_by_key(|r| r.worker);
        assert_eq!(results[0].status, WorkerStatus::Failed);
        assert_eq!(results[1].status, WorkerStatus::Exhausted);
        assert_eq!(source.attempts(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_during_launch_counts_only_spawned_workers() {
        let source = Arc::new(
            ScriptedSource::new(vec![])
                .with_subscribe_delay(Duration::from_millis(100))
                .hold_open(),
        );
        let pool = pool(Arc::clone(&source), TopicPlan::Fixed("t".to_string()), 2);
        let tracker = CompletionTracker::new();

        // Workers 1 and 2 go live at 100ms and 200ms; the deadline hits while waiting on worker 3
        let launched = tokio::time::timeout(Duration::from_millis(250), pool.launch(5, &tracker)).await;
        assert!(launched.is_err());
        tokio::task::yield_now().await;

        assert_eq!(tracker.registered(), 3);
        assert_eq!(source.attempts(), 3);
        assert_eq!(tracker.outstanding(), 3);
    }

    #[tokio::test]
    async fn test_zero_workers_is_already_complete() {
        let source = Arc::new(ScriptedSource::new(vec![]));
        let pool = pool(source, TopicPlan::Fixed("t".to_string()), 2);

        let tracker = pool.run(0).await;
        assert!(tracker.is_complete());
        assert!(pool.sink().is_empty().await);
    }
}
