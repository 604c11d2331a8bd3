//! Main application orchestration and execution

use crate::{
    config::{display_config_summary, validate_config},
    error::Result,
    gate::{cancel_and_drain, wait_with_timeout},
    heartbeat::HeartbeatServer,
    logging::LoggerFactory,
    models::Config,
    output::{OutputCoordinator, OutputFormatterFactory},
    pool::{CompletionTracker, ResultSink, WorkerPool},
    probe::LatencyProbe,
    progress::{spawn_printer, ProgressSink, DEFAULT_PROGRESS_CAPACITY},
    readiness::{HealthCheck, HttpHealthCheck, ReadinessGate},
    source::{EventSource, EventSourceFactory},
    stats::RunReport,
    types::CompletionState,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// How long cancelled probes get to record their results after a timeout
pub const CANCEL_GRACE: Duration = Duration::from_secs(2);

/// How long to wait for queued progress lines before printing the report
const PRINTER_DRAIN: Duration = Duration::from_secs(1);

const HEARTBEAT_SHUTDOWN: Duration = Duration::from_secs(1);

/// Main application struct that coordinates all components
pub struct App {
    config: Config,
    source: Option<Arc<dyn EventSource>>,
    health: Option<Arc<dyn HealthCheck>>,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            source: None,
            health: None,
        }
    }

    /// Use this event source instead of the configured transport
    pub fn with_event_source(mut self, source: Arc<dyn EventSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Use this health check instead of polling the gateway over HTTP
    pub fn with_health_check(mut self, health: Arc<dyn HealthCheck>) -> Self {
        self.health = Some(health);
        self
    }

    /// Run the whole harness: heartbeat, readiness, pool, gate, report
    pub async fn run(self) -> Result<RunReport> {
        let config = &self.config;
        let loggers = LoggerFactory::new(config).await;
        let logger = loggers.create_logger("app");

        for warning in validate_config(config)? {
            eprintln!("{}", warning.format(config.enable_color));
        }

        if config.debug {
            println!("{}", crate::version_line());
            println!("Session: {}", loggers.session_id());
            println!("{}", display_config_summary(config));
            println!();
        }

        let shutdown = CancellationToken::new();

        let heartbeat = HeartbeatServer::bind(config.heartbeat_port).await?;
        logger
            .info("Heartbeat server listening")
            .field("addr", heartbeat.local_addr().to_string())
            .log()
            .await;
        let heartbeat_task = heartbeat.spawn(shutdown.clone());

        let health = match self.health {
            Some(health) => health,
            None => Arc::new(HttpHealthCheck::from_config(config)?),
        };
        println!("Waiting until RIG goes online...");
        ReadinessGate::new(health, config.poll_interval)
            .with_logger(loggers.create_logger("readiness"))
            .wait_until_ready()
            .await;

        let source = match self.source {
            Some(source) => source,
            None => EventSourceFactory::create(config)?,
        };

        let (progress, receiver) = ProgressSink::channel(DEFAULT_PROGRESS_CAPACITY);
        let printer = spawn_printer(receiver);
        let cancel = shutdown.child_token();

        let probe = LatencyProbe::new(source, &config.workload, progress.clone(), cancel.clone())
            .with_logger(loggers.create_logger("probe"));
        let pool = WorkerPool::new(Arc::new(probe), config.workload.topics.clone(), ResultSink::new())
            .with_logger(loggers.create_logger("pool"));

        println!("Starting {} workers", config.clients);
        logger
            .info(&format!("Launching {} workers", config.clients))
            .field("topics", config.workload.topics.to_string())
            .field("target_count", config.workload.target_count)
            .log()
            .await;

        let started = Instant::now();
        let tracker = CompletionTracker::new();

        // The deadline covers the launch phase too
        let state = match tokio::time::timeout(config.timeout, pool.launch(config.clients, &tracker)).await {
            Ok(()) => {
                println!("Waiting for workers to finish...");
                wait_with_timeout(&tracker, config.timeout.saturating_sub(started.elapsed())).await
            }
            Err(_) => CompletionState::TimedOut,
        };

        if state.timed_out() {
            logger
                .warn("Run timed out, cancelling outstanding workers")
                .field("outstanding", tracker.outstanding())
                .log()
                .await;

            if !cancel_and_drain(&tracker, &cancel, CANCEL_GRACE).await {
                logger
                    .warn("Some workers did not stop within the grace period")
                    .field("outstanding", tracker.outstanding())
                    .log()
                    .await;
            }
        }

        let wall_time = started.elapsed();
        let results = pool.sink().snapshot().await;
        let dropped = progress.dropped();

        // Release every progress sender so the printer can finish
        drop(pool);
        drop(progress);
        let _ = tokio::time::timeout(PRINTER_DRAIN, printer).await;

        let report = RunReport::build(&results, tracker.registered(), state, &config.workload, wall_time)
            .with_dropped_progress(dropped);

        let coordinator = OutputCoordinator::new(
            OutputFormatterFactory::create_formatter(config.enable_color),
            config.verbose,
        );
        println!("{}", coordinator.render_report(&report, &results)?);

        shutdown.cancel();
        match tokio::time::timeout(HEARTBEAT_SHUTDOWN, heartbeat_task).await {
            Ok(Ok(Err(error))) => logger.log_error(&error, "Heartbeat server").await,
            Ok(Ok(Ok(()))) | Ok(Err(_)) | Err(_) => {}
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::{TopicPlan, Workload};
    use crate::source::{ScriptedEvent, ScriptedSource};
    use async_trait::async_trait;

    struct AlwaysReady;

    #[async_trait]
    impl HealthCheck for AlwaysReady {
        async fn check(&self) -> Result<String> {
            Ok("OK".to_string())
        }
    }

    fn config(clients: usize, timeout: Duration) -> Config {
        let mut config = Config::new("127.0.0.1", clients, timeout);
        config.heartbeat_port = 0;
        config.enable_color = false;
        config.workload = Workload {
            target_count: 3,
            print_every: 1,
            topics: TopicPlan::Fixed("t".to_string()),
        };
        config
    }

    #[tokio::test]
    async fn test_run_to_completion() {
        let source = ScriptedSource::new(vec![
            ScriptedEvent::at(Duration::ZERO, "t"),
            ScriptedEvent::at(Duration::from_millis(10), "t"),
            ScriptedEvent::at(Duration::from_millis(30), "t"),
        ]);

        let report = App::new(config(3, Duration::from_secs(10)))
            .with_event_source(Arc::new(source))
            .with_health_check(Arc::new(AlwaysReady))
            .run()
            .await
            .unwrap();

        assert_eq!(report.state, CompletionState::Finished);
        assert_eq!(report.launched, 3);
        assert_eq!(report.completed, 3);
        assert_eq!(report.latency.unwrap().samples, 3);
    }

    #[tokio::test]
    async fn test_timeout_cancels_stuck_workers() {
        let source = ScriptedSource::new(vec![ScriptedEvent::at(Duration::ZERO, "t")]).hold_open();

        let report = App::new(config(2, Duration::from_millis(100)))
            .with_event_source(Arc::new(source))
            .with_health_check(Arc::new(AlwaysReady))
            .run()
            .await
            .unwrap();

        assert_eq!(report.state, CompletionState::TimedOut);
        assert_eq!(report.launched, 2);
        assert_eq!(report.cancelled, 2);
        assert_eq!(report.unreported, 0);
        assert!(report.latency.is_none());
    }

    #[tokio::test]
    async fn test_heartbeat_port_in_use_is_fatal() {
        let taken = std::net::TcpListener::bind("0.0.0.0:0").unwrap();
        let mut config = config(1, Duration::from_secs(1));
        config.heartbeat_port = taken.local_addr().unwrap().port();

        let error = App::new(config)
            .with_event_source(Arc::new(ScriptedSource::new(vec![])))
            .with_health_check(Arc::new(AlwaysReady))
            .run()
            .await
            .unwrap_err();

        assert!(matches!(error, AppError::Io(_)));
    }
}
