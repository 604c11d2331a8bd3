//! RIG Load Tester
//!
//! Measures event-delivery latency through a RIG pub/sub gateway by opening
//! many concurrent subscriptions, timing how long each takes to receive a
//! target number of events, and reporting the aggregate.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod gate;
pub mod heartbeat;
pub mod logging;
pub mod models;
pub mod output;
pub mod pool;
pub mod probe;
pub mod progress;
pub mod readiness;
pub mod source;
pub mod stats;
pub mod types;

// Re-export commonly used types
pub use app::App;
pub use error::{AppError, Result};
pub use models::{Config, ProbeResult, Scenario, TopicPlan, Workload};
pub use pool::{CompletionTracker, ResultSink, WorkerPool};
pub use probe::LatencyProbe;
pub use source::{Event, EventSource, Subscription};
pub use stats::{LatencySummary, RunReport};
pub use types::{CompletionState, Transport};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
pub const BUILD_TIME: &str = env!("BUILD_TIME");

/// Version line including the commit when built from a git checkout
pub fn version_line() -> String {
    match option_env!("GIT_COMMIT") {
        Some(commit) => format!("{} v{} ({}, built {})", PKG_NAME, VERSION, commit, BUILD_TIME),
        None => format!("{} v{} (built {})", PKG_NAME, VERSION, BUILD_TIME),
    }
}

/// Default configuration values
pub mod defaults {
    use crate::models::Scenario;
    use std::time::Duration;

    pub const DEFAULT_EVENT_PORT: u16 = 4000;
    pub const DEFAULT_HEALTH_PORT: u16 = 4010;
    pub const DEFAULT_HEARTBEAT_PORT: u16 = 9999;
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);
    pub const DEFAULT_SCENARIO: Scenario = Scenario::Chatroom;
    pub const DEFAULT_ENABLE_COLOR: bool = true;
}
