//! Data models and structures for the load tester

pub mod config;
pub mod metrics;
pub mod workload;

// Re-export main model types
pub use config::Config;
pub use metrics::ProbeResult;
pub use workload::{Scenario, TopicPlan, Workload};
