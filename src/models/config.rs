//! Configuration data model and validation

use crate::logging::LogFormat;
use crate::models::workload::{Scenario, Workload};
use crate::types::{AppError, Result, Transport};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Immutable run configuration, built once at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Gateway host name or address
    pub host: String,

    /// Number of concurrent subscriber workers
    pub clients: usize,

    /// Upper bound on the whole run
    pub timeout: Duration,

    /// Subscription transport
    pub transport: Transport,

    /// Port of the gateway's connection endpoints
    pub event_port: u16,

    /// Port of the gateway's health endpoint
    pub health_port: u16,

    /// Port this process answers liveness checks on
    pub heartbeat_port: u16,

    /// Delay between readiness polls
    pub poll_interval: Duration,

    /// Scenario the workload was derived from
    pub scenario: Scenario,

    /// Per-worker workload
    pub workload: Workload,

    /// Enable colored terminal output
    pub enable_color: bool,

    /// Log output format
    pub log_format: LogFormat,

    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,
}

impl Config {
    /// Create a configuration from the three required settings, defaults elsewhere
    pub fn new<S: Into<String>>(host: S, clients: usize, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            clients,
            timeout,
            transport: Transport::Sse,
            event_port: crate::defaults::DEFAULT_EVENT_PORT,
            health_port: crate::defaults::DEFAULT_HEALTH_PORT,
            heartbeat_port: crate::defaults::DEFAULT_HEARTBEAT_PORT,
            poll_interval: crate::defaults::DEFAULT_POLL_INTERVAL,
            scenario: crate::defaults::DEFAULT_SCENARIO,
            workload: crate::defaults::DEFAULT_SCENARIO.workload(),
            enable_color: crate::defaults::DEFAULT_ENABLE_COLOR,
            log_format: LogFormat::Console,
            verbose: false,
            debug: false,
        }
    }

    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(AppError::config("Target host cannot be empty"));
        }

        if self.host.contains("://") || self.host.contains('/') {
            return Err(AppError::config(format!(
                "Target host must be a bare host name or address, got '{}'",
                self.host
            )));
        }

        if self.clients == 0 {
            return Err(AppError::config("Client count must be greater than 0"));
        }

        if self.timeout.is_zero() {
            return Err(AppError::config("Timeout must be greater than 0"));
        }

        for (name, port) in [
            ("Event port", self.event_port),
            ("Health port", self.health_port),
        ] {
            if port == 0 {
                return Err(AppError::config(format!("{} must be greater than 0", name)));
            }
        }

        self.workload.validate()?;

        // Both endpoint URLs must be buildable from the host
        self.health_url()?;
        self.subscription_url(self.workload.topics.base())?;

        Ok(())
    }

    /// Health endpoint polled by the readiness gate
    pub fn health_url(&self) -> Result<Url> {
        let url = Url::parse(&format!("http://{}:{}/health", self.host, self.health_port))
            .map_err(|e| AppError::config(format!("Invalid health URL for host '{}': {}", self.host, e)))?;
        Ok(url)
    }

    /// Subscription endpoint for one topic on the configured transport
    pub fn subscription_url(&self, topic: &str) -> Result<Url> {
        subscription_url(self.transport, &self.host, self.event_port, topic)
    }
}

/// Build `<scheme>://host:port/<path>?subscriptions=[{"eventType":"<topic>"}]`
pub fn subscription_url(transport: Transport, host: &str, port: u16, topic: &str) -> Result<Url> {
    let mut url = Url::parse(&format!(
        "{}://{}:{}{}",
        transport.scheme(),
        host,
        port,
        transport.connection_path()
    ))
    .map_err(|e| AppError::config(format!("Invalid subscription URL for host '{}': {}", host, e)))?;

    let subscriptions = serde_json::json!([{ "eventType": topic }]);
    url.query_pairs_mut()
        .append_pair("subscriptions", &subscriptions.to_string());

    Ok(url)
}
