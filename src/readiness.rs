//! Readiness gate: block until the gateway reports healthy.
//!
//! There is deliberately no overall timeout. The harness would rather hang
//! than measure a gateway that is still starting.

use crate::{
    error::{AppError, Result},
    logging::Logger,
    models::Config,
};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Substring the health body must contain
pub const READY_MARKER: &str = "OK";

const HEALTH_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// One probe of the gateway's health endpoint
#[async_trait]
pub trait HealthCheck: Send + Sync {
    /// Fetch the current health body
    async fn check(&self) -> Result<String>;
}

/// `GET <url>` and return the body
pub struct HttpHealthCheck {
    client: Client,
    url: Url,
}

impl HttpHealthCheck {
    pub fn new(url: Url) -> Result<Self> {
        let client = Client::builder()
            .timeout(HEALTH_REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, url })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.health_url()?)
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl HealthCheck for HttpHealthCheck {
    async fn check(&self) -> Result<String> {
        let response = self.client.get(self.url.clone()).send().await?;
        Ok(response.text().await?)
    }
}

pub struct ReadinessGate {
    check: Arc<dyn HealthCheck>,
    poll_interval: Duration,
    logger: Logger,
}

impl ReadinessGate {
    pub fn new(check: Arc<dyn HealthCheck>, poll_interval: Duration) -> Self {
        Self {
            check,
            poll_interval,
            logger: Logger::new("readiness"),
        }
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    /// Poll until the health body contains [`READY_MARKER`]; returns the number of polls
    pub async fn wait_until_ready(&self) -> u64 {
        let mut polls = 0;

        loop {
            polls += 1;

            match self.check.check().await {
                Ok(body) if body.contains(READY_MARKER) => {
                    self.logger
                        .info("Gateway is ready")
                        .field("polls", polls)
                        .log()
                        .await;
                    return polls;
                }
                Ok(body) => {
                    self.logger
                        .debug("Gateway not ready yet")
                        .field("poll", polls)
                        .field("body", body.trim())
                        .log()
                        .await;
                }
                Err(error) => {
                    self.logger
                        .debug("Health check failed")
                        .field("poll", polls)
                        .error_info(&error)
                        .log()
                        .await;
                }
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
