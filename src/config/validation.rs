//! Configuration sanity checks that warn rather than fail

use crate::{
    error::Result,
    models::{Config, TopicPlan},
};

/// Run-shape checks on top of `Config::validate`
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate configuration and collect non-fatal warnings
    pub fn validate_comprehensive(config: &Config) -> Result<Vec<ValidationWarning>> {
        config.validate()?;

        let mut warnings = Vec::new();
        warnings.extend(Self::validate_load_shape(config));
        warnings.extend(Self::validate_topic_spread(config));
        warnings.extend(Self::validate_ports(config));

        Ok(warnings)
    }

    fn validate_load_shape(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if config.clients > 10_000 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!(
                    "{} clients will open {} long-lived connections from one process; check the file descriptor limit",
                    config.clients, config.clients
                ),
            ));
        }

        if config.timeout < config.poll_interval {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                "Run timeout is shorter than the readiness poll interval".to_string(),
            ));
        }

        if config.workload.print_every > config.workload.target_count {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!(
                    "Print interval {} exceeds target count {}; no progress lines will be shown",
                    config.workload.print_every, config.workload.target_count
                ),
            ));
        }

        warnings
    }

    fn validate_topic_spread(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if let TopicPlan::RoundRobin { max, .. } = &config.workload.topics {
            if *max > config.clients {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Info,
                    format!(
                        "Topic range {} exceeds client count {}; topics above {} get no subscriber",
                        max, config.clients, config.clients
                    ),
                ));
            }
        }

        warnings
    }

    fn validate_ports(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if config.heartbeat_port == 0 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                "Heartbeat port 0 binds an ephemeral port; orchestrators cannot find it".to_string(),
            ));
        }

        if config.event_port == config.health_port {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!("Event and health endpoints share port {}", config.event_port),
            ));
        }

        warnings
    }
}

/// Validation warning levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationLevel {
    Info,
    Warning,
}

impl ValidationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationLevel::Info => "INFO",
            ValidationLevel::Warning => "WARN",
        }
    }
}

/// Non-fatal finding about the configuration
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub level: ValidationLevel,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(level: ValidationLevel, message: String) -> Self {
        Self { level, message }
    }

    /// Format warning for display
    pub fn format(&self, use_color: bool) -> String {
        if use_color {
            use colored::Colorize;
            let tag = match self.level {
                ValidationLevel::Info => self.level.as_str().cyan(),
                ValidationLevel::Warning => self.level.as_str().yellow(),
            };
            format!("[{}] {}", tag, self.message)
        } else {
            format!("[{}] {}", self.level.as_str(), self.message)
        }
    }
}

/// Convenience function for comprehensive configuration validation
pub fn validate_config(config: &Config) -> Result<Vec<ValidationWarning>> {
    ConfigValidator::validate_comprehensive(config)
}
