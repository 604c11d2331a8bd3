//! Configuration parsing from CLI arguments and environment variables

use crate::{
    cli::Cli,
    config::duration::format_duration,
    error::{AppError, Result},
    models::{Config, TopicPlan},
};

/// Configuration parser that turns CLI/environment values into a `Config`.
///
/// Clap has already parsed the individual values; this layer enforces the
/// required settings and applies the scenario preset plus overrides.
pub struct ConfigParser {
    cli: Cli,
}

impl ConfigParser {
    /// Create a new configuration parser with CLI arguments
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Parse and build the complete configuration
    pub fn parse(&self) -> Result<Config> {
        self.cli.validate().map_err(AppError::config)?;

        let host = require_host(&self.cli.host)?;
        let clients = require(self.cli.clients, "CLIENTS", "--clients")?;
        let timeout = require(self.cli.timeout, "TIMEOUT", "--timeout")?;

        let mut config = Config::new(host, clients, timeout);

        if let Some(transport) = self.cli.transport {
            config.transport = transport;
        }

        self.apply_workload(&mut config)?;
        self.apply_ports(&mut config);

        if let Some(interval) = self.cli.poll_interval {
            config.poll_interval = interval;
        }

        if let Some(format) = self.cli.log_format {
            config.log_format = format;
        }

        config.enable_color = self.cli.use_colors();
        config.verbose = self.cli.verbose;
        config.debug = self.cli.debug;

        config.validate()?;

        Ok(config)
    }

    /// Start from the scenario preset, then apply individual overrides
    fn apply_workload(&self, config: &mut Config) -> Result<()> {
        if let Some(scenario) = self.cli.scenario {
            config.scenario = scenario;
            config.workload = scenario.workload();
        }

        if let Some(target) = self.cli.target_count {
            config.workload.target_count = target;
        }

        if let Some(every) = self.cli.print_every {
            config.workload.print_every = every;
        }

        if let Some(topic) = &self.cli.topic {
            let topic = topic.trim().to_string();
            if topic.is_empty() {
                return Err(AppError::config("TOPIC cannot be empty"));
            }
            config.workload.topics = config.workload.topics.with_base(topic);
        }

        if let Some(max) = self.cli.topic_range {
            config.workload.topics = TopicPlan::RoundRobin {
                prefix: config.workload.topics.base().to_string(),
                max,
            };
        }

        Ok(())
    }

    fn apply_ports(&self, config: &mut Config) {
        if let Some(port) = self.cli.event_port {
            config.event_port = port;
        }
        if let Some(port) = self.cli.health_port {
            config.health_port = port;
        }
        if let Some(port) = self.cli.heartbeat_port {
            config.heartbeat_port = port;
        }
    }
}

fn missing(var: &str, flag: &str) -> AppError {
    AppError::config(format!("{} environment variable required (or pass {})", var, flag))
}

fn require<T>(value: Option<T>, var: &str, flag: &str) -> Result<T> {
    value.ok_or_else(|| missing(var, flag))
}

fn require_host(value: &Option<String>) -> Result<String> {
    match value.as_deref().map(str::trim) {
        Some(host) if !host.is_empty() => Ok(host.to_string()),
        _ => Err(missing("RIG_HOST", "--host")),
    }
}

/// Convenience function to load complete configuration from CLI arguments
pub fn load_config(cli: Cli) -> Result<Config> {
    ConfigParser::new(cli).parse()
}

/// Display configuration summary for debug purposes
pub fn display_config_summary(config: &Config) -> String {
    let mut summary = Vec::new();

    summary.push(format!("Target Host: {}", config.host));
    summary.push(format!("Clients: {}", config.clients));
    summary.push(format!("Timeout: {}", format_duration(config.timeout)));
    summary.push(format!("Transport: {}", config.transport));
    summary.push(format!("Scenario: {}", config.scenario.name()));
    summary.push(format!("Topics: {}", config.workload.topics));
    summary.push(format!("Target Count: {}", config.workload.target_count));
    summary.push(format!("Print Every: {}", config.workload.print_every));
    summary.push(format!(
        "Ports: events={} health={} heartbeat={}",
        config.event_port, config.health_port, config.heartbeat_port
    ));
    summary.push(format!("Poll Interval: {}", format_duration(config.poll_interval)));
    summary.push(format!("Color Output: {}", config.enable_color));
    summary.push(format!("Verbose: {}", config.verbose));
    summary.push(format!("Debug: {}", config.debug));

    summary.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{logging::LogFormat, models::Scenario, types::Transport};
    use clap::Parser;
    use std::sync::Mutex;
    use std::time::Duration;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const ENV_VARS: &[&str] = &[
        "RIG_HOST", "CLIENTS", "TIMEOUT", "TRANSPORT", "SCENARIO", "TARGET_COUNT", "PRINT_EVERY",
        "TOPIC", "TOPIC_RANGE", "EVENT_PORT", "HEALTH_PORT", "HEARTBEAT_PORT", "POLL_INTERVAL",
        "LOG_FORMAT",
    ];

    fn parse(args: &[&str]) -> Result<Config> {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        for var in ENV_VARS {
            std::env::remove_var(var);
        }
        let mut argv = vec!["rlt"];
        argv.extend_from_slice(args);
        ConfigParser::new(Cli::try_parse_from(argv)?).parse()
    }

    const REQUIRED: &[&str] = &["--host", "localhost", "--clients", "4", "--timeout", "30s"];

    fn parse_with(extra: &[&str]) -> Result<Config> {
        let mut args = REQUIRED.to_vec();
        args.extend_from_slice(extra);
        parse(&args)
    }

    #[test]
    fn test_required_settings() {
        let config = parse_with(&[]).unwrap();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.clients, 4);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.transport, Transport::Sse);
        assert_eq!(config.scenario, Scenario::Chatroom);
    }

    #[test]
    fn test_missing_host_is_fatal() {
        let error = parse(&["--clients", "4", "--timeout", "30s"]).unwrap_err();
        assert!(matches!(error, AppError::Config(_)));
        assert!(error.to_string().contains("RIG_HOST"));
        assert_eq!(error.exit_code(), 1);
    }

    #[test]
    fn test_missing_clients_is_fatal() {
        let error = parse(&["--host", "localhost", "--timeout", "30s"]).unwrap_err();
        assert!(error.to_string().contains("CLIENTS"));
    }

    #[test]
    fn test_missing_timeout_is_fatal() {
        let error = parse(&["--host", "localhost", "--clients", "4"]).unwrap_err();
        assert!(error.to_string().contains("TIMEOUT"));
    }

    #[test]
    fn test_unparsable_values_are_fatal() {
        let error = parse(&["--host", "h", "--clients", "many", "--timeout", "30s"]).unwrap_err();
        assert!(matches!(error, AppError::Config(_)));
        assert!(error.to_string().contains("'many' is not a positive integer"));
        assert!(parse(&["--host", "h", "--clients", "0", "--timeout", "30s"]).is_err());
        assert!(parse(&["--host", "h", "--clients", "4", "--timeout", "soon"]).is_err());
        assert!(parse(&["--host", "h", "--clients", "4", "--timeout", "30"]).is_err());
    }

    #[test]
    fn test_scenario_preset_and_overrides() {
        let config = parse_with(&["--scenario", "delivery"]).unwrap();
        assert_eq!(config.workload.target_count, 3);
        assert_eq!(config.workload.topics, TopicPlan::Fixed("to_be_delivered".to_string()));

        let config = parse_with(&["--scenario", "multi-topic", "--target-count", "50", "--topic", "room"]).unwrap();
        assert_eq!(config.workload.target_count, 50);
        assert_eq!(config.workload.print_every, 100);
        assert_eq!(
            config.workload.topics,
            TopicPlan::RoundRobin { prefix: "room".to_string(), max: 100 }
        );
    }

    #[test]
    fn test_topic_range_turns_fixed_topic_into_round_robin() {
        let config = parse_with(&["--topic-range", "5"]).unwrap();
        assert_eq!(
            config.workload.topics,
            TopicPlan::RoundRobin { prefix: "chatroom_message".to_string(), max: 5 }
        );
    }

    #[test]
    fn test_optional_settings() {
        let config = parse_with(&[
            "--transport", "ws",
            "--event-port", "4100",
            "--health-port", "4110",
            "--heartbeat-port", "9000",
            "--poll-interval", "1s",
            "--log-format", "compact",
            "--no-color",
            "--debug",
        ])
        .unwrap();

        assert_eq!(config.transport, Transport::WebSocket);
        assert_eq!(config.event_port, 4100);
        assert_eq!(config.health_port, 4110);
        assert_eq!(config.heartbeat_port, 9000);
        assert_eq!(config.poll_interval, Duration::from_secs(1));
        assert_eq!(config.log_format, LogFormat::Compact);
        assert!(!config.enable_color);
        assert!(config.debug);
    }

    #[test]
    fn test_invalid_optional_settings() {
        assert!(parse_with(&["--transport", "carrier-pigeon"]).is_err());
        assert!(parse_with(&["--scenario", "everything"]).is_err());
        assert!(parse_with(&["--target-count", "1"]).is_err());
        assert!(parse_with(&["--event-port", "70000"]).is_err());
        assert!(parse_with(&["--log-format", "xml"]).is_err());
    }

    #[test]
    fn test_config_summary() {
        let config = parse_with(&["--scenario", "multi-topic"]).unwrap();
        let summary = display_config_summary(&config);

        assert!(summary.contains("Target Host: localhost"));
        assert!(summary.contains("Clients: 4"));
        assert!(summary.contains("Timeout: 30s"));
        assert!(summary.contains("Topics: chatroom_message{1..100}"));
    }
}
