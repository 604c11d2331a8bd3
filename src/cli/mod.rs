//! Command-line interface module

use crate::{
    config::parse_duration,
    error::AppError,
    logging::LogFormat,
    models::Scenario,
    types::Transport,
};
use clap::Parser;
use std::str::FromStr;
use std::time::Duration;

/// RIG Load Tester - measures event-delivery latency across many concurrent subscribers
///
/// Every setting can also be given as an environment variable (shown in
/// brackets) or in a `.env` file in the working directory.
#[derive(Parser, Debug, Clone)]
#[command(name = "rlt")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Gateway host name or address (required)
    #[arg(long, env = "RIG_HOST")]
    pub host: Option<String>,

    /// Number of concurrent subscribers (required)
    #[arg(short, long, env = "CLIENTS", value_parser = parse_positive::<usize>)]
    pub clients: Option<usize>,

    /// Total run timeout, e.g. 90s, 5m, 1m30s (required)
    #[arg(short, long, env = "TIMEOUT", value_parser = parse_duration_arg)]
    pub timeout: Option<Duration>,

    /// Subscription transport: sse or ws
    #[arg(long, env = "TRANSPORT", value_parser = parse_setting::<Transport>)]
    pub transport: Option<Transport>,

    /// Workload preset: delivery, chatroom or multi-topic
    #[arg(long, env = "SCENARIO", value_parser = parse_setting::<Scenario>)]
    pub scenario: Option<Scenario>,

    /// Matching event number that stops each worker's clock
    #[arg(long, env = "TARGET_COUNT", value_parser = parse_positive::<u64>)]
    pub target_count: Option<u64>,

    /// Emit a progress line every N matching events
    #[arg(long, env = "PRINT_EVERY", value_parser = parse_positive::<u64>)]
    pub print_every: Option<u64>,

    /// Topic to subscribe to (prefix when a topic range is set)
    #[arg(long, env = "TOPIC")]
    pub topic: Option<String>,

    /// Spread workers round-robin over topics <topic>1..=<N>
    #[arg(long, env = "TOPIC_RANGE", value_parser = parse_positive::<usize>)]
    pub topic_range: Option<usize>,

    /// Gateway connection endpoint port
    #[arg(long, env = "EVENT_PORT")]
    pub event_port: Option<u16>,

    /// Gateway health endpoint port
    #[arg(long, env = "HEALTH_PORT")]
    pub health_port: Option<u16>,

    /// Local liveness endpoint port
    #[arg(long, env = "HEARTBEAT_PORT")]
    pub heartbeat_port: Option<u16>,

    /// Delay between readiness polls, e.g. 250ms
    #[arg(long, env = "POLL_INTERVAL", value_parser = parse_duration_arg)]
    pub poll_interval: Option<Duration>,

    /// Log output format: console, json or compact
    #[arg(long, env = "LOG_FORMAT", value_parser = parse_setting::<LogFormat>)]
    pub log_format: Option<LogFormat>,

    /// Force colored output
    #[arg(long)]
    pub color: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,

    /// Describe the supported environment variables and exit
    #[arg(long)]
    pub env_help: bool,
}

impl Cli {
    /// Validate CLI arguments for conflicts
    pub fn validate(&self) -> Result<(), String> {
        if self.color && self.no_color {
            return Err("Cannot specify both --color and --no-color".to_string());
        }

        Ok(())
    }

    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        if self.color {
            true
        } else if self.no_color {
            false
        } else {
            supports_color()
        }
    }
}

/// Integer strictly greater than zero
fn parse_positive<T>(value: &str) -> Result<T, String>
where
    T: FromStr + PartialOrd + Default,
{
    match value.trim().parse::<T>() {
        Ok(parsed) if parsed > T::default() => Ok(parsed),
        _ => Err(format!("'{}' is not a positive integer", value)),
    }
}

fn parse_duration_arg(value: &str) -> Result<Duration, String> {
    parse_duration(value).map_err(|e| e.to_string())
}

fn parse_setting<T: FromStr<Err = AppError>>(value: &str) -> Result<T, String> {
    value.parse().map_err(|e: AppError| e.to_string())
}

/// Check if the terminal supports color output
fn supports_color() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    #[cfg(unix)]
    {
        true
    }
    #[cfg(not(unix))]
    {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing_basic() {
        let cli = Cli::parse_from([
            "rlt", "--host", "rig.local", "--clients", "25", "--timeout", "90s",
        ]);
        assert_eq!(cli.host.as_deref(), Some("rig.local"));
        assert_eq!(cli.clients, Some(25));
        assert_eq!(cli.timeout, Some(Duration::from_secs(90)));
        assert!(!cli.verbose);
        assert!(!cli.debug);
    }

    #[test]
    fn test_cli_parsing_all_options() {
        let cli = Cli::parse_from([
            "rlt",
            "--host", "localhost",
            "-c", "3",
            "-t", "1m",
            "--transport", "ws",
            "--scenario", "multi-topic",
            "--target-count", "500",
            "--print-every", "50",
            "--topic", "room",
            "--topic-range", "10",
            "--event-port", "4001",
            "--health-port", "4011",
            "--heartbeat-port", "9998",
            "--poll-interval", "1s",
            "--log-format", "json",
            "--no-color",
            "--verbose",
            "--debug",
        ]);

        assert_eq!(cli.clients, Some(3));
        assert_eq!(cli.timeout, Some(Duration::from_secs(60)));
        assert_eq!(cli.transport, Some(Transport::WebSocket));
        assert_eq!(cli.scenario, Some(Scenario::MultiTopic));
        assert_eq!(cli.target_count, Some(500));
        assert_eq!(cli.print_every, Some(50));
        assert_eq!(cli.topic.as_deref(), Some("room"));
        assert_eq!(cli.topic_range, Some(10));
        assert_eq!(cli.event_port, Some(4001));
        assert_eq!(cli.health_port, Some(4011));
        assert_eq!(cli.heartbeat_port, Some(9998));
        assert_eq!(cli.poll_interval, Some(Duration::from_secs(1)));
        assert_eq!(cli.log_format, Some(LogFormat::Json));
        assert!(cli.no_color);
        assert!(cli.verbose);
        assert!(cli.debug);
    }

    #[test]
    fn test_conflicting_color_flags() {
        let cli = Cli::parse_from(["rlt", "--color", "--no-color"]);
        assert!(cli.validate().is_err());

        let cli = Cli::parse_from(["rlt", "--no-color"]);
        assert!(cli.validate().is_ok());
        assert!(!cli.use_colors());

        let cli = Cli::parse_from(["rlt", "--color"]);
        assert!(cli.use_colors());
    }

    #[test]
    fn test_typed_values_are_checked_by_clap() {
        for args in [
            ["rlt", "--clients", "two"],
            ["rlt", "--clients", "0"],
            ["rlt", "--timeout", "soon"],
            ["rlt", "--target-count", "-3"],
            ["rlt", "--event-port", "70000"],
            ["rlt", "--transport", "smoke"],
        ] {
            assert!(Cli::try_parse_from(args).is_err(), "{:?} should be rejected", args);
        }

        let error = Cli::try_parse_from(["rlt", "--clients", "lots"]).unwrap_err().to_string();
        assert!(error.contains("'lots' is not a positive integer"));
        assert!(error.contains("CLIENTS"));

        let error = Cli::try_parse_from(["rlt", "--transport", "smoke"]).unwrap_err().to_string();
        assert!(error.contains("Invalid transport"));
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
