//! Environment variable handling and .env file management

use crate::error::{AppError, Result};
use std::path::Path;

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load `.env` from the current directory if it exists.
    ///
    /// Variables already set in the process environment win over the file.
    pub fn load_env_file() -> Result<bool> {
        Self::load_env_file_from(Path::new(".env"))
    }

    /// Load a specific env file if it exists, returning whether it was found
    pub fn load_env_file_from(path: &Path) -> Result<bool> {
        if !path.exists() {
            return Ok(false);
        }

        dotenv::from_path(path)
            .map_err(|e| AppError::config(format!("Failed to load {}: {}", path.display(), e)))?;
        Ok(true)
    }

    /// Create example .env file content
    pub fn create_example_env_content() -> String {
        r#"# RIG Load Tester Configuration
#
# Values here are read before command-line parsing; flags and variables
# already exported in the shell take precedence.

# Required: gateway host, number of subscribers, total run timeout
RIG_HOST=localhost
CLIENTS=100
TIMEOUT=5m

# Transport: sse or ws
# TRANSPORT=sse

# Scenario preset: delivery, chatroom or multi-topic
# SCENARIO=chatroom

# Overrides for the scenario preset
# TARGET_COUNT=100000
# PRINT_EVERY=1000
# TOPIC=chatroom_message
# TOPIC_RANGE=100

# Ports
# EVENT_PORT=4000
# HEALTH_PORT=4010
# HEARTBEAT_PORT=9999

# Delay between readiness polls
# POLL_INTERVAL=250ms

# Log format: console, json or compact
# LOG_FORMAT=console
"#
        .to_string()
    }

    /// Get list of all supported environment variables with descriptions
    pub fn get_supported_env_vars() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            ("RIG_HOST", "Gateway host name or address (required)", "localhost"),
            ("CLIENTS", "Number of concurrent subscribers (required)", "100"),
            ("TIMEOUT", "Total run timeout (required)", "5m, 90s, 1m30s"),
            ("TRANSPORT", "Subscription transport", "sse | ws"),
            ("SCENARIO", "Workload preset", "delivery | chatroom | multi-topic"),
            ("TARGET_COUNT", "Matching event number that stops the clock", "100000"),
            ("PRINT_EVERY", "Progress line every N matching events", "1000"),
            ("TOPIC", "Topic (or topic prefix for ranges)", "chatroom_message"),
            ("TOPIC_RANGE", "Spread workers over topics 1..=N", "100"),
            ("EVENT_PORT", "Gateway connection endpoint port", "4000"),
            ("HEALTH_PORT", "Gateway health endpoint port", "4010"),
            ("HEARTBEAT_PORT", "Local liveness endpoint port", "9999"),
            ("POLL_INTERVAL", "Delay between readiness polls", "250ms"),
            ("LOG_FORMAT", "Log output format", "console | json | compact"),
        ]
    }

    /// Display environment variable help
    pub fn display_env_help() -> String {
        let mut help = String::new();
        help.push_str("Supported Environment Variables:\n\n");

        for (var, description, example) in Self::get_supported_env_vars() {
            help.push_str(&format!("  {:<16} {}\n", var, description));
            help.push_str(&format!("  {:<16} Example: {}\n\n", "", example));
        }

        help.push_str("Configuration Priority (highest to lowest):\n");
        help.push_str("  1. Command-line arguments\n");
        help.push_str("  2. Environment variables\n");
        help.push_str("  3. .env file values\n");
        help.push_str("  4. Scenario preset and built-in defaults\n\n");

        help.push_str("Example .env file:\n\n");
        help.push_str(&Self::create_example_env_content());

        help
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_example_content_lists_required_vars() {
        let content = EnvManager::create_example_env_content();
        assert!(content.contains("RIG_HOST="));
        assert!(content.contains("CLIENTS="));
        assert!(content.contains("TIMEOUT="));
    }

    #[test]
    fn test_supported_vars_cover_required_settings() {
        let vars = EnvManager::get_supported_env_vars();
        for required in ["RIG_HOST", "CLIENTS", "TIMEOUT"] {
            assert!(vars.iter().any(|(name, _, _)| *name == required));
        }
    }

    #[test]
    fn test_display_env_help() {
        let help = EnvManager::display_env_help();
        assert!(help.contains("Supported Environment Variables:"));
        assert!(help.contains("TOPIC_RANGE"));
        assert!(help.contains("Configuration Priority"));
        assert!(help.contains("Example .env file:"));
        assert!(help.contains("TIMEOUT=5m"));
    }

    #[test]
    fn test_missing_env_file_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let loaded = EnvManager::load_env_file_from(&dir.path().join(".env")).unwrap();
        assert!(!loaded);
    }

    #[test]
    fn test_env_file_is_loaded() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "RLT_ENV_FILE_TEST_VALUE=from-file\n").unwrap();

        assert!(EnvManager::load_env_file_from(&path).unwrap());
        assert_eq!(std::env::var("RLT_ENV_FILE_TEST_VALUE").unwrap(), "from-file");
    }
}
