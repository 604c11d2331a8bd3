//! Error handling for the load tester

use thiserror::Error;

/// Custom error types for the load tester
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or malformed startup settings
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network connectivity errors
    #[error("Network error: {0}")]
    Network(String),

    /// HTTP request errors (non-success status, body read failures)
    #[error("HTTP request error: {0}")]
    HttpRequest(String),

    /// WebSocket handshake or framing errors
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Event stream closed before the target count was reached
    #[error("Stream exhausted: worker {worker} on '{topic}' received {received} of {target} events")]
    StreamExhausted {
        worker: usize,
        topic: String,
        received: u64,
        target: u64,
    },

    /// Probe stopped by the run's cancellation token
    #[error("Cancelled: worker {worker} on '{topic}' stopped after {received} events")]
    Cancelled {
        worker: usize,
        topic: String,
        received: u64,
    },

    /// I/O errors (socket binding, stdout)
    #[error("I/O error: {0}")]
    Io(String),

    /// Parsing errors (URLs, JSON, numbers)
    #[error("Parsing error: {0}")]
    Parse(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a new network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network(message.into())
    }

    /// Create a new HTTP request error
    pub fn http_request<S: Into<String>>(message: S) -> Self {
        Self::HttpRequest(message.into())
    }

    /// Create a new WebSocket error
    pub fn websocket<S: Into<String>>(message: S) -> Self {
        Self::WebSocket(message.into())
    }

    /// Create a new stream exhaustion error
    pub fn stream_exhausted<S: Into<String>>(worker: usize, topic: S, received: u64, target: u64) -> Self {
        Self::StreamExhausted {
            worker,
            topic: topic.into(),
            received,
            target,
        }
    }

    /// Create a new cancellation error
    pub fn cancelled<S: Into<String>>(worker: usize, topic: S, received: u64) -> Self {
        Self::Cancelled {
            worker,
            topic: topic.into(),
            received,
        }
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io(message.into())
    }

    /// Create a new parsing error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse(message.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Get error category for logging and reporting
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG",
            Self::Network(_) => "NETWORK",
            Self::HttpRequest(_) => "HTTP",
            Self::WebSocket(_) => "WS",
            Self::StreamExhausted { .. } => "STREAM",
            Self::Cancelled { .. } => "CANCELLED",
            Self::Io(_) => "IO",
            Self::Parse(_) => "PARSE",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Transport-level failures that a polling loop may retry
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Network(_) | Self::HttpRequest(_) | Self::WebSocket(_) => true,
            Self::Config(_) | Self::Parse(_) | Self::Io(_) | Self::Internal(_) => false,
            Self::StreamExhausted { .. } | Self::Cancelled { .. } => false,
        }
    }

    /// Get exit code for this error type
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Parse(_) => 1,
            Self::Network(_) | Self::HttpRequest(_) | Self::WebSocket(_) => 2,
            Self::StreamExhausted { .. } | Self::Cancelled { .. } => 3,
            Self::Io(_) => 5,
            Self::Internal(_) => 99,
        }
    }

    /// Format error for console display with color coding
    pub fn format_for_console(&self, use_color: bool) -> String {
        let category = self.category();
        let message = self.to_string();

        if use_color {
            use colored::Colorize;
            match self {
                Self::Config(_) | Self::Parse(_) => {
                    format!("[{}] {}", category.red().bold(), message.red())
                }
                Self::Network(_) | Self::HttpRequest(_) | Self::WebSocket(_) => {
                    format!("[{}] {}", category.yellow().bold(), message.yellow())
                }
                Self::StreamExhausted { .. } | Self::Cancelled { .. } => {
                    format!("[{}] {}", category.blue().bold(), message.blue())
                }
                Self::Io(_) => {
                    format!("[{}] {}", category.cyan().bold(), message.cyan())
                }
                Self::Internal(_) => {
                    format!("[{}] {}", category.bright_red().bold(), message.bright_red())
                }
            }
        } else {
            format!("[{}] {}", category, message)
        }
    }
}

// Standard library error conversions
impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

impl From<url::ParseError> for AppError {
    fn from(error: url::ParseError) -> Self {
        Self::parse(format!("URL parse error: {}", error))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::parse(format!("JSON parse error: {}", error))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_connect() || error.is_request() || error.is_timeout() {
            Self::network(error.to_string())
        } else {
            Self::http_request(error.to_string())
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for AppError {
    fn from(error: tokio_tungstenite::tungstenite::Error) -> Self {
        use tokio_tungstenite::tungstenite::Error as WsError;
        match error {
            WsError::Io(e) => Self::network(e.to_string()),
            other => Self::websocket(other.to_string()),
        }
    }
}

impl From<dotenv::Error> for AppError {
    fn from(error: dotenv::Error) -> Self {
        Self::config(format!("Environment file error: {}", error))
    }
}

impl From<std::num::ParseIntError> for AppError {
    fn from(error: std::num::ParseIntError) -> Self {
        Self::parse(format!("Integer parse error: {}", error))
    }
}

impl From<clap::Error> for AppError {
    fn from(error: clap::Error) -> Self {
        let rendered = error.to_string();
        let message = rendered.lines().next().unwrap_or_default();
        Self::config(message.trim_start_matches("error: ").trim())
    }
}

/// Custom Result type for the application
pub type Result<T> = std::result::Result<T, AppError>;

/// Error context trait for adding context to errors
pub trait ErrorContext<T> {
    /// Add context to an error
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<AppError>,
{
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let original_error = e.into();
            let context = f();
            match original_error {
                AppError::Io(msg) => AppError::io(format!("{}: {}", context, msg)),
                AppError::Config(msg) => AppError::config(format!("{}: {}", context, msg)),
                other => AppError::internal(format!("{}: {}", context, other)),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        assert_eq!(AppError::config("x").category(), "CONFIG");
        assert_eq!(AppError::websocket("x").category(), "WS");
        assert_eq!(AppError::stream_exhausted(1, "t", 1, 3).category(), "STREAM");
        assert_eq!(AppError::cancelled(1, "t", 0).category(), "CANCELLED");
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(AppError::config("missing").exit_code(), 1);
        assert_eq!(AppError::network("refused").exit_code(), 2);
        assert_eq!(AppError::io("bind").exit_code(), 5);
        assert_eq!(AppError::internal("bug").exit_code(), 99);
    }

    #[test]
    fn test_recoverable_errors() {
        assert!(AppError::network("refused").is_recoverable());
        assert!(AppError::http_request("503").is_recoverable());
        assert!(!AppError::config("missing").is_recoverable());
        assert!(!AppError::stream_exhausted(2, "t", 4, 10).is_recoverable());
    }

    #[test]
    fn test_stream_exhausted_message() {
        let error = AppError::stream_exhausted(7, "chatroom_message", 41, 100);
        let message = error.to_string();
        assert!(message.contains("worker 7"));
        assert!(message.contains("chatroom_message"));
        assert!(message.contains("41 of 100"));
    }

    #[test]
    fn test_format_for_console_plain() {
        let error = AppError::config("RIG_HOST environment variable required");
        assert_eq!(
            error.format_for_console(false),
            "[CONFIG] Configuration error: RIG_HOST environment variable required"
        );
    }

    #[test]
    fn test_error_conversions() {
        let io_error = std::io::Error::new(std::io::ErrorKind::AddrInUse, "address in use");
        assert!(matches!(AppError::from(io_error), AppError::Io(_)));

        let parse_error = "abc".parse::<usize>().unwrap_err();
        assert!(matches!(AppError::from(parse_error), AppError::Parse(_)));

        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(AppError::from(json_error), AppError::Parse(_)));
    }

    #[test]
    fn test_clap_errors_are_config_errors() {
        use clap::Parser;

        let error = crate::cli::Cli::try_parse_from(["rlt", "--clients", "lots"]).unwrap_err();
        let error = AppError::from(error);

        assert!(matches!(error, AppError::Config(_)));
        assert!(error.to_string().contains("lots"));
        assert!(!error.to_string().contains("error: "));
        assert_eq!(error.exit_code(), 1);
    }

    #[test]
    fn test_with_context() {
        let result: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::AddrInUse, "in use"));
        let error = result.with_context(|| "binding heartbeat port 9999".to_string()).unwrap_err();
        assert!(matches!(error, AppError::Io(_)));
        assert!(error.to_string().contains("binding heartbeat port 9999"));
    }
}
