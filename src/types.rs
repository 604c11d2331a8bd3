//! Type definitions and aliases

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// Re-export commonly used types
pub use crate::error::{AppError, Result};

/// Event transports supported by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transport {
    /// Long-lived HTTP Server-Sent-Events subscription
    Sse,
    /// WebSocket subscription with JSON text frames
    WebSocket,
}

impl Transport {
    /// Path of the connection endpoint for this transport
    pub fn connection_path(&self) -> &'static str {
        match self {
            Transport::Sse => "/_rig/v1/connection/sse",
            Transport::WebSocket => "/_rig/v1/connection/ws",
        }
    }

    /// URL scheme used to reach the endpoint
    pub fn scheme(&self) -> &'static str {
        match self {
            Transport::Sse => "http",
            Transport::WebSocket => "ws",
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Sse => write!(f, "sse"),
            Transport::WebSocket => write!(f, "ws"),
        }
    }
}

impl FromStr for Transport {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sse" | "http" => Ok(Transport::Sse),
            "ws" | "websocket" => Ok(Transport::WebSocket),
            other => Err(AppError::config(format!(
                "Invalid transport '{}': expected 'sse' or 'ws'",
                other
            ))),
        }
    }
}

/// Outcome of waiting for the worker pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompletionState {
    /// Every launched worker reported before the deadline
    Finished,
    /// The deadline elapsed first
    TimedOut,
}

impl CompletionState {
    pub fn timed_out(&self) -> bool {
        matches!(self, CompletionState::TimedOut)
    }

    /// Final status line printed at the end of a run
    pub fn status_line(&self) -> &'static str {
        match self {
            CompletionState::Finished => "All workers finished",
            CompletionState::TimedOut => "Timed out waiting for workers",
        }
    }
}

/// Per-worker outcome classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkerStatus {
    /// Target count reached, elapsed time recorded
    Completed,
    /// Event stream closed early
    Exhausted,
    /// Stopped after the run timed out
    Cancelled,
    /// Subscription or transport failure
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_parsing() {
        assert_eq!("sse".parse::<Transport>().unwrap(), Transport::Sse);
        assert_eq!("WS".parse::<Transport>().unwrap(), Transport::WebSocket);
        assert_eq!("websocket".parse::<Transport>().unwrap(), Transport::WebSocket);
        assert!("grpc".parse::<Transport>().is_err());
    }

    #[test]
    fn test_transport_endpoints() {
        assert_eq!(Transport::Sse.connection_path(), "/_rig/v1/connection/sse");
        assert_eq!(Transport::WebSocket.connection_path(), "/_rig/v1/connection/ws");
        assert_eq!(Transport::WebSocket.scheme(), "ws");
        assert_eq!(Transport::Sse.to_string(), "sse");
    }

    #[test]
    fn test_completion_state_lines() {
        assert!(!CompletionState::Finished.timed_out());
        assert!(CompletionState::TimedOut.timed_out());
        assert_ne!(
            CompletionState::Finished.status_line(),
            CompletionState::TimedOut.status_line()
        );
    }
}
