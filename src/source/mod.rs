//! Event sources: the streaming connections probes subscribe through
//!
//! Every transport presents the same contract: `subscribe(topic)` resolves
//! once the subscription is live and yields a lazy, unbounded stream of
//! labelled events that ends when the connection closes.

pub mod scripted;
pub mod sse;
pub mod ws;

pub use scripted::{ScriptedEvent, ScriptedSource};
pub use sse::{SseDecoder, SseSource};
pub use ws::WsSource;

use crate::{
    error::Result,
    models::Config,
    types::Transport,
};
use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use std::sync::Arc;

/// One event delivered by the gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Event type the gateway published the event under
    pub label: String,
    /// Raw payload, if the transport carried one
    pub data: Option<String>,
}

impl Event {
    pub fn new<S: Into<String>>(label: S) -> Self {
        Self {
            label: label.into(),
            data: None,
        }
    }

    pub fn with_data<S: Into<String>>(mut self, data: S) -> Self {
        self.data = Some(data.into());
        self
    }
}

/// A live subscription owned by exactly one probe
pub struct Subscription {
    topic: String,
    events: BoxStream<'static, Result<Event>>,
}

impl Subscription {
    pub fn new(topic: String, events: BoxStream<'static, Result<Event>>) -> Self {
        Self { topic, events }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Next event, or `None` once the connection has closed
    pub async fn next_event(&mut self) -> Option<Result<Event>> {
        self.events.next().await
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("topic", &self.topic).finish()
    }
}

/// Streaming connection to the gateway
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Open a subscription filtered to `topic`; resolves once it is live
    async fn subscribe(&self, topic: &str) -> Result<Subscription>;

    /// Short transport name for logs and reports
    fn name(&self) -> &'static str;
}

/// Factory for the configured transport
pub struct EventSourceFactory;

impl EventSourceFactory {
    /// Create the event source selected by the configuration
    pub fn create(config: &Config) -> Result<Arc<dyn EventSource>> {
        match config.transport {
            Transport::Sse => Ok(Arc::new(SseSource::new(&config.host, config.event_port)?)),
            Transport::WebSocket => Ok(Arc::new(WsSource::new(&config.host, config.event_port))),
        }
    }
}
