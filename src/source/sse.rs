//! Server-Sent-Events transport

use super::{Event, EventSource, Subscription};
use crate::{
    error::{AppError, Result},
    models::config::subscription_url,
    types::Transport,
};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{header, Client};
use std::time::Duration;

/// Incremental `text/event-stream` decoder.
///
/// Bytes may be fed in arbitrary chunks; complete events are returned as
/// soon as their terminating blank line arrives. Comment lines and the
/// `id`/`retry` fields are ignored, and an event without an `event:` field
/// is labelled `message`.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    event_type: Option<String>,
    data: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of the response body, returning every completed event
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Event> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        let mut start = 0;
        while let Some(offset) = self.buffer[start..].iter().position(|&b| b == b'\n') {
            let end = start + offset;
            let mut raw = &self.buffer[start..end];
            if let [rest @ .., b'\r'] = raw {
                raw = rest;
            }
            let line = String::from_utf8_lossy(raw).into_owned();
            start = end + 1;

            if let Some(event) = self.process_line(&line) {
                events.push(event);
            }
        }
        self.buffer.drain(..start);

        events
    }

    fn process_line(&mut self, line: &str) -> Option<Event> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => self.event_type = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            _ => {}
        }

        None
    }

    fn dispatch(&mut self) -> Option<Event> {
        let event_type = self.event_type.take();
        let data = std::mem::take(&mut self.data);

        if event_type.is_none() && data.is_empty() {
            return None;
        }

        Some(Event {
            label: event_type
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "message".to_string()),
            data: if data.is_empty() { None } else { Some(data.join("\n")) },
        })
    }
}

/// SSE subscriptions against the gateway's `/_rig/v1/connection/sse` endpoint
pub struct SseSource {
    client: Client,
    host: String,
    port: u16,
}

impl SseSource {
    pub fn new(host: &str, port: u16) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .tcp_keepalive(Duration::from_secs(60))
            .build()
            .map_err(|e| AppError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            host: host.to_string(),
            port,
        })
    }
}

#[async_trait]
impl EventSource for SseSource {
    async fn subscribe(&self, topic: &str) -> Result<Subscription> {
        let url = subscription_url(Transport::Sse, &self.host, self.port, topic)?;

        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, "text/event-stream")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::http_request(format!(
                "Subscription to '{}' was rejected with status {}",
                topic, status
            )));
        }

        let events = response
            .bytes_stream()
            .scan(SseDecoder::new(), |decoder, chunk| {
                let batch: Vec<Result<Event>> = match chunk {
                    Ok(bytes) => decoder.feed(&bytes).into_iter().map(Ok).collect(),
                    Err(error) => vec![Err(AppError::from(error))],
                };
                futures::future::ready(Some(batch))
            })
            .flat_map(futures::stream::iter)
            .boxed();

        Ok(Subscription::new(topic.to_string(), events))
    }

    fn name(&self) -> &'static str {
        "sse"
    }
}
