//! WebSocket transport

use super::{Event, EventSource, Subscription};
use crate::{
    error::{AppError, Result},
    models::config::subscription_url,
    types::Transport,
};
use async_trait::async_trait;
use futures::StreamExt;
use serde::Deserialize;
use tokio_tungstenite::{connect_async, tungstenite::Message};

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    event_type: Option<String>,
}

/// WebSocket subscriptions against `/_rig/v1/connection/ws`.
///
/// Each text frame is a JSON event whose `type` field carries the label.
pub struct WsSource {
    host: String,
    port: u16,
}

impl WsSource {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            host: host.to_string(),
            port,
        }
    }
}

/// Decode one text frame; frames that are not typed JSON events yield `None`
pub fn decode_text_frame(text: &str) -> Option<Event> {
    let envelope: Envelope = serde_json::from_str(text).ok()?;
    envelope
        .event_type
        .map(|label| Event::new(label).with_data(text))
}

#[async_trait]
impl EventSource for WsSource {
    async fn subscribe(&self, topic: &str) -> Result<Subscription> {
        let url = subscription_url(Transport::WebSocket, &self.host, self.port, topic)?;
        let (socket, _response) = connect_async(url.as_str())
            .await
            .map_err(|e| AppError::websocket(format!("Subscription to '{}' failed: {}", topic, e)))?;

        let events = socket
            .scan((), |_, message| {
                let item = match message {
                    Ok(Message::Close(_)) => None,
                    Ok(Message::Text(text)) => Some(decode_text_frame(&text).map(Ok)),
                    Ok(_) => Some(None),
                    Err(error) => Some(Some(Err(AppError::from(error)))),
                };
                futures::future::ready(item)
            })
            .filter_map(futures::future::ready)
            .boxed();

        Ok(Subscription::new(topic.to_string(), events))
    }

    fn name(&self) -> &'static str {
        "ws"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_typed_frame() {
        let frame = r#"{"type":"chatroom_message","data":{"text":"hi"}}"#;
        let event = decode_text_frame(frame).unwrap();
        assert_eq!(event.label, "chatroom_message");
        assert_eq!(event.data.as_deref(), Some(frame));
    }

    #[test]
    fn test_untyped_or_invalid_frames_are_ignored() {
        assert!(decode_text_frame(r#"{"data":1}"#).is_none());
        assert!(decode_text_frame("not json").is_none());
        assert!(decode_text_frame("[1,2,3]").is_none());
    }

    #[tokio::test]
    async fn test_unreachable_gateway_fails_subscribe() {
        let source = WsSource::new("127.0.0.1", 1);
        let error = source.subscribe("t").await.unwrap_err();
        assert!(matches!(error, AppError::WebSocket(_)));
    }
}
