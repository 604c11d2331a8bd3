//! In-process event source that replays a fixed script.
//!
//! Used by the test suite and benches to drive probes and the worker pool
//! deterministically, without a gateway.

use super::{Event, EventSource, Subscription};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// One scripted event, delivered `offset` after the subscription went live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedEvent {
    pub offset: Duration,
    pub label: String,
}

impl ScriptedEvent {
    pub fn at<S: Into<String>>(offset: Duration, label: S) -> Self {
        Self {
            offset,
            label: label.into(),
        }
    }

    /// `count` events labelled `label`, `interval` apart, the first at zero
    pub fn series(label: &str, count: usize, interval: Duration) -> Vec<Self> {
        (0..count)
            .map(|i| Self::at(interval * i as u32, label))
            .collect()
    }
}

pub struct ScriptedSource {
    script: Vec<ScriptedEvent>,
    hold_open: bool,
    subscribe_delay: Duration,
    failing_topics: HashSet<String>,
    attempts: AtomicUsize,
    subscribed: Mutex<Vec<String>>,
}

impl ScriptedSource {
    /// Every subscription replays `script`, then the connection closes
    pub fn new(script: Vec<ScriptedEvent>) -> Self {
        Self {
            script,
            hold_open: false,
            subscribe_delay: Duration::ZERO,
            failing_topics: HashSet::new(),
            attempts: AtomicUsize::new(0),
            subscribed: Mutex::new(Vec::new()),
        }
    }

    /// Keep the connection open after the script ends instead of closing it
    pub fn hold_open(mut self) -> Self {
        self.hold_open = true;
        self
    }

    /// Delay before each subscription goes live
    pub fn with_subscribe_delay(mut self, delay: Duration) -> Self {
        self.subscribe_delay = delay;
        self
    }

    /// Reject subscriptions to `topic`
    pub fn fail_topic<S: Into<String>>(mut self, topic: S) -> Self {
        self.failing_topics.insert(topic.into());
        self
    }

    /// Number of subscribe calls, successful or not
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Topics of the successful subscriptions, in the order they went live
    pub async fn subscribed_topics(&self) -> Vec<String> {
        self.subscribed.lock().await.clone()
    }
}

#[async_trait]
impl EventSource for ScriptedSource {
    async fn subscribe(&self, topic: &str) -> Result<Subscription> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        if !self.subscribe_delay.is_zero() {
            tokio::time::sleep(self.subscribe_delay).await;
        }

        if self.failing_topics.contains(topic) {
            return Err(AppError::http_request(format!(
                "Subscription to '{}' was rejected",
                topic
            )));
        }

        self.subscribed.lock().await.push(topic.to_string());

        let start = Instant::now();
        let replay = stream::iter(self.script.clone()).then(move |event| async move {
            tokio::time::sleep_until(start + event.offset).await;
            Ok(Event::new(event.label))
        });

        let events = if self.hold_open {
            replay.chain(stream::pending()).boxed()
        } else {
            replay.boxed()
        };

        Ok(Subscription::new(topic.to_string(), events))
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_replays_script_at_offsets() {
        let source = ScriptedSource::new(vec![
            ScriptedEvent::at(Duration::ZERO, "a"),
            ScriptedEvent::at(Duration::from_millis(10), "b"),
        ]);

        let start = Instant::now();
        let mut subscription = source.subscribe("a").await.unwrap();

        assert_eq!(subscription.next_event().await.unwrap().unwrap().label, "a");
        assert_eq!(subscription.next_event().await.unwrap().unwrap().label, "b");
        assert_eq!(start.elapsed(), Duration::from_millis(10));
        assert!(subscription.next_event().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_hold_open_never_closes() {
        let source = ScriptedSource::new(vec![]).hold_open();
        let mut subscription = source.subscribe("a").await.unwrap();

        let next = tokio::time::timeout(Duration::from_secs(60), subscription.next_event()).await;
        assert!(next.is_err());
    }

    #[tokio::test]
    async fn test_failing_topic_and_bookkeeping() {
        let source = ScriptedSource::new(vec![]).fail_topic("bad");

        assert!(source.subscribe("bad").await.is_err());
        assert!(source.subscribe("good").await.is_ok());

        assert_eq!(source.attempts(), 2);
        assert_eq!(source.subscribed_topics().await, vec!["good".to_string()]);
    }

    #[test]
    fn test_series() {
        let series = ScriptedEvent::series("x", 3, Duration::from_millis(5));
        assert_eq!(series[2], ScriptedEvent::at(Duration::from_millis(10), "x"));
    }
}
