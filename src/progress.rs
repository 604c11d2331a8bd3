//! Non-blocking progress reporting from probes.
//!
//! Probes push observations with `try_send` and never wait on the terminal;
//! when the channel is full the observation is dropped and counted. A single
//! printer task owns stdout for progress lines.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub const DEFAULT_PROGRESS_CAPACITY: usize = 1024;

/// A probe reached a multiple of its print interval
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressObservation {
    pub count: u64,
    pub worker: usize,
    pub topic: String,
}

impl fmt::Display for ProgressObservation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Count: {}\t| Worker: {}\t| Topic: {}", self.count, self.worker, self.topic)
    }
}

#[derive(Debug, Clone)]
pub struct ProgressSink {
    sender: Option<mpsc::Sender<ProgressObservation>>,
    dropped: Arc<AtomicU64>,
}

impl ProgressSink {
    /// Bounded sink plus the receiving end for a printer
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<ProgressObservation>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (
            Self {
                sender: Some(sender),
                dropped: Arc::new(AtomicU64::new(0)),
            },
            receiver,
        )
    }

    /// Sink that discards every observation
    pub fn disabled() -> Self {
        Self {
            sender: None,
            dropped: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Offer an observation without waiting; returns false if it was dropped
    pub fn report(&self, count: u64, worker: usize, topic: &str) -> bool {
        let Some(sender) = &self.sender else {
            return false;
        };

        let observation = ProgressObservation {
            count,
            worker,
            topic: topic.to_string(),
        };

        match sender.try_send(observation) {
            Ok(()) => true,
            Err(_) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    /// Observations lost because the printer fell behind
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Print every observation until all sinks are gone; returns how many were printed
pub fn spawn_printer(mut receiver: mpsc::Receiver<ProgressObservation>) -> JoinHandle<u64> {
    tokio::spawn(async move {
        let mut printed = 0;
        while let Some(observation) = receiver.recv().await {
            println!("{}", observation);
            printed += 1;
        }
        printed
    })
}
