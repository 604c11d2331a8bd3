//! Completion bookkeeping for launched workers

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// Counts outstanding workers; complete when every token has been released
#[derive(Debug, Clone)]
pub struct CompletionTracker {
    outstanding: Arc<watch::Sender<usize>>,
    registered: Arc<AtomicUsize>,
}

/// Held by one worker for its whole lifetime; released on drop
#[derive(Debug)]
pub struct CompletionToken {
    outstanding: Arc<watch::Sender<usize>>,
}

impl CompletionTracker {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(0);
        Self {
            outstanding: Arc::new(sender),
            registered: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Account for one more worker
    pub fn register(&self) -> CompletionToken {
        self.registered.fetch_add(1, Ordering::SeqCst);
        self.outstanding.send_modify(|n| *n += 1);
        CompletionToken {
            outstanding: Arc::clone(&self.outstanding),
        }
    }

    /// Tokens ever handed out
    pub fn registered(&self) -> usize {
        self.registered.load(Ordering::SeqCst)
    }

    pub fn outstanding(&self) -> usize {
        *self.outstanding.borrow()
    }

    pub fn is_complete(&self) -> bool {
        self.outstanding() == 0
    }

    /// Resolve once no tokens are outstanding
    pub async fn wait(&self) {
        let mut receiver = self.outstanding.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait
        let _ = receiver.wait_for(|n| *n == 0).await;
    }
}

impl Default for CompletionTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CompletionToken {
    fn drop(&mut self) {
        self.outstanding.send_modify(|n| *n = n.saturating_sub(1));
    }
}
