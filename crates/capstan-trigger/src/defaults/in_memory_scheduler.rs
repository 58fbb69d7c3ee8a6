//! In-memory scheduler backed by a bounded tokio mpsc channel.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::errors::SchedError;
use crate::traits::Scheduler;
use crate::types::Stage;

/// In-memory implementation of [`Scheduler`].
///
/// Enqueued stages are delivered to the receiver returned by
/// [`new`](InMemoryScheduler::new) in enqueue order. Worker loops (or
/// tests) consume the receiver; if it is dropped, scheduling fails — the
/// triggerer treats that as fatal, matching a real queue outage.
pub struct InMemoryScheduler {
    tx: mpsc::Sender<Stage>,
}

impl InMemoryScheduler {
    /// Create a scheduler and the receiving end of its queue.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Stage>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

#[async_trait]
impl Scheduler for InMemoryScheduler {
    async fn schedule(&self, stage: &Stage) -> Result<(), SchedError> {
        self.tx
            .send(stage.clone())
            .await
            .map_err(|_| SchedError::Queue {
                message: "stage queue receiver dropped".to_string(),
            })
    }
}
