//! Dispatch queue between admission and the worker pool.
//!
//! A bounded tokio channel of job identifiers. Every worker shares the one
//! receiver; whichever idle worker holds the receiver lock takes the next id.

use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

use crate::core::types::JobId;
use crate::storage::StorageError;

/// Default buffer size of the dispatch queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1000;

/// Largest buffer a tokio bounded channel accepts.
pub const MAX_QUEUE_CAPACITY: usize = tokio::sync::Semaphore::MAX_PERMITS;

/// Sending side of the dispatch queue, plus a shareable receiver.
pub(crate) struct DispatchQueue {
    tx: mpsc::Sender<JobId>,
    rx: DispatchReceiver,
}

impl DispatchQueue {
    /// Create a queue buffering up to `capacity` identifiers.
    pub(crate) fn new(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity.clamp(1, MAX_QUEUE_CAPACITY));
        Self {
            tx,
            rx: DispatchReceiver(Arc::new(Mutex::new(rx))),
        }
    }

    /// Enqueue without waiting.
    ///
    /// Called while the store write lock is held, so it must never block.
    pub(crate) fn enqueue(&self, id: JobId) -> Result<(), StorageError> {
        self.tx.try_send(id).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => {
                StorageError::QueueUnavailable("dispatch queue is full".to_string())
            }
            mpsc::error::TrySendError::Closed(_) => {
                StorageError::QueueUnavailable("dispatch queue is closed".to_string())
            }
        })
    }

    /// A handle workers use to pull identifiers.
    pub(crate) fn receiver(&self) -> DispatchReceiver {
        self.rx.clone()
    }

    /// Identifiers waiting to be picked up.
    pub(crate) fn len(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.tx.max_capacity()
    }
}

/// Shared receiving side of the dispatch queue.
#[derive(Clone)]
pub(crate) struct DispatchReceiver(Arc<Mutex<mpsc::Receiver<JobId>>>);

impl DispatchReceiver {
    /// Wait for the next identifier. Cancel-safe: dropping the future loses nothing.
    pub(crate) async fn recv(&self) -> Option<JobId> {
        self.0.lock().await.recv().await
    }
}
