//! Encoder admission control.
//!
//! Each composition holds one permit for its whole lifetime (fetch, encode,
//! upload). Requests beyond the configured capacity wait up to the queue
//! timeout and are then rejected with [`AppError::EncoderBusy`].

use std::sync::Arc;
use std::time::Duration;
use stillcast_core::AppError;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

#[derive(Debug, Clone)]
pub struct EncoderSlots {
    semaphore: Arc<Semaphore>,
    capacity: usize,
    queue_timeout: Duration,
}

impl EncoderSlots {
    /// `capacity` is clamped to at least one slot.
    pub fn new(capacity: usize, queue_timeout: Duration) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
            queue_timeout,
        }
    }

    /// Wait for a free slot. The slot is released when the permit drops.
    pub async fn acquire(&self) -> Result<OwnedSemaphorePermit, AppError> {
        let acquire = self.semaphore.clone().acquire_owned();
        match tokio::time::timeout(self.queue_timeout, acquire).await {
            Ok(Ok(permit)) => Ok(permit),
            Ok(Err(_closed)) => Err(AppError::Internal(
                "Encoder admission semaphore closed".to_string(),
            )),
            Err(_elapsed) => {
                tracing::warn!(
                    capacity = self.capacity,
                    waited_secs = self.queue_timeout.as_secs(),
                    "Rejecting composition, all encoder slots busy"
                );
                Err(AppError::EncoderBusy {
                    waited_secs: self.queue_timeout.as_secs(),
                })
            }
        }
    }

    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
