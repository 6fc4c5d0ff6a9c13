use async_trait::async_trait;
use chrono::{DateTime, Utc};
use maestro_core::MaestroResult;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// A message as delivered by the broker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub message_id: Uuid,
    /// Serialized payload; the processor and reader decode it themselves.
    pub payload: String,
    pub enqueued_at: DateTime<Utc>,
    /// Number of times this message has been delivered (starts at 1).
    pub delivery_count: u32,
}

/// A message moved to the dead-letter store after unrecoverable failure.
#[derive(Debug, Clone)]
pub struct DeadLetteredMessage {
    pub envelope: Envelope,
    /// Stable reason code (an error kind, not free text).
    pub reason: String,
    pub description: String,
    pub dead_lettered_at: DateTime<Utc>,
}

/// The five queue primitives Maestro requires from a broker.
///
/// Delivery is at-least-once: a received message stays invisible to other
/// receivers until it is completed, dead-lettered, or abandoned.
#[async_trait]
pub trait QueueTransport: Send + Sync {
    /// Fire-and-forget enqueue. Returns the broker-assigned message id.
    async fn send(&self, queue: &str, payload: String) -> MaestroResult<Uuid>;

    /// Receive up to `max_count` pending messages, waiting at most
    /// `max_wait` for the first one. An empty vec means the wait expired.
    async fn receive_batch(
        &self,
        queue: &str,
        max_count: usize,
        max_wait: Duration,
    ) -> MaestroResult<Vec<Envelope>>;

    /// Permanently remove a received message after successful processing.
    async fn complete(&self, queue: &str, message_id: Uuid) -> MaestroResult<()>;

    /// Move a received message out of the queue into the dead-letter
    /// store for inspection.
    async fn dead_letter(
        &self,
        queue: &str,
        message_id: Uuid,
        reason: &str,
        description: &str,
    ) -> MaestroResult<()>;

    /// Return a received message to the queue for redelivery.
    async fn abandon(&self, queue: &str, message_id: Uuid) -> MaestroResult<()>;
}
