use crate::transport::{DeadLetteredMessage, Envelope, QueueTransport};
use async_trait::async_trait;
use chrono::Utc;
use maestro_core::{MaestroError, MaestroResult};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

#[derive(Default)]
struct QueueState {
    pending: VecDeque<Envelope>,
    inflight: HashMap<Uuid, Envelope>,
    dead: Vec<DeadLetteredMessage>,
}

/// In-process broker implementing the at-least-once queue primitives.
///
/// Backs local runs and tests; a received message sits in an in-flight map
/// until completed, dead-lettered, or abandoned, so crash-free redelivery
/// semantics mirror a real broker's peek-lock mode.
pub struct InMemoryBroker {
    queues: Mutex<HashMap<String, QueueState>>,
    notify: Notify,
}

impl InMemoryBroker {
    pub fn new() -> Self {
        Self {
            queues: Mutex::new(HashMap::new()),
            notify: Notify::new(),
        }
    }

    fn with_queue<T>(&self, queue: &str, f: impl FnOnce(&mut QueueState) -> T) -> MaestroResult<T> {
        let mut queues = self
            .queues
            .lock()
            .map_err(|_| MaestroError::QueueTransport("broker lock poisoned".to_string()))?;
        Ok(f(queues.entry(queue.to_string()).or_default()))
    }

    /// Number of messages waiting to be received.
    pub fn pending_len(&self, queue: &str) -> usize {
        self.with_queue(queue, |q| q.pending.len()).unwrap_or(0)
    }

    /// Snapshot of the dead-letter store for a queue.
    pub fn dead_letters(&self, queue: &str) -> Vec<DeadLetteredMessage> {
        self.with_queue(queue, |q| q.dead.clone()).unwrap_or_default()
    }

    fn take_inflight(&self, queue: &str, message_id: Uuid) -> MaestroResult<Envelope> {
        self.with_queue(queue, |q| q.inflight.remove(&message_id))?
            .ok_or_else(|| {
                MaestroError::QueueTransport(format!(
                    "message {message_id} is not in flight on queue '{queue}'"
                ))
            })
    }
}

impl Default for InMemoryBroker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QueueTransport for InMemoryBroker {
    async fn send(&self, queue: &str, payload: String) -> MaestroResult<Uuid> {
        let envelope = Envelope {
            message_id: Uuid::new_v4(),
            payload,
            enqueued_at: Utc::now(),
            delivery_count: 0,
        };
        let id = envelope.message_id;
        self.with_queue(queue, |q| q.pending.push_back(envelope))?;
        self.notify.notify_waiters();
        debug!(queue = %queue, message_id = %id, "Message enqueued");
        Ok(id)
    }

    async fn receive_batch(
        &self,
        queue: &str,
        max_count: usize,
        max_wait: Duration,
    ) -> MaestroResult<Vec<Envelope>> {
        let deadline = Instant::now() + max_wait;
        loop {
            let batch = self.with_queue(queue, |q| {
                let mut batch = Vec::new();
                while batch.len() < max_count {
                    let Some(mut envelope) = q.pending.pop_front() else {
                        break;
                    };
                    envelope.delivery_count += 1;
                    q.inflight.insert(envelope.message_id, envelope.clone());
                    batch.push(envelope);
                }
                batch
            })?;

            if !batch.is_empty() {
                return Ok(batch);
            }

            // Register for wakeup before re-checking so a concurrent send
            // between the check and the await is not missed.
            let notified = self.notify.notified();
            if self.with_queue(queue, |q| !q.pending.is_empty())? {
                continue;
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return Ok(Vec::new());
            }
        }
    }

    async fn complete(&self, queue: &str, message_id: Uuid) -> MaestroResult<()> {
        self.take_inflight(queue, message_id)?;
        debug!(queue = %queue, message_id = %message_id, "Message completed");
        Ok(())
    }

    async fn dead_letter(
        &self,
        queue: &str,
        message_id: Uuid,
        reason: &str,
        description: &str,
    ) -> MaestroResult<()> {
        let envelope = self.take_inflight(queue, message_id)?;
        self.with_queue(queue, |q| {
            q.dead.push(DeadLetteredMessage {
                envelope,
                reason: reason.to_string(),
                description: description.to_string(),
                dead_lettered_at: Utc::now(),
            });
        })?;
        debug!(queue = %queue, message_id = %message_id, reason = %reason, "Message dead-lettered");
        Ok(())
    }

    async fn abandon(&self, queue: &str, message_id: Uuid) -> MaestroResult<()> {
        let envelope = self.take_inflight(queue, message_id)?;
        self.with_queue(queue, |q| q.pending.push_front(envelope))?;
        self.notify.notify_waiters();
        debug!(queue = %queue, message_id = %message_id, "Message abandoned");
        Ok(())
    }
}
