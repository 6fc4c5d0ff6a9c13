use maestro_core::{MaestroResult, ResponseMessage, ResponseRecord, RESPONSE_QUEUE};
use maestro_queue::QueueTransport;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
use uuid::Uuid;

const READ_BATCH_SIZE: usize = 10;
const DEFAULT_READ_WAIT: Duration = Duration::from_secs(1);

/// Reads published responses, filtered by requester identity.
///
/// Matched messages are consumed; messages belonging to other users (or
/// that fail to parse) are abandoned back to the queue — reading is
/// non-destructive for results that are not the caller's.
pub struct ResponseReader {
    transport: Arc<dyn QueueTransport>,
    max_wait: Duration,
}

impl ResponseReader {
    pub fn new(transport: Arc<dyn QueueTransport>) -> Self {
        Self {
            transport,
            max_wait: DEFAULT_READ_WAIT,
        }
    }

    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }

    /// Collect up to `max_count` responses matching `user_filter`
    /// (`"all"` matches everything).
    ///
    /// A transport failure after some records were already collected
    /// returns those records rather than discarding them.
    pub async fn fetch(&self, user_filter: &str, max_count: usize) -> MaestroResult<Vec<ResponseRecord>> {
        let mut records = Vec::new();
        // Ids this call has already seen: once an abandoned message comes
        // back around, the queue holds nothing new for us.
        let mut inspected: HashSet<Uuid> = HashSet::new();

        'drain: while records.len() < max_count {
            let batch = match self
                .transport
                .receive_batch(RESPONSE_QUEUE, READ_BATCH_SIZE, self.max_wait)
                .await
            {
                Ok(batch) => batch,
                Err(e) if records.is_empty() => return Err(e),
                Err(e) => {
                    warn!(error = %e, collected = records.len(), "Response read failed mid-fetch, returning partial result");
                    break;
                }
            };

            if batch.is_empty() {
                break;
            }

            let mut stop = false;
            for envelope in batch {
                if stop || !inspected.insert(envelope.message_id) {
                    // Redelivery of a message we abandoned, or we are
                    // already done: put it back untouched.
                    if let Err(e) = self.transport.abandon(RESPONSE_QUEUE, envelope.message_id).await {
                        warn!(message_id = %envelope.message_id, error = %e, "Failed to abandon message");
                    }
                    stop = true;
                    continue;
                }

                let parsed: Option<ResponseMessage> = serde_json::from_str(&envelope.payload).ok();
                let matches = parsed
                    .as_ref()
                    .is_some_and(|m| user_filter == "all" || m.user_id == user_filter);

                if let (true, Some(msg)) = (matches, parsed) {
                    match self.transport.complete(RESPONSE_QUEUE, envelope.message_id).await {
                        Ok(()) => {
                            records.push(ResponseRecord {
                                user_id: msg.user_id,
                                agent_used: msg.agent_used,
                                response: msg.result,
                                original_task: msg.original_task,
                                enqueued_at: envelope.enqueued_at,
                                message_id: envelope.message_id,
                            });
                            if records.len() >= max_count {
                                stop = true;
                            }
                        }
                        Err(e) if records.is_empty() => return Err(e),
                        Err(e) => {
                            warn!(error = %e, "Failed to consume matched response, returning partial result");
                            stop = true;
                        }
                    }
                } else {
                    // Not ours (or unparseable): non-destructive return.
                    if let Err(e) = self.transport.abandon(RESPONSE_QUEUE, envelope.message_id).await {
                        warn!(message_id = %envelope.message_id, error = %e, "Failed to abandon message");
                    }
                }
            }

            if stop {
                break 'drain;
            }
        }

        Ok(records)
    }
}
