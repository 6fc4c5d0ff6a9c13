use crate::dispatch::AgentDispatcher;
use maestro_core::{
    MaestroError, MaestroResult, ResponseMessage, TaskMessage, RESPONSE_QUEUE, TASK_QUEUE,
};
use maestro_discovery::AgentRegistry;
use maestro_queue::{Envelope, QueueTransport};
use maestro_routing::select_agent;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Tuning for the queue-consumption loop.
#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    /// Maximum messages pulled per receive.
    pub batch_size: usize,
    /// How long one receive waits for pending messages.
    pub max_wait: Duration,
    /// Pause between batches (rate control).
    pub batch_pause: Duration,
    /// Backoff after a transport-wide receive failure.
    pub error_backoff: Duration,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            max_wait: Duration::from_secs(5),
            batch_pause: Duration::from_secs(1),
            error_backoff: Duration::from_secs(5),
        }
    }
}

/// Background loop turning queued task messages into agent calls and
/// published responses.
///
/// Every received message reaches exactly one terminal state: completed
/// (with a response published) or dead-lettered with a reason code. A
/// failure in one message never aborts the batch, and a transport-wide
/// receive failure backs off instead of spinning. The loop observes its
/// cancellation token between batches and between messages; a message
/// mid-processing at cancellation time still finishes its terminal step.
pub struct QueueProcessor {
    registry: Arc<AgentRegistry>,
    dispatcher: AgentDispatcher,
    transport: Arc<dyn QueueTransport>,
    config: ProcessorConfig,
}

impl QueueProcessor {
    pub fn new(
        registry: Arc<AgentRegistry>,
        dispatcher: AgentDispatcher,
        transport: Arc<dyn QueueTransport>,
        config: ProcessorConfig,
    ) -> Self {
        Self {
            registry,
            dispatcher,
            transport,
            config,
        }
    }

    /// Run until the token is cancelled.
    pub async fn run(self, token: CancellationToken) {
        info!("Queue processor started");

        loop {
            let received = tokio::select! {
                _ = token.cancelled() => break,
                r = self.transport.receive_batch(
                    TASK_QUEUE,
                    self.config.batch_size,
                    self.config.max_wait,
                ) => r,
            };

            match received {
                Ok(batch) => {
                    for envelope in batch {
                        // Finish the in-flight message's terminal step even
                        // when cancellation arrives mid-batch; stop before
                        // starting the next one.
                        self.process_message(envelope).await;
                        if token.is_cancelled() {
                            info!("Queue processor cancelled mid-batch, draining stopped");
                            return;
                        }
                    }

                    tokio::select! {
                        _ = token.cancelled() => break,
                        _ = tokio::time::sleep(self.config.batch_pause) => {}
                    }
                }
                Err(e) => {
                    error!(error = %e, "Queue receive failed, backing off");
                    tokio::select! {
                        _ = token.cancelled() => break,
                        _ = tokio::time::sleep(self.config.error_backoff) => {}
                    }
                }
            }
        }

        info!("Queue processor stopped");
    }

    /// Drive one message to its terminal state. Never propagates.
    async fn process_message(&self, envelope: Envelope) {
        let message_id = envelope.message_id;

        match self.handle(&envelope).await {
            Ok(agent_used) => {
                if let Err(e) = self.transport.complete(TASK_QUEUE, message_id).await {
                    error!(message_id = %message_id, error = %e, "Failed to complete processed message");
                } else {
                    info!(message_id = %message_id, agent = %agent_used, "Task completed and response queued");
                }
            }
            Err(e) => {
                warn!(message_id = %message_id, error = %e, "Task processing failed, dead-lettering");
                if let Err(dl_err) = self
                    .transport
                    .dead_letter(TASK_QUEUE, message_id, e.kind(), &e.to_string())
                    .await
                {
                    error!(message_id = %message_id, error = %dl_err, "Failed to dead-letter message");
                }
            }
        }
    }

    /// Parse, route, dispatch, and publish for a single message.
    async fn handle(&self, envelope: &Envelope) -> MaestroResult<String> {
        let msg: TaskMessage = serde_json::from_str(&envelope.payload)
            .map_err(|e| MaestroError::MalformedPayload(e.to_string()))?;

        info!(user_id = %msg.user_id, task = %msg.task, "Processing queued task");

        let snapshot = self.registry.snapshot().await;
        if snapshot.is_empty() {
            return Err(MaestroError::NoAgentsAvailable);
        }

        let selected = select_agent(&msg.task, msg.preferred_agent.as_deref(), &snapshot)
            .ok_or(MaestroError::NoSuitableAgent)?
            .to_string();

        let result = self
            .dispatcher
            .call_agent(&self.registry, &selected, &msg.task, &msg.user_id)
            .await?;

        let response = ResponseMessage {
            user_id: msg.user_id,
            agent_used: selected.clone(),
            result,
            original_task: msg.task,
        };
        self.transport
            .send(RESPONSE_QUEUE, serde_json::to_string(&response)?)
            .await?;

        Ok(selected)
    }
}
