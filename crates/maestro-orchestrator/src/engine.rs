use crate::dispatch::AgentDispatcher;
use crate::processor::{ProcessorConfig, QueueProcessor};
use crate::reader::ResponseReader;
use maestro_core::{
    AgentDescriptor, MaestroError, MaestroResult, ResponseRecord, TaskMessage, TASK_QUEUE,
};
use maestro_discovery::{AgentRegistry, DiscoveryClient};
use maestro_queue::QueueTransport;
use maestro_routing::select_agent;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use uuid::Uuid;

/// Result of a synchronous task execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskOutcome {
    pub result: String,
    pub agent_used: String,
}

/// The orchestration facade consumed by the API layer.
///
/// Owns the registry and its collaborators; all operations here are the
/// protocol-agnostic contract — the gateway adds HTTP on top.
pub struct Orchestrator {
    registry: Arc<AgentRegistry>,
    discovery: DiscoveryClient,
    dispatcher: AgentDispatcher,
    endpoints: Vec<String>,
    transport: Option<Arc<dyn QueueTransport>>,
    processor_config: ProcessorConfig,
}

impl Orchestrator {
    pub fn new(endpoints: Vec<String>) -> Self {
        Self {
            registry: Arc::new(AgentRegistry::new()),
            discovery: DiscoveryClient::new(),
            dispatcher: AgentDispatcher::new(),
            endpoints,
            transport: None,
            processor_config: ProcessorConfig::default(),
        }
    }

    /// Attach a queue transport, enabling the async path.
    pub fn with_transport(mut self, transport: Arc<dyn QueueTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn with_discovery(mut self, discovery: DiscoveryClient) -> Self {
        self.discovery = discovery;
        self
    }

    pub fn with_dispatcher(mut self, dispatcher: AgentDispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub fn with_processor_config(mut self, config: ProcessorConfig) -> Self {
        self.processor_config = config;
        self
    }

    pub fn registry(&self) -> &Arc<AgentRegistry> {
        &self.registry
    }

    /// Whether the async path is available.
    pub fn queue_available(&self) -> bool {
        self.transport.is_some()
    }

    /// Run a discovery pass over the configured endpoints. Returns the
    /// registry size after the pass.
    pub async fn discover(&self) -> usize {
        self.discovery
            .discover_all(&self.registry, &self.endpoints)
            .await;
        self.registry.len().await
    }

    pub async fn list_agents(&self) -> Vec<AgentDescriptor> {
        self.registry.snapshot().await
    }

    /// Route and dispatch a task, waiting for the agent's result.
    pub async fn execute_sync(
        &self,
        task: &str,
        user_id: &str,
        preferred_agent: Option<&str>,
    ) -> MaestroResult<TaskOutcome> {
        let snapshot = self.registry.snapshot().await;
        if snapshot.is_empty() {
            return Err(MaestroError::NoAgentsAvailable);
        }

        let selected = select_agent(task, preferred_agent, &snapshot)
            .ok_or(MaestroError::NoSuitableAgent)?
            .to_string();

        info!(user_id = %user_id, agent = %selected, "Executing task synchronously");

        let result = self
            .dispatcher
            .call_agent(&self.registry, &selected, task, user_id)
            .await?;

        Ok(TaskOutcome {
            result,
            agent_used: selected,
        })
    }

    /// Enqueue a task for background processing. Returns the queued
    /// message id.
    pub async fn execute_async(
        &self,
        task: &str,
        user_id: &str,
        preferred_agent: Option<&str>,
    ) -> MaestroResult<Uuid> {
        let transport = self.transport.as_ref().ok_or(MaestroError::QueueUnavailable)?;

        let message = TaskMessage {
            task: task.to_string(),
            user_id: user_id.to_string(),
            preferred_agent: preferred_agent.map(str::to_string),
        };
        let message_id = transport
            .send(TASK_QUEUE, serde_json::to_string(&message)?)
            .await?;

        info!(user_id = %user_id, message_id = %message_id, "Task queued for async processing");
        Ok(message_id)
    }

    /// Poll the response queue for this requester's results.
    pub async fn fetch_responses(
        &self,
        user_filter: &str,
        max_count: usize,
    ) -> MaestroResult<Vec<ResponseRecord>> {
        let transport = self.transport.as_ref().ok_or(MaestroError::QueueUnavailable)?;
        ResponseReader::new(transport.clone())
            .fetch(user_filter, max_count)
            .await
    }

    /// Spawn the background queue processor, supervised by `token`.
    pub fn spawn_processor(
        &self,
        token: CancellationToken,
    ) -> MaestroResult<tokio::task::JoinHandle<()>> {
        let transport = self.transport.as_ref().ok_or(MaestroError::QueueUnavailable)?;
        let processor = QueueProcessor::new(
            self.registry.clone(),
            self.dispatcher.clone(),
            transport.clone(),
            self.processor_config.clone(),
        );
        Ok(tokio::spawn(processor.run(token)))
    }
}
