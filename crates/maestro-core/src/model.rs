use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Well-known path suffix where agents publish their card.
pub const WELL_KNOWN_SUFFIX: &str = "/.well-known/agent.json";

/// A named capability advertised by an agent, used for routing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentSkill {
    /// Card-assigned identifier, if any. Not used for routing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Example phrasings from the agent card.
    #[serde(default)]
    pub examples: Vec<String>,
}

/// Canonical record of one discovered agent.
///
/// Built once per discovery pass from the raw agent card; the dual card
/// shapes (A2A `capabilities.skills` vs ADK root-level `skills`) are
/// resolved at discovery time, so downstream code never re-inspects raw
/// documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentDescriptor {
    /// Unique registry key. `"unknown"` when the card carries no name.
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub skills: Vec<AgentSkill>,
    /// The endpoint this descriptor was fetched from.
    pub discovery_url: String,
    /// Address used for all calls to this agent: the discovery URL with
    /// the well-known suffix stripped. Card-embedded URLs are ignored —
    /// they may point at loopback addresses unreachable from here.
    pub base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol_version: Option<String>,
}

impl AgentDescriptor {
    /// Derive the dispatch base URL from a discovery endpoint.
    pub fn base_url_from(discovery_url: &str) -> String {
        discovery_url
            .strip_suffix(WELL_KNOWN_SUFFIX)
            .unwrap_or(discovery_url)
            .to_string()
    }
}

fn default_user_id() -> String {
    "anonymous".to_string()
}

/// Payload of the `agent-tasks` queue. Immutable once enqueued.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskMessage {
    pub task: String,
    #[serde(default = "default_user_id")]
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_agent: Option<String>,
}

/// Payload of the `agent-responses` queue, published by the queue
/// processor after a successful dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseMessage {
    pub user_id: String,
    /// Name of the agent that produced the result. Always a name that
    /// existed in the registry at dispatch time.
    pub agent_used: String,
    pub result: String,
    pub original_task: String,
}

/// One async response as returned to a polling caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub user_id: String,
    pub agent_used: String,
    pub response: String,
    pub original_task: String,
    pub enqueued_at: DateTime<Utc>,
    pub message_id: Uuid,
}
