use maestro_core::{MaestroError, MaestroResult};
use maestro_discovery::AgentRegistry;
use std::time::Duration;
use tracing::{info, warn};

/// Agents may themselves run multi-step work, so the default is generous.
const DEFAULT_DISPATCH_TIMEOUT: Duration = Duration::from_secs(120);

/// Performs the outbound task call to a selected agent.
#[derive(Clone)]
pub struct AgentDispatcher {
    http: reqwest::Client,
    timeout: Duration,
}

impl AgentDispatcher {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_DISPATCH_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            timeout,
        }
    }

    /// Call `agent_name` with a task, returning the agent's result text.
    ///
    /// The call goes to `{base_url}/task` — the base URL derived from the
    /// discovery endpoint, since card-embedded URLs may be loopback
    /// addresses unreachable from the orchestrator.
    pub async fn call_agent(
        &self,
        registry: &AgentRegistry,
        agent_name: &str,
        task: &str,
        user_id: &str,
    ) -> MaestroResult<String> {
        let descriptor = registry
            .get(agent_name)
            .await
            .ok_or_else(|| MaestroError::AgentNotFound(agent_name.to_string()))?;

        if descriptor.base_url.is_empty() {
            return Err(MaestroError::MissingBaseUrl(agent_name.to_string()));
        }

        let task_url = format!("{}/task", descriptor.base_url);
        info!(agent = %agent_name, url = %task_url, "Calling agent");

        let resp = self
            .http
            .post(&task_url)
            .timeout(self.timeout)
            .json(&serde_json::json!({ "task": task, "user_id": user_id }))
            .send()
            .await
            .map_err(|e| MaestroError::Dispatch {
                agent: agent_name.to_string(),
                reason: e.to_string(),
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| MaestroError::Dispatch {
            agent: agent_name.to_string(),
            reason: e.to_string(),
        })?;

        if !status.is_success() {
            warn!(agent = %agent_name, status = %status, "Agent returned error status");
            return Err(MaestroError::Dispatch {
                agent: agent_name.to_string(),
                reason: format!("status {status}: {body}"),
            });
        }

        Ok(extract_result(&body))
    }
}

impl Default for AgentDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Best-effort result extraction from an agent response body.
///
/// A JSON object with a string `result` field yields that field; any
/// other JSON yields its serialization; a non-JSON body is returned as
/// is. An unexpected shape degrades, it never fails the dispatch.
fn extract_result(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => match value.get("result").and_then(serde_json::Value::as_str) {
            Some(result) => result.to_string(),
            None => value.to_string(),
        },
        Err(_) => body.to_string(),
    }
}
