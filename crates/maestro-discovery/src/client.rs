use crate::card::AgentCard;
use crate::registry::AgentRegistry;
use maestro_core::{AgentDescriptor, MaestroError, MaestroResult};
use std::time::Duration;
use tracing::{info, warn};

const DEFAULT_DISCOVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetches agent cards from well-known endpoints and refreshes the
/// registry.
pub struct DiscoveryClient {
    http: reqwest::Client,
    timeout: Duration,
}

impl DiscoveryClient {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_DISCOVERY_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            timeout,
        }
    }

    /// Fetch and resolve a single agent card.
    pub async fn discover_agent(&self, endpoint: &str) -> MaestroResult<AgentDescriptor> {
        let resp = self
            .http
            .get(endpoint)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| MaestroError::Discovery {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(MaestroError::Discovery {
                endpoint: endpoint.to_string(),
                reason: format!("unexpected status {status}"),
            });
        }

        let card: AgentCard = resp.json().await.map_err(|e| MaestroError::Discovery {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?;

        let descriptor = card.into_descriptor(endpoint);
        info!(
            agent = %descriptor.name,
            skills = descriptor.skills.len(),
            protocol = descriptor.protocol_version.as_deref().unwrap_or("A2A"),
            "Discovered agent"
        );
        Ok(descriptor)
    }

    /// Run one discovery pass over the configured endpoints.
    ///
    /// Fail-soft: an endpoint that errors is logged and skipped, never
    /// aborting the remaining endpoints. Passes serialize through the
    /// registry's refresh lock. Returns the number of refreshed entries.
    pub async fn discover_all(&self, registry: &AgentRegistry, endpoints: &[String]) -> usize {
        let _guard = registry.begin_refresh().await;

        let mut refreshed = 0;
        for endpoint in endpoints {
            let endpoint = endpoint.trim();
            if endpoint.is_empty() {
                continue;
            }

            match self.discover_agent(endpoint).await {
                Ok(descriptor) => {
                    registry.insert(descriptor).await;
                    refreshed += 1;
                }
                Err(e) => {
                    warn!(endpoint = %endpoint, error = %e, "Agent discovery failed, skipping endpoint");
                }
            }
        }

        let total = registry.len().await;
        info!(refreshed, total, "Discovery pass complete");
        refreshed
    }
}

impl Default for DiscoveryClient {
    fn default() -> Self {
        Self::new()
    }
}
