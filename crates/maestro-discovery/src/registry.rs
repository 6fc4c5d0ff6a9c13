use maestro_core::AgentDescriptor;
use tokio::sync::{Mutex, MutexGuard, RwLock};

/// In-memory registry of discovered agents.
///
/// Iteration order is insertion order, and re-inserting an existing name
/// replaces the entry in place without moving it — the router's
/// "first agent in registry order" contract depends on both. Entries are
/// replaced wholesale; there is no deletion, so an agent that stops
/// responding simply goes stale until its next successful discovery.
pub struct AgentRegistry {
    agents: RwLock<Vec<AgentDescriptor>>,
    refresh: Mutex<()>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self {
            agents: RwLock::new(Vec::new()),
            refresh: Mutex::new(()),
        }
    }

    /// Serialize discovery passes: the guard must be held for the duration
    /// of a pass so concurrent refreshes cannot interleave entry writes.
    pub async fn begin_refresh(&self) -> MutexGuard<'_, ()> {
        self.refresh.lock().await
    }

    /// Insert or replace the entry for `descriptor.name`, atomically per
    /// entry and position-preserving on replace.
    pub async fn insert(&self, descriptor: AgentDescriptor) {
        let mut agents = self.agents.write().await;
        match agents.iter_mut().find(|a| a.name == descriptor.name) {
            Some(existing) => *existing = descriptor,
            None => agents.push(descriptor),
        };
    }

    pub async fn get(&self, name: &str) -> Option<AgentDescriptor> {
        self.agents
            .read()
            .await
            .iter()
            .find(|a| a.name == name)
            .cloned()
    }

    pub async fn contains(&self, name: &str) -> bool {
        self.agents.read().await.iter().any(|a| a.name == name)
    }

    /// Point-in-time copy of all entries in registry order. Routing and
    /// dispatch work on snapshots; concurrent refreshes only mean a
    /// snapshot can be stale, which is a safe degradation.
    pub async fn snapshot(&self) -> Vec<AgentDescriptor> {
        self.agents.read().await.clone()
    }

    pub async fn names(&self) -> Vec<String> {
        self.agents
            .read()
            .await
            .iter()
            .map(|a| a.name.clone())
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.agents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.agents.read().await.is_empty()
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::new()
    }
}
