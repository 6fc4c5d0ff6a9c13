use maestro_core::{AgentDescriptor, AgentSkill};
use serde::Deserialize;

/// Raw agent card as fetched from a well-known endpoint.
///
/// Two shapes exist in the wild: A2A cards nest skills under
/// `capabilities.skills`, ADK cards put `skills` at the top level. Both
/// deserialize into this document; [`AgentCard::into_descriptor`] resolves
/// the union once so nothing downstream re-inspects raw shape.
#[derive(Debug, Deserialize)]
pub(crate) struct AgentCard {
    name: Option<String>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    skills: Vec<AgentSkill>,
    #[serde(default)]
    capabilities: Capabilities,
    #[serde(rename = "protocolVersion")]
    protocol_version: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Capabilities {
    #[serde(default)]
    skills: Vec<AgentSkill>,
}

impl AgentCard {
    /// Resolve into the canonical descriptor.
    ///
    /// The effective skill list is the first non-empty of top-level
    /// `skills` and `capabilities.skills`. The base URL comes from the
    /// discovery endpoint, never from the card: cards routinely embed
    /// loopback addresses that are unreachable from the orchestrator.
    pub(crate) fn into_descriptor(self, discovery_url: &str) -> AgentDescriptor {
        let skills = if self.skills.is_empty() {
            self.capabilities.skills
        } else {
            self.skills
        };

        AgentDescriptor {
            name: self.name.unwrap_or_else(|| "unknown".to_string()),
            description: self.description,
            skills,
            discovery_url: discovery_url.to_string(),
            base_url: AgentDescriptor::base_url_from(discovery_url),
            protocol_version: self.protocol_version,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const URL: &str = "http://agent-service/.well-known/agent.json";

    #[test]
    fn test_a2a_shape_nested_skills() {
        let card: AgentCard = serde_json::from_str(
            r#"{
                "name": "travel-agent",
                "description": "trip planning",
                "capabilities": {
                    "skills": [
                        {"id": "s1", "name": "attraction_search", "description": "find attractions"}
                    ]
                },
                "protocolVersion": "0.2"
            }"#,
        )
        .unwrap();

        let descriptor = card.into_descriptor(URL);
        assert_eq!(descriptor.name, "travel-agent");
        assert_eq!(descriptor.skills.len(), 1);
        assert_eq!(descriptor.skills[0].name, "attraction_search");
        assert_eq!(descriptor.base_url, "http://agent-service");
        assert_eq!(descriptor.protocol_version.as_deref(), Some("0.2"));
    }

    #[test]
    fn test_adk_shape_top_level_skills() {
        let card: AgentCard = serde_json::from_str(
            r#"{
                "name": "burger-agent",
                "description": "handles burger orders",
                "skills": [{"name": "order_burger", "description": "take an order"}]
            }"#,
        )
        .unwrap();

        let descriptor = card.into_descriptor(URL);
        assert_eq!(descriptor.skills.len(), 1);
        assert_eq!(descriptor.skills[0].name, "order_burger");
    }

    #[test]
    fn test_top_level_skills_win_when_both_present() {
        let card: AgentCard = serde_json::from_str(
            r#"{
                "name": "dual",
                "skills": [{"name": "root_skill"}],
                "capabilities": {"skills": [{"name": "nested_skill"}]}
            }"#,
        )
        .unwrap();

        let descriptor = card.into_descriptor(URL);
        assert_eq!(descriptor.skills.len(), 1);
        assert_eq!(descriptor.skills[0].name, "root_skill");
    }

    #[test]
    fn test_nested_skills_used_when_top_level_empty() {
        let card: AgentCard = serde_json::from_str(
            r#"{
                "name": "dual",
                "skills": [],
                "capabilities": {"skills": [{"name": "nested_skill"}]}
            }"#,
        )
        .unwrap();

        let descriptor = card.into_descriptor(URL);
        assert_eq!(descriptor.skills[0].name, "nested_skill");
    }

    #[test]
    fn test_missing_name_defaults_to_unknown() {
        let card: AgentCard = serde_json::from_str(r#"{"description": "nameless"}"#).unwrap();
        let descriptor = card.into_descriptor(URL);
        assert_eq!(descriptor.name, "unknown");
        assert!(descriptor.skills.is_empty());
    }
}
