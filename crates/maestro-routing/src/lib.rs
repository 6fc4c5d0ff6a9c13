//! Deterministic capability router.
//!
//! Maps a free-text task to the most suitable registered agent with a
//! fixed keyword/domain-token rule table. Deliberately not semantic:
//! every selection is explainable from the tables below, and the whole
//! module is a pure function over a registry snapshot, so it can be
//! swapped for a learned matcher later without touching the surrounding
//! contracts.
//!
//! Selection priority:
//! 1. A caller-supplied preferred agent that exists in the registry wins
//!    outright.
//! 2. First agent (in registry order) with any rule hit wins. Per agent,
//!    name/description-level rules run before skill-level rules.
//! 3. Otherwise the first registered agent is the stable default; `None`
//!    only for an empty registry.

use maestro_core::AgentDescriptor;
use tracing::debug;

/// Task keywords that trigger the burger category.
const BURGER_KEYWORDS: &[&str] = &["burger", "cheeseburger", "hamburger"];
/// Task keywords that trigger the pizza category.
const PIZZA_KEYWORDS: &[&str] = &["pizza", "pizzas", "margherita", "pepperoni"];
/// Task keywords that trigger the illustration category.
const ILLUSTRATION_KEYWORDS: &[&str] = &[
    "illustration",
    "illustrate",
    "draw",
    "image",
    "picture",
    "visual",
    "graphic",
];
/// Task keywords that trigger the currency category.
const CURRENCY_KEYWORDS: &[&str] = &["currency", "exchange", "convert"];
/// Task keywords that trigger the travel category.
const TRAVEL_KEYWORDS: &[&str] = &["restaurant", "attraction", "itinerary", "trip", "plan"];

fn mentions_any(task: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| task.contains(k))
}

/// Select the agent for `task` from a registry snapshot.
///
/// `agents` must be in registry (insertion) order; ties resolve to the
/// earliest entry. Returns `None` only when `agents` is empty.
pub fn select_agent<'a>(
    task: &str,
    preferred_agent: Option<&str>,
    agents: &'a [AgentDescriptor],
) -> Option<&'a str> {
    if let Some(preferred) = preferred_agent {
        if let Some(agent) = agents.iter().find(|a| a.name == preferred) {
            debug!(agent = %agent.name, "Using preferred agent");
            return Some(agent.name.as_str());
        }
    }

    let task = task.to_lowercase();

    for agent in agents {
        let name = agent.name.to_lowercase();
        let description = agent.description.to_lowercase();

        // Name/description-level rules run before this agent's skills.
        if mentions_any(&task, BURGER_KEYWORDS)
            && (name.contains("burger") || description.contains("burger"))
        {
            debug!(agent = %agent.name, rule = "burger", "Matched on name/description");
            return Some(agent.name.as_str());
        }

        if mentions_any(&task, PIZZA_KEYWORDS)
            && (name.contains("pizza") || description.contains("pizza"))
        {
            debug!(agent = %agent.name, rule = "pizza", "Matched on name/description");
            return Some(agent.name.as_str());
        }

        if mentions_any(&task, ILLUSTRATION_KEYWORDS)
            && (name.contains("illustrat") || description.contains("illustrat"))
        {
            debug!(agent = %agent.name, rule = "illustration", "Matched on name/description");
            return Some(agent.name.as_str());
        }

        for skill in &agent.skills {
            let skill_name = skill.name.to_lowercase();
            let skill_desc = skill.description.to_lowercase();

            if mentions_any(&task, ILLUSTRATION_KEYWORDS)
                && (skill_name.contains("illustrat") || skill_desc.contains("illustrat"))
            {
                debug!(agent = %agent.name, skill = %skill.name, rule = "illustration", "Matched on skill");
                return Some(agent.name.as_str());
            }

            if mentions_any(&task, CURRENCY_KEYWORDS)
                && (skill_name.contains("currency") || skill_desc.contains("currency"))
            {
                debug!(agent = %agent.name, skill = %skill.name, rule = "currency", "Matched on skill");
                return Some(agent.name.as_str());
            }

            // The travel rule matches on skill names only.
            if mentions_any(&task, TRAVEL_KEYWORDS)
                && (skill_name.contains("travel")
                    || skill_name.contains("restaurant")
                    || skill_name.contains("attraction"))
            {
                debug!(agent = %agent.name, skill = %skill.name, rule = "travel", "Matched on skill");
                return Some(agent.name.as_str());
            }

            if mentions_any(&task, BURGER_KEYWORDS)
                && (skill_name.contains("burger")
                    || skill_desc.contains("burger")
                    || name.contains("burger"))
            {
                debug!(agent = %agent.name, skill = %skill.name, rule = "burger", "Matched on skill");
                return Some(agent.name.as_str());
            }

            if mentions_any(&task, PIZZA_KEYWORDS)
                && (skill_name.contains("pizza")
                    || skill_desc.contains("pizza")
                    || name.contains("pizza"))
            {
                debug!(agent = %agent.name, skill = %skill.name, rule = "pizza", "Matched on skill");
                return Some(agent.name.as_str());
            }
        }
    }

    // Stable default: first registered agent.
    match agents.first() {
        Some(agent) => {
            debug!(agent = %agent.name, "No rule matched, using first registered agent");
            Some(agent.name.as_str())
        }
        None => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use maestro_core::AgentSkill;

    fn agent(name: &str, description: &str) -> AgentDescriptor {
        AgentDescriptor {
            name: name.to_string(),
            description: description.to_string(),
            skills: vec![],
            discovery_url: format!("http://{name}/.well-known/agent.json"),
            base_url: format!("http://{name}"),
            protocol_version: None,
        }
    }

    fn agent_with_skills(name: &str, description: &str, skills: &[(&str, &str)]) -> AgentDescriptor {
        let mut a = agent(name, description);
        a.skills = skills
            .iter()
            .map(|(n, d)| AgentSkill {
                id: None,
                name: (*n).to_string(),
                description: (*d).to_string(),
                examples: vec![],
            })
            .collect();
        a
    }

    #[test]
    fn test_preferred_agent_bypasses_matching() {
        let agents = vec![
            agent("burger-agent", "handles burger orders"),
            agent("travel-agent", "trip planning"),
        ];
        // Task content is irrelevant when the preferred agent exists.
        let selected = select_agent("I want 2 cheeseburgers", Some("travel-agent"), &agents);
        assert_eq!(selected, Some("travel-agent"));
    }

    #[test]
    fn test_unknown_preferred_agent_falls_through_to_matching() {
        let agents = vec![
            agent("travel-agent", "trip planning"),
            agent("burger-agent", "handles burger orders"),
        ];
        let selected = select_agent("I want 2 cheeseburgers", Some("ghost-agent"), &agents);
        assert_eq!(selected, Some("burger-agent"));
    }

    #[test]
    fn test_burger_keyword_matches_description() {
        let agents = vec![
            agent("burger-agent", "handles burger orders"),
            agent("travel-agent", "trip planning"),
        ];
        let selected = select_agent("I want 2 cheeseburgers", None, &agents);
        assert_eq!(selected, Some("burger-agent"));
    }

    #[test]
    fn test_pizza_keyword_matches_name() {
        let agents = vec![
            agent("travel-agent", "trip planning"),
            agent("pizza-agent", "takes orders"),
        ];
        let selected = select_agent("one margherita please", None, &agents);
        assert_eq!(selected, Some("pizza-agent"));
    }

    #[test]
    fn test_illustration_token_is_a_stem() {
        // "illustrat" matches both "illustration" and "illustrator".
        let agents = vec![
            agent("travel-agent", "trip planning"),
            agent("art-agent", "an illustrator for children's books"),
        ];
        let selected = select_agent("draw me a picture of a castle", None, &agents);
        assert_eq!(selected, Some("art-agent"));
    }

    #[test]
    fn test_currency_rule_matches_skill_name() {
        let agents = vec![agent_with_skills(
            "travel-agent",
            "trip planning",
            &[("currency_exchange", "convert between currencies")],
        )];
        let selected = select_agent("Convert 100 USD to EUR", None, &agents);
        assert_eq!(selected, Some("travel-agent"));
    }

    #[test]
    fn test_travel_rule_matches_skill_name_only() {
        // Domain token in the skill description alone is not enough for
        // the travel rule; it inspects skill names.
        let agents = vec![
            agent_with_skills("a", "", &[("booking", "travel helper")]),
            agent_with_skills("b", "", &[("attraction_search", "find sights")]),
        ];
        let selected = select_agent("find an attraction in Tokyo", None, &agents);
        assert_eq!(selected, Some("b"));
    }

    #[test]
    fn test_burger_skill_rule_also_considers_agent_name() {
        let agents = vec![
            agent("travel-agent", "trip planning"),
            agent_with_skills("burger-palace", "food orders", &[("take_order", "order food")]),
        ];
        let selected = select_agent("hamburger with fries", None, &agents);
        assert_eq!(selected, Some("burger-palace"));
    }

    #[test]
    fn test_first_agent_in_registry_order_wins() {
        let agents = vec![
            agent("burger-one", "burger orders"),
            agent("burger-two", "burger orders"),
        ];
        let selected = select_agent("a burger please", None, &agents);
        assert_eq!(selected, Some("burger-one"));
    }

    #[test]
    fn test_name_level_rules_run_before_skill_rules_per_agent() {
        // The first agent matches at the skill level only; the scan is
        // per-agent, so it still wins over a later name-level match.
        let agents = vec![
            agent_with_skills("studio", "", &[("illustration_gen", "make images")]),
            agent("illustration-agent", "illustration service"),
        ];
        let selected = select_agent("illustrate a dragon", None, &agents);
        assert_eq!(selected, Some("studio"));
    }

    #[test]
    fn test_no_match_falls_back_to_first_agent() {
        let agents = vec![
            agent("travel-agent", "trip planning"),
            agent("burger-agent", "handles burger orders"),
        ];
        let selected = select_agent("what time is it", None, &agents);
        assert_eq!(selected, Some("travel-agent"));
    }

    #[test]
    fn test_empty_registry_returns_none() {
        assert_eq!(select_agent("anything at all", None, &[]), None);
        assert_eq!(select_agent("anything", Some("ghost"), &[]), None);
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let agents = vec![
            agent("travel-agent", "trip planning"),
            agent("Burger-Agent", "Handles Burger Orders"),
        ];
        let selected = select_agent("ORDER A CHEESEBURGER", None, &agents);
        assert_eq!(selected, Some("Burger-Agent"));
    }

    #[test]
    fn test_keyword_without_domain_token_does_not_match() {
        // Task mentions pizza, but no agent carries the pizza token:
        // fall back to the first agent.
        let agents = vec![
            agent("travel-agent", "trip planning"),
            agent("currency-agent", "exchange rates"),
        ];
        let selected = select_agent("order a pizza", None, &agents);
        assert_eq!(selected, Some("travel-agent"));
    }

    #[test]
    fn test_trip_plan_keywords_route_to_travel_skill() {
        let agents = vec![
            agent("burger-agent", "handles burger orders"),
            agent_with_skills(
                "travel-agent",
                "trip planning",
                &[("travel_itinerary", "plan trips")],
            ),
        ];
        let selected = select_agent("plan a trip to Paris", None, &agents);
        assert_eq!(selected, Some("travel-agent"));
    }
}
