//! Keyword intent routing.
//!
//! A router looks at one user message and the agent currently holding the
//! conversation, and decides who should answer. The built-in
//! [`KeywordRouter`] does plain substring matching against per-agent
//! vocabularies; the first agent (in priority order) with a matching keyword
//! wins. When nothing matches, the conversation stays where it is.

use beth_core::config::RouterConfig;
use beth_core::definitions::same_id;
use tracing::debug;

use crate::roster::DEFAULT_AGENT;

/// Outcome of routing a single message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDecision {
    pub target_agent_id: String,
    /// True when `target_agent_id` differs from the current agent.
    pub should_handoff: bool,
    /// Human-readable explanation, for logs and `beth route`.
    pub reason: String,
}

/// Decides which agent answers a user message.
pub trait Router: Send + Sync {
    fn route(&self, message: &str, current_agent: &str) -> RouteDecision;
}

/// Substring-matching router over ordered per-agent keyword lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordRouter {
    default_agent: String,
    routes: Vec<AgentKeywords>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AgentKeywords {
    agent: String,
    keywords: Vec<String>,
}

impl Default for KeywordRouter {
    fn default() -> Self {
        Self::banking()
    }
}

impl KeywordRouter {
    /// Creates a router from `(agent, keywords)` pairs in priority order.
    ///
    /// Keywords are lowercased; empty keywords are dropped.
    pub fn new<A, K, S>(default_agent: &str, routes: impl IntoIterator<Item = (A, K)>) -> Self
    where
        A: Into<String>,
        K: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            default_agent: default_agent.to_string(),
            routes: routes
                .into_iter()
                .map(|(agent, keywords)| AgentKeywords {
                    agent: agent.into(),
                    keywords: normalize_keywords(keywords),
                })
                .collect(),
        }
    }

    /// The built-in banking vocabulary: nova, penny, sentinel, sage.
    pub fn banking() -> Self {
        Self::new(DEFAULT_AGENT, builtin_routes())
    }

    /// Built-in vocabulary adjusted by `[router]` config.
    ///
    /// `keywords` entries replace an agent's vocabulary (or add a new agent
    /// at the end); `priority` is then applied with [`Self::with_priority`].
    pub fn from_config(config: &RouterConfig, default_agent: &str) -> Self {
        let mut router = Self::banking();
        router.default_agent = default_agent.to_string();

        for (agent, keywords) in &config.keywords {
            let keywords = normalize_keywords(keywords);
            match router
                .routes
                .iter_mut()
                .find(|route| same_id(&route.agent, agent))
            {
                Some(route) => route.keywords = keywords,
                None => router.routes.push(AgentKeywords {
                    agent: agent.clone(),
                    keywords,
                }),
            }
        }

        router.with_priority(config.priority.as_slice())
    }

    /// Moves the listed agents to the front, in the given order.
    ///
    /// Unlisted agents keep their relative order after them; unknown ids are
    /// ignored.
    #[must_use]
    pub fn with_priority<S: AsRef<str>>(mut self, priority: &[S]) -> Self {
        let mut ordered = Vec::with_capacity(self.routes.len());
        for id in priority {
            if let Some(index) = self
                .routes
                .iter()
                .position(|route| same_id(&route.agent, id.as_ref()))
            {
                ordered.push(self.routes.remove(index));
            }
        }
        ordered.append(&mut self.routes);
        self.routes = ordered;
        self
    }

    /// Drops routes to agents not in `ids` (e.g. absent from a loaded catalog).
    pub fn retain_agents<S: AsRef<str>>(&mut self, ids: &[S]) {
        self.routes.retain(|route| {
            ids.iter()
                .any(|id| same_id(id.as_ref(), &route.agent))
        });
    }

    pub fn default_agent(&self) -> &str {
        &self.default_agent
    }

    /// Agent ids in priority order.
    pub fn agents(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|route| route.agent.as_str())
    }

    /// Keyword vocabulary for an agent, if it is routable.
    pub fn keywords(&self, agent: &str) -> Option<&[String]> {
        self.routes
            .iter()
            .find(|route| same_id(&route.agent, agent))
            .map(|route| route.keywords.as_slice())
    }

    fn first_match(&self, message: &str) -> Option<(&str, &str)> {
        let message = message.to_lowercase();
        self.routes.iter().find_map(|route| {
            route
                .keywords
                .iter()
                .find(|keyword| message.contains(keyword.as_str()))
                .map(|keyword| (route.agent.as_str(), keyword.as_str()))
        })
    }
}

impl Router for KeywordRouter {
    fn route(&self, message: &str, current_agent: &str) -> RouteDecision {
        let decision = if let Some((agent, keyword)) = self.first_match(message) {
            RouteDecision {
                target_agent_id: agent.to_string(),
                should_handoff: agent != current_agent,
                reason: format!("Detected \"{keyword}\" in message"),
            }
        } else if current_agent == self.default_agent {
            RouteDecision {
                target_agent_id: self.default_agent.clone(),
                should_handoff: false,
                reason: format!(
                    "No specific intent detected, staying with {}",
                    title_case(&self.default_agent)
                ),
            }
        } else {
            RouteDecision {
                target_agent_id: current_agent.to_string(),
                should_handoff: false,
                reason: "Continuing conversation with current agent".to_string(),
            }
        };

        debug!(
            current = current_agent,
            target = %decision.target_agent_id,
            handoff = decision.should_handoff,
            reason = %decision.reason,
            "routed message"
        );
        decision
    }
}

fn normalize_keywords<S: AsRef<str>>(keywords: impl IntoIterator<Item = S>) -> Vec<String> {
    keywords
        .into_iter()
        .map(|keyword| keyword.as_ref().trim().to_lowercase())
        .filter(|keyword| !keyword.is_empty())
        .collect()
}

fn title_case(id: &str) -> String {
    let mut chars = id.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn builtin_routes() -> [(&'static str, &'static [&'static str]); 4] {
    [
        (
            "nova",
            &[
                "send", "transfer", "pay", "payment", "wire", "zelle", "venmo", "money to",
            ],
        ),
        (
            "penny",
            &[
                "spending",
                "budget",
                "category",
                "spent",
                "expenses",
                "breakdown",
                "analytics",
                "where did",
                "how much did i spend",
            ],
        ),
        (
            "sentinel",
            &[
                "fraud",
                "suspicious",
                "block",
                "security",
                "unauthorized",
                "stolen",
                "hack",
                "scam",
                "protect",
            ],
        ),
        (
            "sage",
            &[
                "advice",
                "save",
                "saving",
                "invest",
                "investment",
                "goal",
                "retire",
                "plan",
                "strategy",
                "should i",
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn test_keyword_triggers_handoff() {
        let router = KeywordRouter::banking();

        let decision = router.route("Send $100 to Sarah", "atlas");

        assert_eq!(decision.target_agent_id, "nova");
        assert!(decision.should_handoff);
        assert_eq!(decision.reason, "Detected \"send\" in message");
    }

    #[test]
    fn test_keyword_overrides_stickiness() {
        let router = KeywordRouter::banking();
        let decision = router.route("show my spending", "nova");
        assert_eq!(decision.target_agent_id, "penny");
        assert!(decision.should_handoff);
    }

    #[test]
    fn test_sticky_retention() {
        let router = KeywordRouter::banking();
        let decision = router.route("thanks!", "penny");
        assert_eq!(
            decision,
            RouteDecision {
                target_agent_id: "penny".to_string(),
                should_handoff: false,
                reason: "Continuing conversation with current agent".to_string(),
            }
        );
    }

    #[test]
    fn test_no_intent_stays_with_default() {
        let router = KeywordRouter::banking();
        let decision = router.route("hello there", "atlas");
        assert_eq!(decision.target_agent_id, "atlas");
        assert!(!decision.should_handoff);
        assert_eq!(
            decision.reason,
            "No specific intent detected, staying with Atlas"
        );
    }

    #[test]
    fn test_same_agent_match_is_not_a_handoff() {
        let router = KeywordRouter::banking();
        let decision = router.route("Is this FRAUD?", "sentinel");
        assert_eq!(decision.target_agent_id, "sentinel");
        assert!(!decision.should_handoff);
    }

    #[test]
    fn test_priority_order_decides_ties() {
        // "pay" (nova) and "budget" (penny) both match
        let message = "help me budget so I can pay rent";
        assert_eq!(
            KeywordRouter::banking()
                .route(message, "atlas")
                .target_agent_id,
            "nova"
        );
        assert_eq!(
            KeywordRouter::banking()
                .with_priority(&["penny"])
                .route(message, "atlas")
                .target_agent_id,
            "penny"
        );
    }

    #[test]
    fn test_with_priority_keeps_unlisted_order() {
        let router = KeywordRouter::banking().with_priority(&["sage", "ghost", "penny"]);
        assert_eq!(
            router.agents().collect::<Vec<_>>(),
            vec!["sage", "penny", "nova", "sentinel"]
        );
    }

    #[test]
    fn test_from_config_replaces_and_adds_vocabulary() {
        let mut keywords = BTreeMap::new();
        keywords.insert("nova".to_string(), vec!["Remit".to_string()]);
        keywords.insert("loans".to_string(), vec!["mortgage".to_string()]);
        let config = RouterConfig {
            priority: vec!["loans".to_string()],
            keywords,
        };

        let router = KeywordRouter::from_config(&config, "atlas");

        assert_eq!(router.keywords("nova"), Some(&["remit".to_string()][..]));
        assert_eq!(router.agents().next(), Some("loans"));
        assert_eq!(
            router.route("refinance my mortgage", "atlas").target_agent_id,
            "loans"
        );
        // "send" is no longer a nova keyword
        assert_eq!(router.route("send it", "atlas").target_agent_id, "atlas");
    }

    #[test]
    fn test_retain_agents_drops_unknown_routes() {
        let mut router = KeywordRouter::banking();
        router.retain_agents(&["atlas", "Penny"]);

        assert_eq!(router.agents().collect::<Vec<_>>(), vec!["penny"]);
        let decision = router.route("send money to mom", "atlas");
        assert_eq!(decision.target_agent_id, "atlas");
        assert!(!decision.should_handoff);
    }

    #[test]
    fn test_custom_default_agent_reason() {
        let router = KeywordRouter::new("helper", [("nova", ["send"])]);
        assert_eq!(
            router.route("hi", "helper").reason,
            "No specific intent detected, staying with Helper"
        );
    }
}
