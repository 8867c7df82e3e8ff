// ABOUTME: AgentRoster - the ordered set of agents a manager can choose from.
// ABOUTME: Renders the roster for prompts and resolves manager replies to agents.

use std::collections::HashMap;
use std::fmt::Write;
use std::sync::Arc;

use super::Agent;

/// How a manager reply is matched against agent names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    /// Case-insensitive equality with the trimmed reply.
    Exact,

    /// Exact first, then the first agent (in roster order) whose name
    /// appears anywhere in the reply, ignoring case.
    ExactThenContains,
}

/// Outcome of resolving a reply to an agent.
#[derive(Debug, Clone)]
pub enum Resolution {
    /// The reply named the agent exactly.
    Exact(Arc<Agent>),

    /// The agent's name appeared inside a longer reply.
    Contained(Arc<Agent>),

    /// Nothing matched; the first agent was chosen.
    FallbackFirst(Arc<Agent>),

    /// The roster is empty.
    Unresolved,
}

impl Resolution {
    /// The resolved agent, if any.
    pub fn agent(&self) -> Option<&Arc<Agent>> {
        match self {
            Resolution::Exact(a) | Resolution::Contained(a) | Resolution::FallbackFirst(a) => {
                Some(a)
            }
            Resolution::Unresolved => None,
        }
    }

    /// Consume the resolution, yielding the agent.
    pub fn into_agent(self) -> Option<Arc<Agent>> {
        match self {
            Resolution::Exact(a) | Resolution::Contained(a) | Resolution::FallbackFirst(a) => {
                Some(a)
            }
            Resolution::Unresolved => None,
        }
    }

    /// Whether the agent was picked by falling back.
    pub fn is_fallback(&self) -> bool {
        matches!(self, Resolution::FallbackFirst(_))
    }
}

/// Ordered agents plus a case-insensitive name index.
///
/// When two agents share a name (ignoring case) the earlier one wins.
#[derive(Debug, Clone, Default)]
pub struct AgentRoster {
    agents: Vec<Arc<Agent>>,
    by_name: HashMap<String, usize>,
}

impl AgentRoster {
    /// Build a roster from agents in priority order.
    pub fn new(agents: Vec<Arc<Agent>>) -> Self {
        let mut by_name = HashMap::with_capacity(agents.len());
        for (idx, agent) in agents.iter().enumerate() {
            by_name.entry(agent.name.to_lowercase()).or_insert(idx);
        }
        Self { agents, by_name }
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Agents in roster order.
    pub fn agents(&self) -> &[Arc<Agent>] {
        &self.agents
    }

    /// The first agent, used as the fallback.
    pub fn first(&self) -> Option<&Arc<Agent>> {
        self.agents.first()
    }

    /// Look up an agent by name, ignoring case and surrounding whitespace.
    pub fn get(&self, name: &str) -> Option<&Arc<Agent>> {
        self.by_name
            .get(&name.trim().to_lowercase())
            .map(|&idx| &self.agents[idx])
    }

    /// Render the roster as shown to the manager model.
    pub fn describe(&self) -> String {
        let mut out = String::from("Available Agents:\n");
        for (i, agent) in self.agents.iter().enumerate() {
            let _ = writeln!(out, "{}. Name: {}", i + 1, agent.name);
            let _ = writeln!(out, "   Role: {}", agent.role);
            let _ = writeln!(out, "   Goal: {}", agent.goal);
            if !agent.backstory.is_empty() {
                let _ = writeln!(out, "   Backstory: {}", agent.backstory);
            }
            out.push('\n');
        }
        out
    }

    /// Resolve a free-text reply to an agent.
    pub fn resolve(&self, reply: &str, strategy: MatchStrategy) -> Resolution {
        let Some(first) = self.first() else {
            return Resolution::Unresolved;
        };

        if let Some(agent) = self.get(reply) {
            return Resolution::Exact(agent.clone());
        }

        if strategy == MatchStrategy::ExactThenContains {
            let reply = reply.to_lowercase();
            if let Some(agent) = self
                .agents
                .iter()
                .find(|a| !a.name.is_empty() && reply.contains(&a.name.to_lowercase()))
            {
                return Resolution::Contained(agent.clone());
            }
        }

        Resolution::FallbackFirst(first.clone())
    }
}
