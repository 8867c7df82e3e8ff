// ABOUTME: Task - a unit of work described in prose and optionally bound to an agent.
// ABOUTME: Builds the task prompt and forwards it to the bound agent.

use std::fmt::Write;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::agent::Agent;
use crate::error::TaskError;

/// A unit of work for an agent.
#[derive(Debug, Clone)]
pub struct Task {
    /// What needs to be done.
    pub description: String,

    /// What a good answer looks like.
    pub expected_output: Option<String>,

    /// The agent that will perform the task. Unbound tasks cannot run
    /// until a manager assigns one.
    pub agent: Option<Arc<Agent>>,

    /// Extra background handed to the agent with the task.
    pub context: Vec<String>,
}

impl Task {
    /// Create an unbound task.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            expected_output: None,
            agent: None,
            context: Vec::new(),
        }
    }

    /// Set the expected output.
    pub fn expected_output(mut self, expected: impl Into<String>) -> Self {
        self.expected_output = Some(expected.into());
        self
    }

    /// Bind the task to an agent.
    pub fn agent(mut self, agent: Arc<Agent>) -> Self {
        self.agent = Some(agent);
        self
    }

    /// Add a context entry.
    pub fn context(mut self, entry: impl Into<String>) -> Self {
        self.context.push(entry.into());
        self
    }

    /// A copy of this task bound to `agent`. `self` is left unchanged.
    pub fn with_agent(&self, agent: Arc<Agent>) -> Self {
        Self {
            agent: Some(agent),
            ..self.clone()
        }
    }

    /// Name of the bound agent, if any.
    pub fn agent_name(&self) -> Option<&str> {
        self.agent.as_deref().map(|a| a.name.as_str())
    }

    /// The text sent to the agent.
    pub fn build_prompt(&self) -> String {
        let mut prompt = self.description.clone();
        if let Some(expected) = self.expected_output.as_deref().filter(|e| !e.is_empty()) {
            let _ = write!(prompt, "\n\nExpected output: {}", expected);
        }
        if !self.context.is_empty() {
            prompt.push_str("\n\nContext:");
            for entry in &self.context {
                let _ = write!(prompt, "\n- {}", entry);
            }
        }
        prompt
    }

    /// Run the task on its bound agent.
    pub async fn execute(&self) -> Result<String, TaskError> {
        self.execute_with_cancel(&CancellationToken::new()).await
    }

    /// Run the task, letting `cancel` interrupt a pending rate-limit wait.
    pub async fn execute_with_cancel(&self, cancel: &CancellationToken) -> Result<String, TaskError> {
        let Some(agent) = &self.agent else {
            return Err(TaskError::Unassigned {
                description: self.description.clone(),
            });
        };

        agent
            .execute_with_cancel(&self.build_prompt(), cancel)
            .await
            .map_err(|source| TaskError::Agent {
                description: self.description.clone(),
                source,
            })
    }
}

impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        let same_agent = match (&self.agent, &other.agent) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        same_agent
            && self.description == other.description
            && self.expected_output == other.expected_output
            && self.context == other.context
    }
}
