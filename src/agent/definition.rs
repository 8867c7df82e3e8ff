// ABOUTME: Agent - a named persona that answers task prompts through a language model.
// ABOUTME: Composes the persona prompt, honours an optional rate limit and records memory.

use std::fmt;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::rate_limiter::RateLimiter;
use crate::error::AgentError;
use crate::llm::LanguageModel;
use crate::memory::{Memory, MemoryRecord};

/// A named worker with a persona, backed by a language model.
///
/// Agents are immutable once built and are shared as `Arc<Agent>` between
/// tasks, the roster and concurrent units.
pub struct Agent {
    /// Unique name, used by the manager to pick agents.
    pub name: String,

    /// What the agent does (e.g. "Senior Researcher").
    pub role: String,

    /// What the agent is trying to achieve.
    pub goal: String,

    /// Background that shapes the agent's answers. May be empty.
    pub backstory: String,

    model: LanguageModel,
    memory: Option<Arc<dyn Memory>>,
    limiter: Option<RateLimiter>,
}

impl Agent {
    /// Create an agent with the given name and model.
    pub fn new(name: impl Into<String>, model: LanguageModel) -> Self {
        Self {
            name: name.into(),
            role: String::new(),
            goal: String::new(),
            backstory: String::new(),
            model,
            memory: None,
            limiter: None,
        }
    }

    /// Set the role.
    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    /// Set the goal.
    pub fn goal(mut self, goal: impl Into<String>) -> Self {
        self.goal = goal.into();
        self
    }

    /// Set the backstory.
    pub fn backstory(mut self, backstory: impl Into<String>) -> Self {
        self.backstory = backstory.into();
        self
    }

    /// Attach a memory that records every completed exchange.
    pub fn memory(mut self, memory: Arc<dyn Memory>) -> Self {
        self.memory = Some(memory);
        self
    }

    /// Limit model calls to `requests` per minute.
    pub fn max_rpm(mut self, requests: u32) -> Self {
        self.limiter = Some(RateLimiter::per_minute(requests));
        self
    }

    /// The model this agent generates with.
    pub fn model(&self) -> &LanguageModel {
        &self.model
    }

    /// Whether a rate limit is configured.
    pub fn is_rate_limited(&self) -> bool {
        self.limiter.is_some()
    }

    /// Compose the persona prompt sent for `task`.
    pub fn build_prompt(&self, task: &str) -> String {
        format!(
            "You are {}.\nYour role is: {}\nYour goal is: {}\nYour backstory: {}\n\nTask: {}\n\nPlease complete the task and provide a clear, detailed response.",
            self.name, self.role, self.goal, self.backstory, task
        )
    }

    /// Execute a task description and return the model's answer.
    pub async fn execute(&self, task: &str) -> Result<String, AgentError> {
        self.execute_with_cancel(task, &CancellationToken::new())
            .await
    }

    /// Like [`Agent::execute`], but gives up while waiting for the rate
    /// limit if `cancel` fires. A model call already issued always runs to
    /// completion.
    pub async fn execute_with_cancel(
        &self,
        task: &str,
        cancel: &CancellationToken,
    ) -> Result<String, AgentError> {
        if let Some(limiter) = &self.limiter {
            if !limiter.acquire(cancel).await {
                return Err(AgentError::RateLimitCancelled(self.name.clone()));
            }
        }

        let prompt = self.build_prompt(task);
        tracing::debug!(agent = %self.name, "generating response");

        let response = self
            .model
            .generate(&prompt)
            .await
            .map_err(|source| AgentError::Generation {
                agent: self.name.clone(),
                source,
            })?;

        if let Some(memory) = &self.memory {
            let record = MemoryRecord::new(
                &self.name,
                format!("Task: {}\nResult: {}", task, response),
            );
            if let Err(e) = memory.store(record).await {
                tracing::warn!(agent = %self.name, error = %e, "failed to store memory");
            }
        }

        Ok(response)
    }
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("role", &self.role)
            .field("goal", &self.goal)
            .field("model", &self.model.config().model)
            .field("rate_limited", &self.limiter.is_some())
            .finish_non_exhaustive()
    }
}
