// ABOUTME: Defines all error types for the troupe library using thiserror.
// ABOUTME: Each layer has its own error enum, unified under TroupeError.

use crate::orchestrator::TaskResult;

/// Top-level error type for the troupe library.
#[derive(Debug, thiserror::Error)]
pub enum TroupeError {
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    #[error("Task error: {0}")]
    Task(#[from] TaskError),

    #[error("Orchestration error: {0}")]
    Orchestrator(#[from] OrchestratorError),
}

/// Errors from LLM client operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("No response from API")]
    EmptyResponse,
}

impl LlmError {
    /// Whether retrying the same request could plausibly succeed.
    ///
    /// Transport failures, request timeouts, rate limiting and server-side
    /// errors are retryable. The engine never retries on its own.
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            LlmError::Api { status, .. } => matches!(status, 408 | 429 | 500..=599),
            _ => false,
        }
    }
}

/// Errors from agent execution.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("agent '{agent}' failed to execute task: {source}")]
    Generation {
        agent: String,
        #[source]
        source: LlmError,
    },

    #[error("agent '{0}' was cancelled while waiting for its rate limit")]
    RateLimitCancelled(String),
}

/// Errors from task execution.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("task '{description}' has no agent assigned")]
    Unassigned { description: String },

    #[error("task '{description}' failed: {source}")]
    Agent {
        description: String,
        #[source]
        source: AgentError,
    },
}

/// Errors produced while turning a manager reply into a plan.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("manager call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("manager did not return a valid plan")]
    NoPlan,

    #[error("failed to parse execution plan: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("manager returned an empty plan")]
    Empty,
}

/// Errors from the orchestration engine.
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error("hierarchical mode requires a manager model")]
    MissingManager,

    #[error("no agents available for orchestration")]
    NoAgents,

    #[error("hierarchical mode requires either tasks or a goal")]
    NothingToDo,

    #[error("operation cancelled")]
    Cancelled,

    #[error("task {index} failed: {source}")]
    TaskFailed {
        index: usize,
        #[source]
        source: TaskError,
    },

    #[error("manager failed to select agent for task {index}: {source}")]
    AgentSelection {
        index: usize,
        #[source]
        source: LlmError,
    },

    #[error("step {step} failed: {source}")]
    StepFailed {
        step: usize,
        #[source]
        source: TaskError,
    },

    #[error("manager failed to create execution plan: {0}")]
    Planning(#[from] PlanError),

    #[error("task {index} aborted: {reason}")]
    TaskAborted { index: usize, reason: String },

    #[error("{}", join_messages(.0))]
    Aggregate(Vec<OrchestratorError>),
}

impl OrchestratorError {
    /// Whether this error was raised before any work began.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            OrchestratorError::MissingManager
                | OrchestratorError::NoAgents
                | OrchestratorError::NothingToDo
        )
    }

    /// The individual failures behind this error.
    ///
    /// An aggregate yields each of its members; any other error yields itself.
    pub fn failures(&self) -> Vec<&OrchestratorError> {
        match self {
            OrchestratorError::Aggregate(errors) => errors.iter().collect(),
            other => vec![other],
        }
    }
}

fn join_messages(errors: &[OrchestratorError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// A failed orchestration run.
///
/// Carries the cause together with whatever ordered results were produced
/// before the failure. Slots are index-stable: `partial[i]` belongs to the
/// i-th task (or plan step), and `None` marks a slot that never completed.
#[derive(Debug, thiserror::Error)]
#[error("{source}")]
pub struct KickoffError {
    #[source]
    pub source: OrchestratorError,
    pub partial: Vec<Option<TaskResult>>,
}

impl KickoffError {
    /// A failure with no results at all.
    pub fn bare(source: OrchestratorError) -> Self {
        Self {
            source,
            partial: Vec::new(),
        }
    }

    /// A failure after a dense run of completed results.
    pub fn with_results(source: OrchestratorError, results: Vec<TaskResult>) -> Self {
        Self {
            source,
            partial: results.into_iter().map(Some).collect(),
        }
    }

    /// Results that did complete, in task order.
    pub fn completed(&self) -> impl Iterator<Item = &TaskResult> {
        self.partial.iter().flatten()
    }
}
