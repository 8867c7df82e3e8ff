// ABOUTME: Prelude module - convenient imports for common use cases.
// ABOUTME: Use `use troupe::prelude::*;` to get started quickly.

pub use crate::agent::{Agent, AgentRoster, MatchStrategy, RateLimiter, Resolution};
pub use crate::error::{
    AgentError, KickoffError, LlmError, OrchestratorError, PlanError, TaskError, TroupeError,
};
pub use crate::hook::{ConsoleProgress, Hook, HookEvent, HookRegistry, Unit};
pub use crate::llm::{
    AnthropicClient, LanguageModel, LlmClient, Message, ModelConfig, OpenAIClient, Request,
    Response, Role, StopReason, Usage,
};
pub use crate::memory::{InMemoryStore, Memory, MemoryRecord};
pub use crate::orchestrator::{
    ExecutionMode, Orchestrator, OrchestratorBuilder, PlanStep, TaskResult, format_results,
};
pub use crate::task::Task;
pub use tokio_util::sync::CancellationToken;
