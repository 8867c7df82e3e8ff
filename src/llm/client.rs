// ABOUTME: Defines the LlmClient trait - the abstraction layer that lets
// ABOUTME: agents and the manager talk to any provider (Anthropic, OpenAI, etc.)

use async_trait::async_trait;

use super::{Request, Response};
use crate::error::LlmError;

/// Trait for LLM client implementations.
///
/// Implementations should honour their own request deadlines; the
/// orchestration engine never interrupts a call once it has been issued.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Create a message (non-streaming).
    async fn create_message(&self, req: &Request) -> Result<Response, LlmError>;
}
