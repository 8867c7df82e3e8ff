// ABOUTME: Agent module - named personas backed by language models.
// ABOUTME: Provides Agent, the AgentRoster used by managers, and per-agent rate limiting.

mod definition;
mod rate_limiter;
mod roster;

pub use definition::Agent;
pub use rate_limiter::RateLimiter;
pub use roster::{AgentRoster, MatchStrategy, Resolution};
