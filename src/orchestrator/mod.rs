// ABOUTME: Orchestrator module - runs tasks across agents in one of three modes.
// ABOUTME: Provides the engine, manager planning, and result reporting.

mod engine;
mod hierarchical;
mod plan;
mod results;

pub use engine::{ExecutionMode, Orchestrator, OrchestratorBuilder};
pub use plan::{PlanStep, extract_json_array, parse_plan, planning_prompt, selection_prompt};
pub use results::{TaskResult, format_results};
