// ABOUTME: Manager prompts and execution plan parsing for hierarchical mode.
// ABOUTME: Extracts the JSON plan array from free-form manager replies.

use serde::{Deserialize, Serialize};

use crate::error::PlanError;
use crate::task::Task;

/// One step of a manager-produced plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanStep {
    pub task_description: String,
    pub agent_name: String,
    #[serde(default)]
    pub expected_output: String,
    /// Whether earlier step outputs are appended to this step's description.
    #[serde(default)]
    pub use_context: bool,
}

/// Prompt asking the manager which agent should take `task`.
pub fn selection_prompt(roster: &str, task: &Task) -> String {
    format!(
        "You are a manager responsible for assigning tasks to the best-suited agent.

{}
Task to assign:
Description: {}
Expected Output: {}

Based on the agents' roles and goals, which agent is best suited for this task?
Respond with ONLY the agent's name, nothing else.",
        roster,
        task.description,
        task.expected_output.as_deref().unwrap_or_default()
    )
}

/// Prompt asking the manager to break `goal` into a JSON plan.
pub fn planning_prompt(roster: &str, goal: &str) -> String {
    format!(
        r#"You are a manager responsible for breaking down goals into tasks and assigning them to agents.

{}
Goal to achieve: {}

Create an execution plan to achieve this goal. For each step, specify:
1. The task description
2. Which agent should handle it (use exact agent name)
3. Expected output
4. Whether it needs context from previous tasks (true/false)

Respond in JSON format as an array of steps:
[
  {{
    "task_description": "...",
    "agent_name": "...",
    "expected_output": "...",
    "use_context": false
  }}
]

Keep the plan focused and efficient. Only include necessary steps."#,
        roster, goal
    )
}

/// Slice out the first top-level JSON array in `text`.
///
/// Scans from the first `[` to its matching `]`, skipping brackets that
/// appear inside JSON string literals. Returns `None` when there is no `[`
/// or it is never closed.
pub fn extract_json_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Parse a manager reply into a non-empty plan.
pub fn parse_plan(reply: &str) -> Result<Vec<PlanStep>, PlanError> {
    let json = extract_json_array(reply).ok_or(PlanError::NoPlan)?;
    let plan: Vec<PlanStep> = serde_json::from_str(json)?;
    if plan.is_empty() {
        return Err(PlanError::Empty);
    }
    Ok(plan)
}
