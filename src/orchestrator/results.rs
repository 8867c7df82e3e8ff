// ABOUTME: TaskResult - the output of one executed task - and the results report.
// ABOUTME: format_results renders a run's results as plain text.

use std::fmt::Write;

use crate::task::Task;

/// The output of one executed task or plan step.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskResult {
    /// The task as executed, with its agent bound.
    pub task: Task,

    /// The agent's answer.
    pub output: String,

    /// Name of the agent that produced the output.
    pub agent: String,
}

/// Render results as the plain-text execution report.
pub fn format_results(results: &[TaskResult]) -> String {
    let mut out = String::from("\n=== EXECUTION RESULTS ===\n\n");
    for (i, result) in results.iter().enumerate() {
        let _ = writeln!(out, "Task {}: {}", i + 1, result.task.description);
        let _ = writeln!(out, "Agent: {}", result.agent);
        let _ = writeln!(out, "Result:\n{}", result.output);
        out.push_str("------------------------\n\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(desc: &str, agent: &str, output: &str) -> TaskResult {
        TaskResult {
            task: Task::new(desc),
            output: output.into(),
            agent: agent.into(),
        }
    }

    #[test]
    fn test_format_results_exact_layout() {
        let report = format_results(&[
            result("Research", "Researcher", "facts"),
            result("Write", "Writer", "prose"),
        ]);

        assert_eq!(
            report,
            "\n=== EXECUTION RESULTS ===\n\n\
             Task 1: Research\nAgent: Researcher\nResult:\nfacts\n------------------------\n\n\
             Task 2: Write\nAgent: Writer\nResult:\nprose\n------------------------\n\n"
        );
    }

    #[test]
    fn test_format_results_preserves_order() {
        let report = format_results(&[result("first", "A", "one"), result("second", "B", "two")]);
        let first = report.find("first").unwrap();
        let second = report.find("second").unwrap();
        assert!(first < second);
        assert!(report.find("one").unwrap() < report.find("two").unwrap());
    }

    #[test]
    fn test_format_results_empty() {
        assert_eq!(format_results(&[]), "\n=== EXECUTION RESULTS ===\n\n");
    }
}
