// ABOUTME: Hierarchical strategy - a manager model assigns agents or plans from a goal.
// ABOUTME: Handles predefined-task assignment and goal decomposition into plan steps.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::engine::{Orchestrator, execute_task};
use super::plan::{parse_plan, planning_prompt, selection_prompt};
use super::{PlanStep, TaskResult};
use crate::agent::{Agent, MatchStrategy, Resolution};
use crate::error::{KickoffError, LlmError, OrchestratorError, PlanError};
use crate::hook::{HookEvent, Unit};
use crate::llm::LanguageModel;
use crate::task::Task;

impl Orchestrator {
    pub(super) async fn run_hierarchical(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<TaskResult>, KickoffError> {
        let Some(manager) = &self.manager else {
            return Err(KickoffError::bare(OrchestratorError::MissingManager));
        };
        if self.roster.is_empty() {
            return Err(KickoffError::bare(OrchestratorError::NoAgents));
        }

        if !self.tasks.is_empty() {
            return self.assign_predefined(manager, cancel).await;
        }

        match self.goal.as_deref().map(str::trim) {
            Some(goal) if !goal.is_empty() => self.run_goal(manager, goal, cancel).await,
            _ => Err(KickoffError::bare(OrchestratorError::NothingToDo)),
        }
    }

    async fn assign_predefined(
        &self,
        manager: &LanguageModel,
        cancel: &CancellationToken,
    ) -> Result<Vec<TaskResult>, KickoffError> {
        let total = self.tasks.len();
        let roster = self.roster.describe();
        let mut results = Vec::with_capacity(total);

        for (index, task) in self.tasks.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(KickoffError::with_results(
                    OrchestratorError::Cancelled,
                    results,
                ));
            }

            let task = if task.agent.is_some() {
                task.clone()
            } else {
                let resolution = match self.select_agent(manager, &roster, task).await {
                    Ok(resolution) => resolution,
                    Err(source) => {
                        return Err(KickoffError::with_results(
                            OrchestratorError::AgentSelection { index, source },
                            results,
                        ));
                    }
                };
                let fallback = resolution.is_fallback();
                let Some(agent) = resolution.into_agent() else {
                    return Err(KickoffError::with_results(
                        OrchestratorError::NoAgents,
                        results,
                    ));
                };

                let bound = task.with_agent(agent);
                self.hooks
                    .fire(&HookEvent::AgentAssigned {
                        index,
                        total,
                        description: bound.description.clone(),
                        agent: bound.agent_name().unwrap_or_default().to_string(),
                        fallback,
                    })
                    .await;
                bound
            };

            self.fire_started(Unit::Task, index, total, &task).await;
            match execute_task(&task, cancel).await {
                Ok(result) => {
                    self.fire_completed(Unit::Task, index, total, &result).await;
                    results.push(result);
                }
                Err(source) => {
                    self.fire_failed(Unit::Task, index, total, &task, &source)
                        .await;
                    return Err(KickoffError::with_results(
                        OrchestratorError::TaskFailed { index, source },
                        results,
                    ));
                }
            }
        }

        Ok(results)
    }

    async fn select_agent(
        &self,
        manager: &LanguageModel,
        roster: &str,
        task: &Task,
    ) -> Result<Resolution, LlmError> {
        let reply = manager.generate(&selection_prompt(roster, task)).await?;
        tracing::debug!(reply = %reply.trim(), "manager selected agent");

        let resolution = self
            .roster
            .resolve(&reply, MatchStrategy::ExactThenContains);
        if let Resolution::FallbackFirst(agent) = &resolution {
            tracing::warn!(
                reply = %reply.trim(),
                agent = %agent.name,
                "could not match manager reply to an agent, using first agent"
            );
        }

        Ok(resolution)
    }

    async fn run_goal(
        &self,
        manager: &LanguageModel,
        goal: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<TaskResult>, KickoffError> {
        if cancel.is_cancelled() {
            return Err(KickoffError::bare(OrchestratorError::Cancelled));
        }

        let plan = self
            .create_plan(manager, goal)
            .await
            .map_err(|e| KickoffError::bare(OrchestratorError::Planning(e)))?;

        tracing::debug!(steps = plan.len(), "plan created");
        self.hooks
            .fire(&HookEvent::PlanCreated {
                goal: goal.to_string(),
                steps: plan.clone(),
            })
            .await;

        let total = plan.len();
        let mut results = Vec::with_capacity(total);
        let mut context = String::new();

        for (index, step) in plan.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(KickoffError::with_results(
                    OrchestratorError::Cancelled,
                    results,
                ));
            }

            let Some(agent) = self.agent_for_step(step) else {
                return Err(KickoffError::with_results(
                    OrchestratorError::NoAgents,
                    results,
                ));
            };
            let task = step_task(step, agent, &context);

            self.fire_started(Unit::Step, index, total, &task).await;
            match execute_task(&task, cancel).await {
                Ok(result) => {
                    self.fire_completed(Unit::Step, index, total, &result).await;
                    context.push_str(&format!(
                        "\n--- {} (by {}) ---\n{}\n",
                        step.task_description, result.agent, result.output
                    ));
                    results.push(result);
                }
                Err(source) => {
                    self.fire_failed(Unit::Step, index, total, &task, &source)
                        .await;
                    return Err(KickoffError::with_results(
                        OrchestratorError::StepFailed {
                            step: index + 1,
                            source,
                        },
                        results,
                    ));
                }
            }
        }

        Ok(results)
    }

    async fn create_plan(
        &self,
        manager: &LanguageModel,
        goal: &str,
    ) -> Result<Vec<PlanStep>, PlanError> {
        let reply = manager
            .generate(&planning_prompt(&self.roster.describe(), goal))
            .await?;
        tracing::debug!(reply_len = reply.len(), "manager returned plan");
        parse_plan(&reply)
    }

    fn agent_for_step(&self, step: &PlanStep) -> Option<Arc<Agent>> {
        let resolution = self.roster.resolve(&step.agent_name, MatchStrategy::Exact);
        if let Resolution::FallbackFirst(agent) = &resolution {
            tracing::warn!(
                requested = %step.agent_name,
                using = %agent.name,
                "agent not found, using first agent"
            );
        }
        resolution.into_agent()
    }
}

/// Build the task for a plan step, appending earlier outputs when requested.
fn step_task(step: &PlanStep, agent: Arc<Agent>, context: &str) -> Task {
    let description = if step.use_context && !context.is_empty() {
        format!(
            "{}\n\nContext from previous tasks:\n{}",
            step.task_description, context
        )
    } else {
        step.task_description.clone()
    };

    let mut task = Task::new(description).agent(agent);
    if !step.expected_output.is_empty() {
        task = task.expected_output(&step.expected_output);
    }
    task
}
