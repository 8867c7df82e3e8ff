// ABOUTME: The orchestration engine - runs tasks sequentially, in parallel, or under a manager.
// ABOUTME: Provides the Orchestrator, its builder, and the sequential and parallel strategies.

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use super::TaskResult;
use crate::agent::{Agent, AgentRoster};
use crate::error::{KickoffError, OrchestratorError, TaskError};
use crate::hook::{HookEvent, HookRegistry, Unit};
use crate::llm::LanguageModel;
use crate::task::Task;

/// How an orchestrator runs its work.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExecutionMode {
    /// One task at a time, in list order.
    #[default]
    Sequential,

    /// Every task at once.
    Parallel,

    /// A manager model assigns agents or decomposes a goal.
    Hierarchical,
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionMode::Sequential => f.write_str("sequential"),
            ExecutionMode::Parallel => f.write_str("parallel"),
            ExecutionMode::Hierarchical => f.write_str("hierarchical"),
        }
    }
}

/// Coordinates agents through a list of tasks or towards a goal.
pub struct Orchestrator {
    pub(super) roster: AgentRoster,
    pub(super) tasks: Vec<Task>,
    pub(super) mode: ExecutionMode,
    pub(super) manager: Option<LanguageModel>,
    pub(super) goal: Option<String>,
    pub(super) hooks: Arc<HookRegistry>,
}

impl Orchestrator {
    /// Start building an orchestrator.
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::default()
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn roster(&self) -> &AgentRoster {
        &self.roster
    }

    pub fn goal(&self) -> Option<&str> {
        self.goal.as_deref()
    }

    pub fn hooks(&self) -> &Arc<HookRegistry> {
        &self.hooks
    }

    /// Run every task to completion.
    pub async fn kickoff(&self) -> Result<Vec<TaskResult>, KickoffError> {
        self.kickoff_with_cancel(&CancellationToken::new()).await
    }

    /// Run under a caller-controlled cancellation token.
    ///
    /// Cancellation is checked before each task (or before each launch in
    /// parallel mode). Model calls already issued run to completion. On
    /// failure the error carries whatever ordered results were produced.
    pub async fn kickoff_with_cancel(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<TaskResult>, KickoffError> {
        let run_id = uuid::Uuid::new_v4().to_string();
        let span = tracing::info_span!("kickoff", run_id = %run_id, mode = %self.mode);

        async {
            tracing::info!(tasks = self.tasks.len(), "run started");
            self.hooks
                .fire(&HookEvent::RunStarted {
                    run_id: run_id.clone(),
                    mode: self.mode,
                    tasks: self.tasks.len(),
                })
                .await;

            let outcome = match self.mode {
                ExecutionMode::Sequential => self.run_sequential(cancel).await,
                ExecutionMode::Parallel => self.run_parallel(cancel).await,
                ExecutionMode::Hierarchical => self.run_hierarchical(cancel).await,
            };

            let (completed, error) = match &outcome {
                Ok(results) => (results.len(), None),
                Err(e) => (e.completed().count(), Some(e.to_string())),
            };
            match &error {
                None => tracing::info!(completed, "run finished"),
                Some(e) => tracing::info!(completed, error = %e, "run failed"),
            }
            self.hooks
                .fire(&HookEvent::RunFinished {
                    run_id: run_id.clone(),
                    completed,
                    error,
                })
                .await;

            outcome
        }
        .instrument(span)
        .await
    }

    async fn run_sequential(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<TaskResult>, KickoffError> {
        let total = self.tasks.len();
        let mut results = Vec::with_capacity(total);

        for (index, task) in self.tasks.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(KickoffError::with_results(
                    OrchestratorError::Cancelled,
                    results,
                ));
            }

            self.fire_started(Unit::Task, index, total, task).await;
            match execute_task(task, cancel).await {
                Ok(result) => {
                    self.fire_completed(Unit::Task, index, total, &result).await;
                    results.push(result);
                }
                Err(source) => {
                    self.fire_failed(Unit::Task, index, total, task, &source)
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

    async fn run_parallel(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<TaskResult>, KickoffError> {
        let total = self.tasks.len();
        let (tx, mut rx) = mpsc::channel(total.max(1));
        let mut handles = Vec::with_capacity(total);
        let mut launched = total;

        for (index, task) in self.tasks.iter().enumerate() {
            if cancel.is_cancelled() {
                launched = index;
                break;
            }

            self.fire_started(Unit::Task, index, total, task).await;

            let tx = tx.clone();
            let task = task.clone();
            let cancel = cancel.clone();
            handles.push(tokio::spawn(async move {
                let outcome = execute_task(&task, &cancel).await;
                let _ = tx.send((index, outcome)).await;
            }));
        }
        drop(tx);

        let mut slots: Vec<Option<TaskResult>> = (0..total).map(|_| None).collect();
        let mut failures = Vec::new();

        while let Some((index, outcome)) = rx.recv().await {
            match outcome {
                Ok(result) => {
                    self.fire_completed(Unit::Task, index, total, &result).await;
                    slots[index] = Some(result);
                }
                Err(source) => {
                    self.fire_failed(Unit::Task, index, total, &self.tasks[index], &source)
                        .await;
                    failures.push(OrchestratorError::TaskFailed { index, source });
                }
            }
        }

        for (index, handle) in handles.into_iter().enumerate() {
            if let Err(e) = handle.await {
                tracing::warn!(index, error = %e, "parallel unit aborted");
                failures.push(OrchestratorError::TaskAborted {
                    index,
                    reason: e.to_string(),
                });
            }
        }

        if launched < total {
            tracing::debug!(launched, "cancelled before every task was launched");
            for failure in &failures {
                tracing::warn!(error = %failure, "failure in launched unit superseded by cancellation");
            }
            slots.truncate(launched);
            return Err(KickoffError {
                source: OrchestratorError::Cancelled,
                partial: slots,
            });
        }

        if !failures.is_empty() {
            failures.sort_by_key(failure_index);
            return Err(KickoffError {
                source: OrchestratorError::Aggregate(failures),
                partial: slots,
            });
        }

        Ok(slots.into_iter().flatten().collect())
    }

    pub(super) async fn fire_started(&self, unit: Unit, index: usize, total: usize, task: &Task) {
        tracing::debug!(%unit, index, description = %task.description, "starting");
        self.hooks
            .fire(&HookEvent::TaskStarted {
                unit,
                index,
                total,
                description: task.description.clone(),
                agent: task.agent_name().map(str::to_string),
            })
            .await;
    }

    pub(super) async fn fire_completed(
        &self,
        unit: Unit,
        index: usize,
        total: usize,
        result: &TaskResult,
    ) {
        tracing::debug!(%unit, index, agent = %result.agent, "completed");
        self.hooks
            .fire(&HookEvent::TaskCompleted {
                unit,
                index,
                total,
                description: result.task.description.clone(),
                agent: result.agent.clone(),
            })
            .await;
    }

    pub(super) async fn fire_failed(
        &self,
        unit: Unit,
        index: usize,
        total: usize,
        task: &Task,
        error: &TaskError,
    ) {
        tracing::debug!(%unit, index, error = %error, "failed");
        self.hooks
            .fire(&HookEvent::TaskFailed {
                unit,
                index,
                total,
                description: task.description.clone(),
                error: error.to_string(),
            })
            .await;
    }
}

impl fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("mode", &self.mode)
            .field("agents", &self.roster.len())
            .field("tasks", &self.tasks.len())
            .field("manager", &self.manager)
            .field("goal", &self.goal)
            .finish_non_exhaustive()
    }
}

/// Run `task` on its bound agent and package the output.
pub(super) async fn execute_task(
    task: &Task,
    cancel: &CancellationToken,
) -> Result<TaskResult, TaskError> {
    let output = task.execute_with_cancel(cancel).await?;
    Ok(TaskResult {
        agent: task.agent_name().unwrap_or_default().to_string(),
        task: task.clone(),
        output,
    })
}

fn failure_index(error: &OrchestratorError) -> usize {
    match error {
        OrchestratorError::TaskFailed { index, .. } | OrchestratorError::TaskAborted { index, .. } => {
            *index
        }
        _ => usize::MAX,
    }
}

/// Builder for [`Orchestrator`].
#[derive(Default)]
pub struct OrchestratorBuilder {
    agents: Vec<Arc<Agent>>,
    tasks: Vec<Task>,
    mode: ExecutionMode,
    manager: Option<LanguageModel>,
    goal: Option<String>,
    hooks: Option<Arc<HookRegistry>>,
}

impl OrchestratorBuilder {
    /// Add an agent to the roster.
    pub fn agent(mut self, agent: Arc<Agent>) -> Self {
        self.agents.push(agent);
        self
    }

    /// Add several agents to the roster.
    pub fn agents(mut self, agents: impl IntoIterator<Item = Arc<Agent>>) -> Self {
        self.agents.extend(agents);
        self
    }

    /// Add a task.
    pub fn task(mut self, task: Task) -> Self {
        self.tasks.push(task);
        self
    }

    /// Add several tasks.
    pub fn tasks(mut self, tasks: impl IntoIterator<Item = Task>) -> Self {
        self.tasks.extend(tasks);
        self
    }

    /// Set the execution mode.
    pub fn mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the manager model used in hierarchical mode.
    pub fn manager(mut self, manager: LanguageModel) -> Self {
        self.manager = Some(manager);
        self
    }

    /// Set the goal decomposed in hierarchical mode when there are no tasks.
    pub fn goal(mut self, goal: impl Into<String>) -> Self {
        self.goal = Some(goal.into());
        self
    }

    /// Use a shared hook registry.
    pub fn hooks(mut self, hooks: Arc<HookRegistry>) -> Self {
        self.hooks = Some(hooks);
        self
    }

    pub fn build(self) -> Orchestrator {
        Orchestrator {
            roster: AgentRoster::new(self.agents),
            tasks: self.tasks,
            mode: self.mode,
            manager: self.manager,
            goal: self.goal,
            hooks: self.hooks.unwrap_or_default(),
        }
    }
}
