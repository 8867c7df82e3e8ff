// ABOUTME: Hook system for observing orchestration runs.
// ABOUTME: Provides lifecycle events, the Hook trait, a registry and a console progress printer.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::orchestrator::{ExecutionMode, PlanStep};

/// Whether a unit of work came from the task list or from a manager plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Task,
    Step,
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::Task => f.write_str("Task"),
            Unit::Step => f.write_str("Step"),
        }
    }
}

/// Events fired during a run. Indices are 0-based.
#[derive(Debug, Clone)]
pub enum HookEvent {
    /// Fired once when a kickoff begins.
    RunStarted {
        run_id: String,
        mode: ExecutionMode,
        /// Number of predefined tasks (0 in goal mode).
        tasks: usize,
    },

    /// Fired before a task or plan step executes.
    TaskStarted {
        unit: Unit,
        index: usize,
        total: usize,
        description: String,
        /// Bound agent, when known at start.
        agent: Option<String>,
    },

    /// Fired after a task or plan step produced output.
    TaskCompleted {
        unit: Unit,
        index: usize,
        total: usize,
        description: String,
        agent: String,
    },

    /// Fired when a task or plan step failed.
    TaskFailed {
        unit: Unit,
        index: usize,
        total: usize,
        description: String,
        error: String,
    },

    /// Fired when the manager picked an agent for a task.
    AgentAssigned {
        index: usize,
        total: usize,
        description: String,
        agent: String,
        /// True when the reply matched no agent and the first one was used.
        fallback: bool,
    },

    /// Fired when the manager produced a plan for a goal.
    PlanCreated { goal: String, steps: Vec<PlanStep> },

    /// Fired once when a kickoff ends, successfully or not.
    RunFinished {
        run_id: String,
        completed: usize,
        error: Option<String>,
    },
}

/// Trait for implementing hooks.
#[async_trait]
pub trait Hook: Send + Sync {
    /// Called when an event occurs.
    ///
    /// An `Err` is logged and otherwise ignored; hooks cannot stop a run.
    async fn on_event(&self, event: &HookEvent) -> Result<(), anyhow::Error>;

    /// Optional: Filter which events this hook cares about.
    /// Default returns true for all events.
    fn accepts(&self, event: &HookEvent) -> bool {
        let _ = event;
        true
    }
}

/// Registry for managing and firing hooks.
pub struct HookRegistry {
    hooks: RwLock<Vec<Arc<dyn Hook>>>,
}

impl HookRegistry {
    /// Create a new empty hook registry.
    pub fn new() -> Self {
        Self {
            hooks: RwLock::new(Vec::new()),
        }
    }

    /// Register a hook.
    pub async fn register(&self, hook: impl Hook + 'static) {
        self.hooks.write().await.push(Arc::new(hook));
    }

    /// Register a hook wrapped in Arc.
    pub async fn register_arc(&self, hook: Arc<dyn Hook>) {
        self.hooks.write().await.push(hook);
    }

    /// Fire an event to all registered hooks, in registration order.
    pub async fn fire(&self, event: &HookEvent) {
        let hooks = self.hooks.read().await;
        for hook in hooks.iter() {
            if !hook.accepts(event) {
                continue;
            }
            if let Err(e) = hook.on_event(event).await {
                tracing::warn!(error = %e, "hook failed");
            }
        }
    }

    /// Get the number of registered hooks.
    pub async fn len(&self) -> usize {
        self.hooks.read().await.len()
    }

    /// Check if the registry is empty.
    pub async fn is_empty(&self) -> bool {
        self.hooks.read().await.is_empty()
    }

    /// Register a hook that only handles TaskStarted events.
    ///
    /// The callback receives (index, total, description).
    pub async fn on_task_started<F>(&self, f: F)
    where
        F: Fn(usize, usize, &str) + Send + Sync + 'static,
    {
        self.register(TaskStartedHook { callback: f }).await;
    }

    /// Register a hook that only handles TaskCompleted events.
    ///
    /// The callback receives (index, description, agent).
    pub async fn on_task_completed<F>(&self, f: F)
    where
        F: Fn(usize, &str, &str) + Send + Sync + 'static,
    {
        self.register(TaskCompletedHook { callback: f }).await;
    }

    /// Register a hook that only handles PlanCreated events.
    pub async fn on_plan_created<F>(&self, f: F)
    where
        F: Fn(&[PlanStep]) + Send + Sync + 'static,
    {
        self.register(PlanCreatedHook { callback: f }).await;
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}

struct TaskStartedHook<F> {
    callback: F,
}

#[async_trait]
impl<F> Hook for TaskStartedHook<F>
where
    F: Fn(usize, usize, &str) + Send + Sync,
{
    fn accepts(&self, event: &HookEvent) -> bool {
        matches!(event, HookEvent::TaskStarted { .. })
    }

    async fn on_event(&self, event: &HookEvent) -> Result<(), anyhow::Error> {
        if let HookEvent::TaskStarted {
            index,
            total,
            description,
            ..
        } = event
        {
            (self.callback)(*index, *total, description);
        }
        Ok(())
    }
}

struct TaskCompletedHook<F> {
    callback: F,
}

#[async_trait]
impl<F> Hook for TaskCompletedHook<F>
where
    F: Fn(usize, &str, &str) + Send + Sync,
{
    fn accepts(&self, event: &HookEvent) -> bool {
        matches!(event, HookEvent::TaskCompleted { .. })
    }

    async fn on_event(&self, event: &HookEvent) -> Result<(), anyhow::Error> {
        if let HookEvent::TaskCompleted {
            index,
            description,
            agent,
            ..
        } = event
        {
            (self.callback)(*index, description, agent);
        }
        Ok(())
    }
}

struct PlanCreatedHook<F> {
    callback: F,
}

#[async_trait]
impl<F> Hook for PlanCreatedHook<F>
where
    F: Fn(&[PlanStep]) + Send + Sync,
{
    fn accepts(&self, event: &HookEvent) -> bool {
        matches!(event, HookEvent::PlanCreated { .. })
    }

    async fn on_event(&self, event: &HookEvent) -> Result<(), anyhow::Error> {
        if let HookEvent::PlanCreated { steps, .. } = event {
            (self.callback)(steps);
        }
        Ok(())
    }
}

/// Prints human-readable progress lines to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleProgress {
    verbose: bool,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also print plan summaries and fallback notices.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// The line printed for `event`, if any.
    pub fn render(&self, event: &HookEvent) -> Option<String> {
        match event {
            HookEvent::RunStarted {
                mode: ExecutionMode::Parallel,
                tasks,
                ..
            } => Some(format!("\n[Parallel Execution] Starting {} tasks", tasks)),
            HookEvent::RunStarted {
                mode: ExecutionMode::Hierarchical,
                ..
            } => Some("\n[Hierarchical Mode] Manager is planning task execution...".into()),
            HookEvent::RunStarted { .. } => None,
            HookEvent::TaskStarted {
                unit,
                index,
                total,
                description,
                agent,
            } => Some(match (unit, agent) {
                (Unit::Step, Some(agent)) => format!(
                    "\n[Step {}/{}] Agent '{}' executing: {}",
                    index + 1,
                    total,
                    agent,
                    description
                ),
                _ => format!("\n[{} {}/{}] Starting: {}", unit, index + 1, total, description),
            }),
            HookEvent::TaskCompleted {
                unit, index, total, ..
            } => Some(format!("[{} {}/{}] Completed", unit, index + 1, total)),
            HookEvent::TaskFailed {
                unit,
                index,
                total,
                error,
                ..
            } => Some(format!("[{} {}/{}] Failed: {}", unit, index + 1, total, error)),
            HookEvent::AgentAssigned {
                index,
                total,
                description,
                agent,
                fallback,
            } => {
                let mut line = format!(
                    "[Task {}/{}] Manager assigned '{}' for: {}",
                    index + 1,
                    total,
                    agent,
                    description
                );
                if *fallback && self.verbose {
                    line.push_str(" (no name matched, using first agent)");
                }
                Some(line)
            }
            HookEvent::PlanCreated { goal, steps } => {
                let mut line = format!("\n[Goal] {}", goal);
                if self.verbose {
                    line.push_str(&format!("\n[Manager] Created plan with {} tasks", steps.len()));
                }
                Some(line)
            }
            HookEvent::RunFinished { .. } => None,
        }
    }
}

#[async_trait]
impl Hook for ConsoleProgress {
    async fn on_event(&self, event: &HookEvent) -> Result<(), anyhow::Error> {
        if let Some(line) = self.render(event) {
            println!("{}", line);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingHook {
        count: AtomicUsize,
    }

    #[async_trait]
    impl Hook for CountingHook {
        async fn on_event(&self, _event: &HookEvent) -> Result<(), anyhow::Error> {
            self.count.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FailingHook;

    #[async_trait]
    impl Hook for FailingHook {
        async fn on_event(&self, _event: &HookEvent) -> Result<(), anyhow::Error> {
            Err(anyhow::anyhow!("hook exploded"))
        }
    }

    fn started(index: usize) -> HookEvent {
        HookEvent::TaskStarted {
            unit: Unit::Task,
            index,
            total: 3,
            description: format!("task {}", index),
            agent: None,
        }
    }

    #[tokio::test]
    async fn test_registry_fires_all_hooks() {
        let registry = HookRegistry::new();
        let counter = Arc::new(CountingHook {
            count: AtomicUsize::new(0),
        });
        registry.register_arc(counter.clone()).await;
        registry.register_arc(counter.clone()).await;

        registry.fire(&started(0)).await;
        assert_eq!(counter.count.load(Ordering::SeqCst), 2);
        assert_eq!(registry.len().await, 2);
    }

    #[tokio::test]
    async fn test_failing_hook_does_not_stop_others() {
        let registry = HookRegistry::new();
        let counter = Arc::new(CountingHook {
            count: AtomicUsize::new(0),
        });
        registry.register(FailingHook).await;
        registry.register_arc(counter.clone()).await;

        registry.fire(&started(1)).await;
        assert_eq!(counter.count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_closure_hooks_filter_events() {
        let registry = HookRegistry::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        registry
            .on_task_started(move |index, total, desc| {
                sink.lock().unwrap().push(format!("{}/{} {}", index, total, desc));
            })
            .await;

        registry.fire(&started(2)).await;
        registry
            .fire(&HookEvent::RunFinished {
                run_id: "r".into(),
                completed: 0,
                error: None,
            })
            .await;

        assert_eq!(*seen.lock().unwrap(), vec!["2/3 task 2".to_string()]);
    }

    #[tokio::test]
    async fn test_empty_registry() {
        let registry = HookRegistry::default();
        assert!(registry.is_empty().await);
        registry.fire(&started(0)).await;
    }

    #[test]
    fn test_console_progress_lines() {
        let console = ConsoleProgress::new();

        assert_eq!(
            console.render(&started(0)).as_deref(),
            Some("\n[Task 1/3] Starting: task 0")
        );
        assert_eq!(
            console
                .render(&HookEvent::TaskCompleted {
                    unit: Unit::Step,
                    index: 1,
                    total: 2,
                    description: "d".into(),
                    agent: "X".into(),
                })
                .as_deref(),
            Some("[Step 2/2] Completed")
        );
        assert!(
            console
                .render(&HookEvent::RunStarted {
                    run_id: "r".into(),
                    mode: ExecutionMode::Sequential,
                    tasks: 1,
                })
                .is_none()
        );
    }

    #[test]
    fn test_console_progress_step_names_agent() {
        let line = ConsoleProgress::new()
            .render(&HookEvent::TaskStarted {
                unit: Unit::Step,
                index: 0,
                total: 1,
                description: "Research".into(),
                agent: Some("X".into()),
            })
            .unwrap();
        assert_eq!(line, "\n[Step 1/1] Agent 'X' executing: Research");
    }
}
