//! Core hook trait for crew lifecycle callbacks.
//!
//! # Lifecycle Events
//!
//! 1. **`on_phase`** for each assembly phase (agents, tasks, crew, execution)
//! 2. **`on_crew_start`**
//! 3. For every task, in order: `on_task_start` → *LLM call* → `on_task_end`
//! 4. **`on_crew_end`** with the final output, or **`on_error`** on failure

use std::fmt;

use async_trait::async_trait;

use crate::crew::{Crew, CrewOutput};
use crate::error::Error;
use crate::task::{TaskDescriptor, TaskOutput};

/// A shared, thread-safe [`CrewHooks`] trait object.
pub type SharedCrewHooks = std::sync::Arc<dyn CrewHooks>;

/// Assembly and execution phases of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Agent descriptors are being built.
    CreatingAgents,
    /// Task descriptors are being built.
    CreatingTasks,
    /// Tasks are being ordered into a crew.
    AssemblingCrew,
    /// The crew has been handed to the orchestrator.
    Executing,
}

impl Phase {
    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::CreatingAgents => "Creating agents",
            Self::CreatingTasks => "Creating tasks",
            Self::AssemblingCrew => "Assembling crew",
            Self::Executing => "Executing crew tasks",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Crew-level lifecycle hooks.
///
/// This trait is object-safe and can be used as `Arc<dyn CrewHooks>`.
#[async_trait]
pub trait CrewHooks: Send + Sync {
    /// Called when the pipeline enters a new phase.
    async fn on_phase(&self, _phase: Phase) {}

    /// Called before the first task runs.
    async fn on_crew_start(&self, _crew: &Crew) {}

    /// Called before a task runs. `index` is zero-based.
    async fn on_task_start(&self, _index: usize, _task: &TaskDescriptor) {}

    /// Called after a task produced its output.
    async fn on_task_end(&self, _index: usize, _output: &TaskOutput) {}

    /// Called after the last task.
    async fn on_crew_end(&self, _crew: &Crew, _output: &CrewOutput) {}

    /// Called when the run fails, before the error propagates.
    async fn on_error(&self, _crew: &Crew, _error: &Error) {}
}

/// Hooks that do nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCrewHooks;

#[async_trait]
impl CrewHooks for NoopCrewHooks {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::agent::AgentDescriptor;
    use crate::usage::Usage;

    #[derive(Default)]
    struct Counting {
        phases: AtomicUsize,
        task_ends: AtomicUsize,
    }

    #[async_trait]
    impl CrewHooks for Counting {
        async fn on_phase(&self, _phase: Phase) {
            self.phases.fetch_add(1, Ordering::SeqCst);
        }

        async fn on_task_end(&self, _index: usize, _output: &TaskOutput) {
            self.task_ends.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn overridden_methods_fire_and_defaults_are_noops() {
        let hooks = Counting::default();
        let agent = Arc::new(AgentDescriptor::new("A", "g", "b"));
        let crew = Crew::new("c").agent(agent);
        let output = TaskOutput {
            description: "d".into(),
            agent_role: "A".into(),
            raw: "r".into(),
        };

        hooks.on_phase(Phase::CreatingAgents).await;
        hooks.on_crew_start(&crew).await;
        hooks.on_task_end(0, &output).await;
        hooks
            .on_crew_end(&crew, &CrewOutput::from_tasks(vec![output], Usage::default()))
            .await;

        assert_eq!(hooks.phases.load(Ordering::SeqCst), 1);
        assert_eq!(hooks.task_ends.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn phase_labels() {
        assert_eq!(Phase::AssemblingCrew.to_string(), "Assembling crew");
        assert_eq!(Phase::Executing.label(), "Executing crew tasks");
    }
}
