//! Hooks that report crew progress through `tracing`.

use async_trait::async_trait;
use tracing::{debug, error, info};

use crate::crew::{Crew, CrewOutput};
use crate::error::Error;
use crate::task::{TaskDescriptor, TaskOutput};

use super::hooks::{CrewHooks, Phase};

/// Emits one structured event per lifecycle step.
///
/// Task outputs are summarized by length only.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingHooks;

#[async_trait]
impl CrewHooks for LoggingHooks {
    async fn on_phase(&self, phase: Phase) {
        debug!(phase = %phase, "pipeline phase");
    }

    async fn on_crew_start(&self, crew: &Crew) {
        info!(
            crew = %crew.name(),
            process = %crew.execution_process(),
            agents = crew.agent_list().len(),
            tasks = crew.task_list().len(),
            "Crew started",
        );
    }

    async fn on_task_start(&self, index: usize, task: &TaskDescriptor) {
        info!(
            task = index + 1,
            agent = %task.agent().role(),
            "Task started",
        );
    }

    async fn on_task_end(&self, index: usize, output: &TaskOutput) {
        info!(
            task = index + 1,
            agent = %output.agent_role,
            chars = output.raw.len(),
            "Task completed",
        );
    }

    async fn on_crew_end(&self, crew: &Crew, output: &CrewOutput) {
        info!(
            crew = %crew.name(),
            prompt_tokens = output.usage.prompt_tokens,
            completion_tokens = output.usage.completion_tokens,
            "Crew completed",
        );
    }

    async fn on_error(&self, crew: &Crew, err: &Error) {
        error!(crew = %crew.name(), error = %err, "Crew failed");
    }
}
