//! Orchestrators: the execution entry point for crews.
//!
//! [`Orchestrator::kickoff`] takes an assembled [`Crew`] and blocks the
//! caller until every stage has finished. Faults from the model backend
//! propagate unchanged; nothing here retries or returns partial results.
//!
//! [`SequentialOrchestrator`] runs each task through the crew's
//! [`ChatProvider`](crate::chat::ChatProvider):
//!
//! 1. Render the agent's system prompt (role, backstory, goal)
//! 2. Render the task prompt with the outputs of all earlier tasks as context
//! 3. Call the provider with the agent's model override or the provider default
//! 4. Record the answer and move on to the next task
//!
//! The last task's answer becomes [`CrewOutput::raw`].

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{Instrument, debug, info, info_span, warn};

use crate::callback::{NoopCrewHooks, SharedCrewHooks};
use crate::chat::{ChatRequest, Sampling, SharedChatProvider};
use crate::crew::{Crew, CrewOutput, Process};
use crate::error::{Error, Result};
use crate::task::{TaskDescriptor, TaskOutput};
use crate::usage::Usage;

/// Runs an assembled crew to completion.
#[async_trait]
pub trait Orchestrator: Send + Sync {
    /// Execute every task of `crew` and return the combined output.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by crew validation or by any stage.
    async fn kickoff(&self, crew: &Crew) -> Result<CrewOutput>;
}

/// Runs tasks one after another against a single chat provider.
pub struct SequentialOrchestrator {
    provider: SharedChatProvider,
    hooks: SharedCrewHooks,
    sampling: Sampling,
}

impl std::fmt::Debug for SequentialOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequentialOrchestrator")
            .field("provider", &self.provider.provider_name())
            .field("model", &self.provider.default_model())
            .field("sampling", &self.sampling)
            .finish_non_exhaustive()
    }
}

impl SequentialOrchestrator {
    /// Creates an orchestrator with no-op hooks.
    #[must_use]
    pub fn new(provider: SharedChatProvider) -> Self {
        Self {
            provider,
            hooks: Arc::new(NoopCrewHooks),
            sampling: Sampling::default(),
        }
    }

    /// Sets the lifecycle hooks.
    #[must_use]
    pub fn hooks(mut self, hooks: SharedCrewHooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Sets the sampling temperature for every call.
    #[must_use]
    pub const fn temperature(mut self, temperature: f32) -> Self {
        self.sampling.temperature = Some(temperature);
        self
    }

    /// Caps the tokens generated per task.
    #[must_use]
    pub const fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.sampling.max_tokens = Some(max_tokens);
        self
    }

    /// Build the request for one task.
    fn build_request(&self, task: &TaskDescriptor, context: &[&str]) -> ChatRequest {
        let agent = task.agent();
        let model = agent
            .model_override()
            .unwrap_or_else(|| self.provider.default_model());

        ChatRequest::new(model)
            .system(agent.system_prompt())
            .user(task.prompt(context))
            .sampling(self.sampling)
    }

    /// Run a single task and return its output with the usage it consumed.
    async fn run_task(
        &self,
        index: usize,
        task: &TaskDescriptor,
        context: &[&str],
    ) -> Result<(TaskOutput, Usage)> {
        let agent = task.agent();
        let request = self.build_request(task, context);
        debug!(model = %request.model, context_items = context.len(), "calling provider");

        let response = self.provider.chat(&request).await?;
        if response.is_truncated() {
            warn!(agent = %agent.role(), "answer was truncated by the token limit");
        }

        let raw = response.text().unwrap_or_default().trim().to_owned();
        if raw.is_empty() {
            return Err(Error::agent(format!(
                "'{}' returned an empty answer for task {}",
                agent.role(),
                index + 1
            )));
        }

        if agent.is_verbose() {
            info!(agent = %agent.role(), output = %raw, "Task output");
        }

        let output = TaskOutput {
            description: task.description().to_owned(),
            agent_role: agent.role().to_owned(),
            raw,
        };
        Ok((output, response.usage.unwrap_or_default()))
    }

    /// Run every task in order, feeding earlier outputs forward.
    async fn run_sequential(&self, crew: &Crew) -> Result<CrewOutput> {
        let mut outputs: Vec<TaskOutput> = Vec::with_capacity(crew.task_list().len());
        let mut usage = Usage::default();

        for (index, task) in crew.task_list().iter().enumerate() {
            self.hooks.on_task_start(index, task).await;

            let context: Vec<&str> = outputs.iter().map(|o| o.raw.as_str()).collect();
            let span = info_span!("task", index = index + 1, agent = %task.agent().role());
            let (output, task_usage) = self
                .run_task(index, task, &context)
                .instrument(span)
                .await?;

            usage += task_usage;
            self.hooks.on_task_end(index, &output).await;
            outputs.push(output);
        }

        Ok(CrewOutput::from_tasks(outputs, usage))
    }
}

#[async_trait]
impl Orchestrator for SequentialOrchestrator {
    async fn kickoff(&self, crew: &Crew) -> Result<CrewOutput> {
        let result = match crew.validate() {
            Ok(()) => {
                self.hooks.on_crew_start(crew).await;
                match crew.execution_process() {
                    Process::Sequential => self.run_sequential(crew).await,
                }
            }
            Err(err) => Err(err),
        };

        match result {
            Ok(output) => {
                self.hooks.on_crew_end(crew, &output).await;
                Ok(output)
            }
            Err(err) => {
                self.hooks.on_error(crew, &err).await;
                Err(err)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::clone_on_ref_ptr)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::agent::AgentDescriptor;
    use crate::callback::CrewHooks;
    use crate::llms::{LlmError, MockProvider};
    use crate::message::Role;

    fn two_stage_crew() -> Crew {
        let researcher = Arc::new(AgentDescriptor::new("Researcher", "Dig", "Curious."));
        let writer =
            Arc::new(AgentDescriptor::new("Writer", "Write", "Clear.").model("writer-model"));
        Crew::new("pair")
            .agents([Arc::clone(&researcher), Arc::clone(&writer)])
            .task(TaskDescriptor::new("Research ducks.", "Notes.", researcher))
            .task(TaskDescriptor::new("Write about ducks.", "Essay.", writer))
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    impl Recorder {
        fn push(&self, event: String) {
            self.0.lock().unwrap().push(event);
        }

        fn events(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CrewHooks for Recorder {
        async fn on_crew_start(&self, crew: &Crew) {
            self.push(format!("start:{}", crew.name()));
        }

        async fn on_task_start(&self, index: usize, _task: &TaskDescriptor) {
            self.push(format!("task_start:{index}"));
        }

        async fn on_task_end(&self, index: usize, output: &TaskOutput) {
            self.push(format!("task_end:{index}:{}", output.raw));
        }

        async fn on_crew_end(&self, _crew: &Crew, output: &CrewOutput) {
            self.push(format!("end:{}", output.raw));
        }

        async fn on_error(&self, _crew: &Crew, _error: &Error) {
            self.push("error".to_owned());
        }
    }

    #[tokio::test]
    async fn runs_tasks_in_order_and_passes_context() {
        let provider = Arc::new(
            MockProvider::new(["duck notes", "duck essay"]).with_usage(Usage::new(10, 4)),
        );
        let orchestrator = SequentialOrchestrator::new(provider.clone()).temperature(0.3);

        let output = orchestrator.kickoff(&two_stage_crew()).await.unwrap();

        assert_eq!(output.raw, "duck essay");
        assert_eq!(output.tasks_output[0].agent_role, "Researcher");
        assert_eq!(output.tasks_output[1].agent_role, "Writer");
        assert_eq!(output.usage, Usage::new(20, 8));

        let requests = provider.requests();
        assert_eq!(requests.len(), 2);

        // Research stage: provider default model, no context.
        assert_eq!(requests[0].model, "mock-model");
        assert_eq!(requests[0].messages[0].role, Role::System);
        assert!(requests[0].messages[0].text().unwrap().starts_with("You are Researcher."));
        assert!(!requests[0].messages[1].text().unwrap().contains("duck notes"));

        // Writing stage: agent override, research output as context.
        assert_eq!(requests[1].model, "writer-model");
        assert!(requests[1].messages[1].text().unwrap().contains("duck notes"));
        assert_eq!(requests[1].sampling.temperature, Some(0.3));
    }

    #[tokio::test]
    async fn hooks_fire_in_lifecycle_order() {
        let provider = Arc::new(MockProvider::new(["a", "b"]));
        let hooks = Arc::new(Recorder::default());
        let orchestrator = SequentialOrchestrator::new(provider).hooks(hooks.clone());

        orchestrator.kickoff(&two_stage_crew()).await.unwrap();

        assert_eq!(
            hooks.events(),
            [
                "start:pair",
                "task_start:0",
                "task_end:0:a",
                "task_start:1",
                "task_end:1:b",
                "end:b"
            ]
        );
    }

    #[tokio::test]
    async fn provider_fault_propagates_and_stops_the_pipeline() {
        let provider = Arc::new(MockProvider::new(["a", "b"]).fail_on(0));
        let hooks = Arc::new(Recorder::default());
        let orchestrator = SequentialOrchestrator::new(provider.clone()).hooks(hooks.clone());

        let err = orchestrator.kickoff(&two_stage_crew()).await.unwrap_err();

        assert!(matches!(err, Error::Llm(LlmError::Transport(_))));
        assert_eq!(provider.call_count(), 1);
        assert_eq!(hooks.events(), ["start:pair", "task_start:0", "error"]);
    }

    #[tokio::test]
    async fn empty_answer_is_an_error() {
        let provider = Arc::new(MockProvider::new(["   "]));
        let orchestrator = SequentialOrchestrator::new(provider);

        let err = orchestrator.kickoff(&two_stage_crew()).await.unwrap_err();
        assert!(err.to_string().contains("empty answer for task 1"));
    }

    #[tokio::test]
    async fn invalid_crew_never_reaches_the_provider() {
        let provider = Arc::new(MockProvider::new(["a"]));
        let hooks = Arc::new(Recorder::default());
        let orchestrator = SequentialOrchestrator::new(provider.clone()).hooks(hooks.clone());

        let err = orchestrator.kickoff(&Crew::new("empty")).await.unwrap_err();

        assert!(matches!(err, Error::Crew(_)));
        assert_eq!(provider.call_count(), 0);
        assert_eq!(hooks.events(), ["error"]);
    }
}
