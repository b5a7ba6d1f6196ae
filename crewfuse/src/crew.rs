//! Crews: ordered task pipelines and their outputs.
//!
//! A [`Crew`] pairs an ordered list of [`TaskDescriptor`]s with the agents
//! they reference and the [`Process`] that runs them. Running a crew is the
//! job of an [`Orchestrator`](crate::orchestrator::Orchestrator).
//!
//! # Example
//!
//! ```rust,ignore
//! use crewfuse::prelude::*;
//!
//! let crew = Crew::new("research")
//!     .agents([Arc::clone(&researcher), Arc::clone(&writer)])
//!     .tasks([research_task, writing_task])
//!     .process(Process::Sequential);
//!
//! let output = orchestrator.kickoff(&crew).await?;
//! println!("{output}");
//! ```

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::agent::AgentDescriptor;
use crate::error::{Error, Result};
use crate::task::{TaskDescriptor, TaskOutput};
use crate::usage::Usage;

/// How a crew's tasks are executed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum Process {
    /// Tasks run one after another in declaration order; each task sees the
    /// outputs of the tasks before it.
    #[default]
    Sequential,
}

impl fmt::Display for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequential => f.write_str("sequential"),
        }
    }
}

/// An ordered collection of tasks with their agents.
#[derive(Debug, Clone, Serialize)]
pub struct Crew {
    name: String,
    agents: Vec<Arc<AgentDescriptor>>,
    tasks: Vec<TaskDescriptor>,
    process: Process,
}

impl Crew {
    /// Creates an empty sequential crew.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            agents: Vec::new(),
            tasks: Vec::new(),
            process: Process::Sequential,
        }
    }

    /// Adds one agent.
    #[must_use]
    pub fn agent(mut self, agent: Arc<AgentDescriptor>) -> Self {
        self.agents.push(agent);
        self
    }

    /// Adds several agents.
    #[must_use]
    pub fn agents(mut self, agents: impl IntoIterator<Item = Arc<AgentDescriptor>>) -> Self {
        self.agents.extend(agents);
        self
    }

    /// Appends one task. Tasks run in the order they are added.
    #[must_use]
    pub fn task(mut self, task: TaskDescriptor) -> Self {
        self.tasks.push(task);
        self
    }

    /// Appends several tasks.
    #[must_use]
    pub fn tasks(mut self, tasks: impl IntoIterator<Item = TaskDescriptor>) -> Self {
        self.tasks.extend(tasks);
        self
    }

    /// Sets the execution process.
    #[must_use]
    pub const fn process(mut self, process: Process) -> Self {
        self.process = process;
        self
    }

    /// The crew's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The registered agents.
    #[must_use]
    pub fn agent_list(&self) -> &[Arc<AgentDescriptor>] {
        &self.agents
    }

    /// The tasks in execution order.
    #[must_use]
    pub fn task_list(&self) -> &[TaskDescriptor] {
        &self.tasks
    }

    /// The execution process.
    #[must_use]
    pub const fn execution_process(&self) -> Process {
        self.process
    }

    /// Checks that the crew can run.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Crew`] if the crew has no tasks, or if a task is
    /// assigned to an agent that was not registered with the crew.
    pub fn validate(&self) -> Result<()> {
        if self.tasks.is_empty() {
            return Err(Error::crew(format!("crew '{}' has no tasks", self.name)));
        }

        for (index, task) in self.tasks.iter().enumerate() {
            let registered = self.agents.iter().any(|a| Arc::ptr_eq(a, task.agent()));
            if !registered {
                return Err(Error::crew(format!(
                    "task {} is assigned to '{}', which is not a member of crew '{}'",
                    index + 1,
                    task.agent().role(),
                    self.name
                )));
            }
        }

        Ok(())
    }
}

/// The result of a crew run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrewOutput {
    /// Output of the final task.
    pub raw: String,
    /// Output of every task, in execution order.
    pub tasks_output: Vec<TaskOutput>,
    /// Token usage summed over all LLM calls.
    pub usage: Usage,
}

impl CrewOutput {
    /// Builds the output from per-task results; `raw` is the last task's answer.
    #[must_use]
    pub fn from_tasks(tasks_output: Vec<TaskOutput>, usage: Usage) -> Self {
        let raw = tasks_output
            .last()
            .map(|t| t.raw.clone())
            .unwrap_or_default();
        Self {
            raw,
            tasks_output,
            usage,
        }
    }
}

impl fmt::Display for CrewOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
