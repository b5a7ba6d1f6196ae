//! Task descriptors and their outputs.

use std::sync::Arc;

use serde::Serialize;

use crate::agent::AgentDescriptor;

/// A unit of work assigned to one agent.
///
/// The description can be rewritten with [`prefix_description`] while the
/// task is still owned by the caller. Once the task is moved into a
/// [`Crew`](crate::crew::Crew) it is read-only.
///
/// [`prefix_description`]: TaskDescriptor::prefix_description
#[derive(Debug, Clone, Serialize)]
pub struct TaskDescriptor {
    description: String,
    expected_output: String,
    agent: Arc<AgentDescriptor>,
}

impl TaskDescriptor {
    /// Creates a task assigned to `agent`.
    #[must_use]
    pub fn new(
        description: impl Into<String>,
        expected_output: impl Into<String>,
        agent: Arc<AgentDescriptor>,
    ) -> Self {
        Self {
            description: description.into(),
            expected_output: expected_output.into(),
            agent,
        }
    }

    /// What the agent should do.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// What a complete answer looks like.
    #[must_use]
    pub fn expected_output(&self) -> &str {
        &self.expected_output
    }

    /// The assigned agent.
    #[must_use]
    pub const fn agent(&self) -> &Arc<AgentDescriptor> {
        &self.agent
    }

    /// Prepends `prefix` to the description, leaving the rest unchanged.
    pub fn prefix_description(&mut self, prefix: &str) {
        self.description.insert_str(0, prefix);
    }

    /// Renders the user prompt for this task.
    ///
    /// `context` holds the raw outputs of the stages that ran before this one.
    #[must_use]
    pub fn prompt(&self, context: &[&str]) -> String {
        let mut prompt = format!(
            "Current Task: {}\n\nThis is the expected criteria for your final answer: {}\n\
             You MUST return the actual complete content as the final answer, not a summary.",
            self.description, self.expected_output
        );

        if !context.is_empty() {
            prompt.push_str("\n\nThis is the context you're working with:\n");
            prompt.push_str(&context.join("\n\n----------\n\n"));
        }

        prompt
    }
}

/// The result of running one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskOutput {
    /// The task description as submitted.
    pub description: String,
    /// Role of the agent that produced the output.
    pub agent_role: String,
    /// The agent's final answer.
    pub raw: String,
}

impl std::fmt::Display for TaskOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task() -> TaskDescriptor {
        let agent = Arc::new(AgentDescriptor::new("Writer", "Write", "Writes a lot."));
        TaskDescriptor::new("Write a poem.", "Four lines.", agent)
    }

    #[test]
    fn prefix_keeps_existing_text() {
        let mut task = task();
        task.prefix_description("About the sea. ");
        assert_eq!(task.description(), "About the sea. Write a poem.");
        assert_eq!(task.expected_output(), "Four lines.");
    }

    #[test]
    fn prompt_without_context() {
        let prompt = task().prompt(&[]);
        assert!(prompt.starts_with("Current Task: Write a poem."));
        assert!(prompt.contains("expected criteria for your final answer: Four lines."));
        assert!(!prompt.contains("context you're working with"));
    }

    #[test]
    fn prompt_with_context_appends_previous_outputs() {
        let prompt = task().prompt(&["notes one", "notes two"]);
        assert!(prompt.contains("This is the context you're working with:\nnotes one"));
        assert!(prompt.ends_with("notes two"));
    }

    #[test]
    fn agent_is_shared() {
        let task = task();
        let copy = task.clone();
        assert!(Arc::ptr_eq(task.agent(), copy.agent()));
    }
}
