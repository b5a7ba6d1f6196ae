//! Agent descriptors.
//!
//! An [`AgentDescriptor`] is the role configuration handed to the
//! orchestrator: who the agent is (role, backstory), what it is trying to
//! achieve (goal) and a few execution flags. Descriptors are immutable once
//! built; tasks share them through an [`Arc`](std::sync::Arc).
//!
//! # Example
//!
//! ```rust,ignore
//! use crewfuse::agent::AgentDescriptor;
//!
//! let analyst = AgentDescriptor::new(
//!     "Market Analyst",
//!     "Summarize market movements",
//!     "You have covered equity markets for a decade.",
//! )
//! .model("gpt-4o");
//! ```

use std::fmt;

use serde::Serialize;

/// A named role configuration consumed by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentDescriptor {
    role: String,
    goal: String,
    backstory: String,
    allow_delegation: bool,
    verbose: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<String>,
}

impl AgentDescriptor {
    /// Creates a descriptor with delegation disabled and verbose output off.
    #[must_use]
    pub fn new(
        role: impl Into<String>,
        goal: impl Into<String>,
        backstory: impl Into<String>,
    ) -> Self {
        Self {
            role: role.into(),
            goal: goal.into(),
            backstory: backstory.into(),
            allow_delegation: false,
            verbose: false,
            model: None,
        }
    }

    /// Sets whether the agent may delegate work to other agents.
    ///
    /// The sequential orchestrator never delegates; the flag is carried for
    /// orchestrators that do.
    #[must_use]
    pub const fn allow_delegation(mut self, allow: bool) -> Self {
        self.allow_delegation = allow;
        self
    }

    /// Sets verbose mode: task outputs are logged in full at `info` level.
    #[must_use]
    pub const fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Overrides the provider's default model for this agent.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// The agent's role, also used as its display name.
    #[must_use]
    pub fn role(&self) -> &str {
        &self.role
    }

    /// The agent's goal.
    #[must_use]
    pub fn goal(&self) -> &str {
        &self.goal
    }

    /// The agent's backstory.
    #[must_use]
    pub fn backstory(&self) -> &str {
        &self.backstory
    }

    /// Whether delegation is allowed.
    #[must_use]
    pub const fn allows_delegation(&self) -> bool {
        self.allow_delegation
    }

    /// Whether verbose mode is on.
    #[must_use]
    pub const fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// The per-agent model override, if any.
    #[must_use]
    pub fn model_override(&self) -> Option<&str> {
        self.model.as_deref()
    }

    /// Renders the system prompt that frames every task this agent runs.
    #[must_use]
    pub fn system_prompt(&self) -> String {
        format!(
            "You are {}. {}\nYour personal goal is: {}",
            self.role, self.backstory, self.goal
        )
    }
}

impl fmt::Display for AgentDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.role)
    }
}
