//! Crate-wide error.
//!
//! Backend failures keep their own types ([`LlmError`], [`TraceError`]) and
//! convert into [`Error`] with `?`. Faults in the crew itself are plain
//! messages.

pub use crate::llms::LlmError;
pub use crate::trace::TraceError;

/// Shorthand used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can stop a crew run.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The model backend failed.
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Trace delivery failed.
    #[error("Trace error: {0}")]
    Trace(#[from] TraceError),

    /// An agent produced an unusable answer.
    #[error("Agent error: {0}")]
    Agent(String),

    /// The crew is malformed, e.g. it has no tasks.
    #[error("Crew error: {0}")]
    Crew(String),

    /// Settings could not be loaded or are invalid.
    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// [`Error::Agent`] from a message.
    #[must_use]
    pub fn agent(msg: impl Into<String>) -> Self {
        Self::Agent(msg.into())
    }

    /// [`Error::Crew`] from a message.
    #[must_use]
    pub fn crew(msg: impl Into<String>) -> Self {
        Self::Crew(msg.into())
    }

    /// [`Error::Config`] from a message.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether the failure happened while delivering traces rather than
    /// while running the crew.
    #[must_use]
    pub const fn is_trace(&self) -> bool {
        matches!(self, Self::Trace(_))
    }
}
