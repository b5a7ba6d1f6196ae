//! Common imports for building and running crews.
//!
//! ```rust,ignore
//! use crewfuse::prelude::*;
//! ```

pub use std::sync::Arc;

pub use crate::agent::AgentDescriptor;
pub use crate::callback::{CrewHooks, LoggingHooks, NoopCrewHooks, Phase, SharedCrewHooks};
pub use crate::chat::{
    ChatProvider, ChatRequest, ChatResponse, FinishReason, Sampling, SharedChatProvider,
};
pub use crate::crew::{Crew, CrewOutput, Process};
pub use crate::error::{Error, LlmError, Result, TraceError};
pub use crate::llms::{MockProvider, OpenAI, OpenAIConfig};
pub use crate::message::{Message, Role};
pub use crate::orchestrator::{Orchestrator, SequentialOrchestrator};
pub use crate::research::{build_research_crew, run_research, run_research_crew};
pub use crate::task::{TaskDescriptor, TaskOutput};
pub use crate::trace::{
    LangfuseCollector, LangfuseConfig, MemoryCollector, SharedTraceCollector, TraceCollector,
    TraceRecord, TraceSession,
};
pub use crate::usage::Usage;
