//! Crewfuse - sequential agent crews with explicit trace sessions.
//!
//! This crate assembles small multi-agent pipelines ("crews"), runs them
//! stage by stage against a chat-completion backend, and reports each run
//! to a trace collector such as Langfuse.

pub mod agent;
pub mod callback;
pub mod chat;
pub mod crew;
pub mod error;
pub mod llms;
pub mod message;
pub mod orchestrator;
pub mod prelude;
pub mod research;
pub mod task;
pub mod trace;
pub mod usage;

pub use error::{Error, LlmError, Result, TraceError};
