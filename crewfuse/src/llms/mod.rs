//! LLM backend implementations.
//!
//! Each backend implements [`ChatProvider`](crate::chat::ChatProvider) and is
//! organized into its own submodule.
//!
//! # Available Backends
//!
//! - [`openai`] - OpenAI-compatible chat completions (OpenAI, Ollama `/v1`, vLLM)
//! - [`mock`] - scripted responses for tests and offline runs

mod error;
pub mod mock;
pub mod openai;

pub use error::LlmError;
pub use mock::MockProvider;
pub use openai::{OpenAI, OpenAIConfig};
