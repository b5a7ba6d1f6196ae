//! One round trip to a model: the request an agent sends for a task, the
//! answer it gets back, and the [`ChatProvider`] seam in between.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::message::Message;
use crate::usage::Usage;

/// Sampling knobs shared by every task of a run. `None` leaves the backend
/// default in place.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Sampling {
    /// 0.0 to 2.0.
    pub temperature: Option<f32>,
    /// Upper bound on generated tokens.
    pub max_tokens: Option<u32>,
}

/// A chat completion request.
#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    /// Empty means the provider's [`default_model`](ChatProvider::default_model).
    pub model: String,
    /// Conversation so far.
    pub messages: Vec<Message>,
    /// Temperature and token cap.
    pub sampling: Sampling,
}

impl ChatRequest {
    /// Empty conversation for `model`.
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    /// Appends a system message.
    #[must_use]
    pub fn system(mut self, content: impl Into<String>) -> Self {
        self.messages.push(Message::system(content));
        self
    }

    /// Appends a user message.
    #[must_use]
    pub fn user(mut self, content: impl Into<String>) -> Self {
        self.messages.push(Message::user(content));
        self
    }

    /// Replaces the sampling settings.
    #[must_use]
    pub const fn sampling(mut self, sampling: Sampling) -> Self {
        self.sampling = sampling;
        self
    }
}

/// Why generation stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinishReason {
    /// Natural end of the answer.
    Stop,
    /// Hit the token limit; the answer is cut off.
    Length,
    /// Withheld by a moderation filter.
    ContentFilter,
    /// Anything else the backend reports.
    Other(String),
}

impl From<String> for FinishReason {
    fn from(reason: String) -> Self {
        match reason.as_str() {
            "stop" => Self::Stop,
            "length" => Self::Length,
            "content_filter" => Self::ContentFilter,
            _ => Self::Other(reason),
        }
    }
}

/// The model's answer.
#[derive(Debug, Clone, Default)]
pub struct ChatResponse {
    /// Assistant message.
    pub message: Message,
    /// Absent when the backend does not report usage.
    pub usage: Option<Usage>,
    /// Model that actually served the request.
    pub model: Option<String>,
    /// Backend completion id.
    pub id: Option<String>,
    /// Why generation stopped, if reported.
    pub finish_reason: Option<FinishReason>,
}

impl ChatResponse {
    /// An assistant answer with no metadata.
    #[must_use]
    pub fn from_text(content: impl Into<String>) -> Self {
        Self {
            message: Message::assistant(content),
            ..Self::default()
        }
    }

    /// Attaches usage.
    #[must_use]
    pub const fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = Some(usage);
        self
    }

    /// Attaches the serving model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Answer text, if any.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.message.text()
    }

    /// Whether the token limit cut the answer off.
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        self.finish_reason == Some(FinishReason::Length)
    }
}

/// A model backend the orchestrator can talk to.
///
/// Implementations own transport, authentication and mapping failures to
/// [`LlmError`](crate::llms::LlmError).
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Sends one request and waits for the complete answer.
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse>;

    /// Short backend name for logs.
    fn provider_name(&self) -> &'static str;

    /// Model used for requests with an empty `model`.
    fn default_model(&self) -> &str;
}

/// Shared handle to a provider.
pub type SharedChatProvider = Arc<dyn ChatProvider>;
