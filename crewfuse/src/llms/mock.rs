//! Mock provider for testing and offline runs.
//!
//! [`MockProvider`] returns predefined responses in sequence and records
//! every request it receives, so tests can assert on the prompts the
//! orchestrator built without making real API calls.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::chat::{ChatProvider, ChatRequest, ChatResponse};
use crate::error::{LlmError, Result};
use crate::usage::Usage;

/// A scripted chat provider.
///
/// Responses cycle when there are more calls than responses.
///
/// # Example
///
/// ```rust,ignore
/// let provider = MockProvider::new(["Research notes", "Final report"]);
/// // First call returns "Research notes", second returns "Final report".
/// ```
#[derive(Debug)]
pub struct MockProvider {
    model_id: String,
    responses: Vec<String>,
    fail_on: Option<usize>,
    usage_per_call: Usage,
    index: AtomicUsize,
    requests: Mutex<Vec<ChatRequest>>,
}

impl MockProvider {
    /// Create a new mock provider with predefined responses.
    #[must_use]
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            model_id: "mock-model".to_owned(),
            responses: responses.into_iter().map(Into::into).collect(),
            fail_on: None,
            usage_per_call: Usage::default(),
            index: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Use a custom model ID.
    #[must_use]
    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    /// Fail the call with the given zero-based index with a network error.
    #[must_use]
    pub const fn fail_on(mut self, call: usize) -> Self {
        self.fail_on = Some(call);
        self
    }

    /// Report this usage on every successful call.
    #[must_use]
    pub const fn with_usage(mut self, usage: Usage) -> Self {
        self.usage_per_call = usage;
        self
    }

    /// Returns a copy of every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of calls made so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.index.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatProvider for MockProvider {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        let index = self.index.fetch_add(1, Ordering::SeqCst);
        if self.fail_on == Some(index) {
            return Err(LlmError::transport(format!("mock failure on call {index}")).into());
        }

        let text = if self.responses.is_empty() {
            String::new()
        } else {
            self.responses[index % self.responses.len()].clone()
        };

        let model = if request.model.is_empty() {
            self.model_id.clone()
        } else {
            request.model.clone()
        };

        Ok(ChatResponse::from_text(text)
            .with_model(model)
            .with_usage(self.usage_per_call))
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }

    fn default_model(&self) -> &str {
        &self.model_id
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cycles_responses_and_records_requests() {
        let provider = MockProvider::new(["first", "second"]);
        let request = ChatRequest::default().user("hi");

        let r1 = provider.chat(&request).await.unwrap();
        let r2 = provider.chat(&request).await.unwrap();
        let r3 = provider.chat(&request).await.unwrap();

        assert_eq!(r1.text(), Some("first"));
        assert_eq!(r2.text(), Some("second"));
        assert_eq!(r3.text(), Some("first"));
        assert_eq!(provider.call_count(), 3);
        assert_eq!(provider.requests().len(), 3);
    }

    #[tokio::test]
    async fn fails_on_requested_call() {
        let provider = MockProvider::new(["ok"]).fail_on(1);
        let request = ChatRequest::default().user("hi");

        assert!(provider.chat(&request).await.is_ok());
        assert!(provider.chat(&request).await.is_err());
        assert!(provider.chat(&request).await.is_ok());
    }

    #[test]
    fn custom_model_id() {
        let provider = MockProvider::new(["x"]).with_model_id("custom-mock");
        assert_eq!(provider.default_model(), "custom-mock");
    }
}
