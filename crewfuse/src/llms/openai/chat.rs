//! [`ChatProvider`] for [`OpenAI`].

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::chat::{ChatProvider, ChatRequest, ChatResponse, FinishReason};
use crate::error::{LlmError, Result};
use crate::message::{Message, Role};

use super::client::{BACKEND, OpenAI};
use super::types::WireResponse;

impl OpenAI {
    /// Only the first choice is used; the crew never asks for `n > 1`.
    pub(crate) fn into_chat_response(response: WireResponse) -> Result<ChatResponse> {
        let Some(choice) = response.choices.into_iter().next() else {
            return Err(LlmError::malformed("response contained no choices").into());
        };

        Ok(ChatResponse {
            message: Message {
                role: Role::Assistant,
                content: choice.message.content,
            },
            usage: response.usage,
            model: Some(response.model),
            id: Some(response.id),
            finish_reason: choice.finish_reason.map(FinishReason::from),
        })
    }
}

#[async_trait]
impl ChatProvider for OpenAI {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let body = self.wire_request(request);
        debug!(model = %body.model, messages = body.messages.len(), "chat completion");

        let response = self.post(&body).send().await.map_err(LlmError::from)?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = Self::retry_after(response.headers());
            let text = response.text().await.unwrap_or_default();
            let err = Self::classify_failure(status.as_u16(), retry_after, &text);
            warn!(status = status.as_u16(), error = %err, "chat completion failed");
            return Err(err.into());
        }

        let bytes = response.bytes().await.map_err(LlmError::from)?;
        let parsed: WireResponse = serde_json::from_slice(&bytes).map_err(|e| {
            LlmError::malformed(format!(
                "{e} in body: {}",
                String::from_utf8_lossy(&bytes)
            ))
        })?;

        Self::into_chat_response(parsed)
    }

    fn provider_name(&self) -> &'static str {
        BACKEND
    }

    fn default_model(&self) -> &str {
        self.model()
    }
}
