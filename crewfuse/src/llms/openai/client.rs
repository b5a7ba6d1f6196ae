//! HTTP plumbing for the OpenAI-compatible backend.

use std::sync::Arc;

use reqwest::Client;
use reqwest::header::{HeaderMap, RETRY_AFTER};

use crate::chat::ChatRequest;
use crate::error::{LlmError, Result};
use crate::message::Message;

use super::config::OpenAIConfig;
use super::types::{WireErrorEnvelope, WireMessage, WireRequest};

pub(crate) const BACKEND: &str = "openai";

/// Client for `POST {base_url}/chat/completions`.
///
/// Cheap to clone; the HTTP connection pool and the settings are shared.
#[derive(Debug, Clone)]
pub struct OpenAI {
    pub(crate) config: Arc<OpenAIConfig>,
    pub(crate) client: Client,
}

impl OpenAI {
    /// Builds a client for the given endpoint.
    ///
    /// # Errors
    ///
    /// [`LlmError::Unauthorized`] when the hosted OpenAI API is targeted
    /// without a key; [`LlmError::Setup`] when the HTTP client cannot be built.
    pub fn new(config: OpenAIConfig) -> Result<Self> {
        let has_key = config.api_key.as_deref().is_some_and(|k| !k.is_empty());
        if !has_key && config.is_hosted_openai() {
            return Err(LlmError::unauthorized(BACKEND, "OPENAI_API_KEY is not set").into());
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Setup(e.to_string()))?;

        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }

    /// Builds a client from `OPENAI_*` environment variables.
    ///
    /// # Errors
    ///
    /// Same as [`OpenAI::new`].
    pub fn from_env() -> Result<Self> {
        Self::new(OpenAIConfig::from_env())
    }

    /// Endpoint root.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Model used when a request leaves it empty.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.config.model
    }

    pub(crate) fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    /// POST with JSON body; bearer auth only when a key is configured.
    pub(crate) fn post(&self, body: &WireRequest<'_>) -> reqwest::RequestBuilder {
        let req = self.client.post(self.endpoint()).json(body);
        match self.config.api_key.as_deref() {
            Some(key) if !key.is_empty() => req.bearer_auth(key),
            _ => req,
        }
    }

    pub(crate) fn wire_message(msg: &Message) -> WireMessage<'_> {
        WireMessage {
            role: msg.role.as_str(),
            content: msg.content.as_deref(),
        }
    }

    pub(crate) fn wire_request<'a>(&'a self, request: &'a ChatRequest) -> WireRequest<'a> {
        let model = if request.model.is_empty() {
            &self.config.model
        } else {
            &request.model
        };

        WireRequest {
            model,
            messages: request.messages.iter().map(Self::wire_message).collect(),
            max_tokens: request.sampling.max_tokens,
            temperature: request.sampling.temperature,
            stream: false,
        }
    }

    /// Seconds from a numeric `Retry-After` header. HTTP-date values are ignored.
    pub(crate) fn retry_after(headers: &HeaderMap) -> Option<u64> {
        headers
            .get(RETRY_AFTER)?
            .to_str()
            .ok()?
            .trim()
            .parse()
            .ok()
    }

    /// Maps a non-success answer to an [`LlmError`].
    pub(crate) fn classify_failure(status: u16, retry_after: Option<u64>, body: &str) -> LlmError {
        match status {
            429 => return LlmError::rate_limited(BACKEND, retry_after),
            401 | 403 => {
                let reason = serde_json::from_str::<WireErrorEnvelope>(body)
                    .map_or_else(|_| format!("HTTP {status}"), |r| r.error.message);
                return LlmError::unauthorized(BACKEND, reason);
            }
            _ => {}
        }

        match serde_json::from_str::<WireErrorEnvelope>(body) {
            Ok(parsed) => {
                let err = parsed.error;
                LlmError::api(status, err.code.or(err.kind), err.message)
            }
            Err(_) => LlmError::api(status, None, body.trim()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn hosted_api_needs_a_key() {
        let err = OpenAI::new(OpenAIConfig::default()).unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY is not set"));
    }

    #[test]
    fn local_endpoint_runs_without_key() {
        let client = OpenAI::new(OpenAIConfig::local("http://localhost:11434/v1/")).unwrap();
        assert_eq!(
            client.endpoint(),
            "http://localhost:11434/v1/chat/completions"
        );
    }

    #[test]
    fn request_model_overrides_configured_one() {
        let client = OpenAI::new(OpenAIConfig::new("k").with_model("llama3.1")).unwrap();
        assert_eq!(
            client.wire_request(&ChatRequest::default().user("hi")).model,
            "llama3.1"
        );
        assert_eq!(
            client.wire_request(&ChatRequest::new("gpt-4o").user("hi")).model,
            "gpt-4o"
        );
    }

    #[test]
    fn system_message_keeps_its_role() {
        let msg = Message::system("Be brief.");
        let wire = OpenAI::wire_message(&msg);
        assert_eq!(wire.role, "system");
        assert_eq!(wire.content, Some("Be brief."));
    }

    #[test]
    fn retry_after_reads_seconds_only() {
        let mut headers = HeaderMap::new();
        assert_eq!(OpenAI::retry_after(&headers), None);

        headers.insert(RETRY_AFTER, HeaderValue::from_static("12"));
        assert_eq!(OpenAI::retry_after(&headers), Some(12));

        headers.insert(
            RETRY_AFTER,
            HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"),
        );
        assert_eq!(OpenAI::retry_after(&headers), None);
    }

    #[test]
    fn failures_are_classified_by_status() {
        let body = r#"{"error": {"message": "bad key", "type": "invalid_request_error"}}"#;

        assert!(matches!(
            OpenAI::classify_failure(401, None, body),
            LlmError::Unauthorized { ref reason, .. } if reason == "bad key"
        ));
        assert!(matches!(
            OpenAI::classify_failure(429, Some(3), body),
            LlmError::RateLimited { retry_after_secs: Some(3), .. }
        ));
        assert!(matches!(
            OpenAI::classify_failure(400, None, body),
            LlmError::Api { status: 400, code: Some(ref c), .. } if c == "invalid_request_error"
        ));
        assert!(matches!(
            OpenAI::classify_failure(502, None, "upstream down\n"),
            LlmError::Api { status: 502, code: None, ref message } if message == "upstream down"
        ));
    }
}
