//! Failures talking to a chat-completion backend.
//!
//! [`LlmError`] is folded into the crate error as `Error::Llm`. The variants
//! follow what the orchestrator can tell apart: bad credentials, throttling,
//! an API-level refusal, a response it cannot read, and transport trouble.

/// Error raised by a [`ChatProvider`](crate::chat::ChatProvider).
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum LlmError {
    /// The backend refused the credentials, or none were configured.
    #[error("{backend}: unauthorized ({reason})")]
    Unauthorized {
        /// Backend name, e.g. `openai`.
        backend: String,
        /// What was wrong with the credentials.
        reason: String,
    },

    /// The backend throttled the request (HTTP 429).
    #[error("{backend}: rate limited{}", retry_hint(*retry_after_secs))]
    RateLimited {
        /// Backend name.
        backend: String,
        /// Value of the `Retry-After` header, when it was a number of seconds.
        retry_after_secs: Option<u64>,
    },

    /// Any other non-success answer from the API.
    #[error("HTTP {status}{}: {message}", code.as_deref().map(|c| format!(" [{c}]")).unwrap_or_default())]
    Api {
        /// HTTP status code.
        status: u16,
        /// Machine-readable code or type from the error body.
        code: Option<String>,
        /// Error message, or the raw body when it was not JSON.
        message: String,
    },

    /// The response arrived but could not be interpreted.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The request did not complete within the client timeout.
    #[error("request timed out")]
    Timeout,

    /// Connection or protocol failure below HTTP.
    #[error("transport error: {0}")]
    Transport(String),

    /// The client could not be set up.
    #[error("client setup failed: {0}")]
    Setup(String),
}

fn retry_hint(secs: Option<u64>) -> String {
    secs.map(|s| format!(", retry after {s}s"))
        .unwrap_or_default()
}

impl LlmError {
    /// Credentials missing or rejected.
    #[must_use]
    pub fn unauthorized(backend: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unauthorized {
            backend: backend.into(),
            reason: reason.into(),
        }
    }

    /// Throttled, with an optional server-suggested delay.
    #[must_use]
    pub fn rate_limited(backend: impl Into<String>, retry_after_secs: Option<u64>) -> Self {
        Self::RateLimited {
            backend: backend.into(),
            retry_after_secs,
        }
    }

    /// Non-success API answer.
    #[must_use]
    pub fn api(status: u16, code: Option<String>, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            code,
            message: message.into(),
        }
    }

    /// Unreadable response.
    #[must_use]
    pub fn malformed(detail: impl Into<String>) -> Self {
        Self::MalformedResponse(detail.into())
    }

    /// Transport failure.
    #[must_use]
    pub fn transport(detail: impl Into<String>) -> Self {
        Self::Transport(detail.into())
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::MalformedResponse(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_names_backend() {
        let err = LlmError::unauthorized("openai", "invalid key");
        assert_eq!(err.to_string(), "openai: unauthorized (invalid key)");
    }

    #[test]
    fn rate_limit_mentions_delay_when_known() {
        assert_eq!(
            LlmError::rate_limited("openai", Some(20)).to_string(),
            "openai: rate limited, retry after 20s"
        );
        assert_eq!(
            LlmError::rate_limited("openai", None).to_string(),
            "openai: rate limited"
        );
    }

    #[test]
    fn api_error_display() {
        let err = LlmError::api(400, Some("context_length_exceeded".into()), "too long");
        assert_eq!(err.to_string(), "HTTP 400 [context_length_exceeded]: too long");
        assert_eq!(
            LlmError::api(502, None, "bad gateway").to_string(),
            "HTTP 502: bad gateway"
        );
    }
}
