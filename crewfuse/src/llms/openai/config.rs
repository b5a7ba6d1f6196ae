//! Endpoint settings for the OpenAI-compatible client.

use std::time::Duration;

/// Where and how to reach a chat-completions endpoint.
///
/// The API key is optional: local servers such as Ollama or vLLM accept
/// unauthenticated requests. [`OpenAI::new`](super::OpenAI::new) only
/// insists on a key for the hosted OpenAI API.
#[derive(Clone)]
pub struct OpenAIConfig {
    /// Bearer token, if the endpoint needs one.
    pub api_key: Option<String>,
    /// Endpoint root, without the `/chat/completions` suffix.
    pub base_url: String,
    /// Model used when a request does not name one.
    pub model: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl std::fmt::Debug for OpenAIConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl OpenAIConfig {
    /// The hosted OpenAI API.
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openai.com/v1";
    /// Model used by both research agents unless overridden.
    pub const DEFAULT_MODEL: &'static str = "gpt-4o-mini";
    /// Research answers are long; five minutes per call.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

    /// Hosted OpenAI with the given key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::default().with_api_key(api_key)
    }

    /// A local or self-hosted endpoint that needs no key.
    #[must_use]
    pub fn local(base_url: impl Into<String>) -> Self {
        Self::default().with_base_url(base_url)
    }

    /// Reads `OPENAI_API_KEY`, `OPENAI_BASE_URL` and `OPENAI_MODEL`; unset
    /// variables keep their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self {
            api_key: std::env::var("OPENAI_API_KEY").ok(),
            ..Self::default()
        };
        if let Ok(url) = std::env::var("OPENAI_BASE_URL") {
            config.base_url = url;
        }
        if let Ok(model) = std::env::var("OPENAI_MODEL") {
            config.model = model;
        }
        config
    }

    /// Whether this points at the hosted OpenAI API.
    #[must_use]
    pub fn is_hosted_openai(&self) -> bool {
        self.base_url.trim_end_matches('/') == Self::DEFAULT_BASE_URL
    }

    /// Sets the bearer token.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the endpoint root.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the fallback model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: Self::DEFAULT_BASE_URL.to_owned(),
            model: Self::DEFAULT_MODEL.to_owned(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hosted_by_default() {
        let config = OpenAIConfig::new("sk-test");
        assert!(config.is_hosted_openai());
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.timeout, Duration::from_secs(300));
    }

    #[test]
    fn local_endpoint_has_no_key() {
        let config = OpenAIConfig::local("http://localhost:11434/v1")
            .with_model("llama3.1")
            .with_timeout(Duration::from_secs(60));

        assert!(config.api_key.is_none());
        assert!(!config.is_hosted_openai());
        assert_eq!(config.model, "llama3.1");
    }

    #[test]
    fn debug_hides_key() {
        let rendered = format!("{:?}", OpenAIConfig::new("sk-secret"));
        assert!(!rendered.contains("sk-secret"));
    }
}
