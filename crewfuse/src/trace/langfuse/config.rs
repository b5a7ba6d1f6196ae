//! Langfuse client configuration.

/// Credentials and endpoint for the Langfuse ingestion API.
#[derive(Clone)]
pub struct LangfuseConfig {
    /// Public key, used as the basic-auth user name.
    pub public_key: String,
    /// Secret key, used as the basic-auth password.
    pub secret_key: String,
    /// Base URL of the Langfuse instance.
    pub host: String,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

impl std::fmt::Debug for LangfuseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LangfuseConfig")
            .field("public_key", &self.public_key)
            .field("secret_key", &"[redacted]")
            .field("host", &self.host)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl LangfuseConfig {
    /// Langfuse cloud.
    pub const DEFAULT_HOST: &'static str = "https://cloud.langfuse.com";
    /// Public key used when none is configured.
    pub const PLACEHOLDER_PUBLIC_KEY: &'static str = "your-public-key";
    /// Secret key used when none is configured.
    pub const PLACEHOLDER_SECRET_KEY: &'static str = "your-secret-key";
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Creates a configuration for the default host.
    #[must_use]
    pub fn new(public_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            public_key: public_key.into(),
            secret_key: secret_key.into(),
            ..Default::default()
        }
    }

    /// Creates configuration from environment variables.
    ///
    /// Reads from:
    /// - `LANGFUSE_PUBLIC_KEY` - Public key (placeholder if unset)
    /// - `LANGFUSE_SECRET_KEY` - Secret key (placeholder if unset)
    /// - `LANGFUSE_HOST` - Base URL (Langfuse cloud if unset)
    ///
    /// Unset keys fall back to placeholders; the backend rejects them at
    /// flush time rather than here.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            public_key: std::env::var("LANGFUSE_PUBLIC_KEY").unwrap_or(defaults.public_key),
            secret_key: std::env::var("LANGFUSE_SECRET_KEY").unwrap_or(defaults.secret_key),
            host: std::env::var("LANGFUSE_HOST").unwrap_or(defaults.host),
            timeout_secs: defaults.timeout_secs,
        }
    }

    /// Whether either key is still a placeholder.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.public_key == Self::PLACEHOLDER_PUBLIC_KEY
            || self.secret_key == Self::PLACEHOLDER_SECRET_KEY
    }

    /// Sets the host.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }
}

impl Default for LangfuseConfig {
    fn default() -> Self {
        Self {
            public_key: Self::PLACEHOLDER_PUBLIC_KEY.to_owned(),
            secret_key: Self::PLACEHOLDER_SECRET_KEY.to_owned(),
            host: Self::DEFAULT_HOST.to_owned(),
            timeout_secs: Some(Self::DEFAULT_TIMEOUT_SECS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_uses_placeholders() {
        let config = LangfuseConfig::default();
        assert_eq!(config.host, "https://cloud.langfuse.com");
        assert!(config.is_placeholder());
    }

    #[test]
    fn real_keys_are_not_placeholders() {
        let config = LangfuseConfig::new("pk-lf-1", "sk-lf-1").with_host("http://localhost:3000");
        assert!(!config.is_placeholder());
        assert_eq!(config.host, "http://localhost:3000");
    }

    #[test]
    fn debug_redacts_secret() {
        let rendered = format!("{:?}", LangfuseConfig::new("pk-lf-1", "sk-lf-1"));
        assert!(rendered.contains("pk-lf-1"));
        assert!(!rendered.contains("sk-lf-1"));
    }
}
