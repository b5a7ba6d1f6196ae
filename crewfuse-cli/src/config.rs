//! Configuration loading for the crewfuse CLI.
//!
//! Settings are resolved from, in increasing priority:
//! 1. Built-in defaults
//! 2. Config file (`~/.crewfuse/config.toml`, or `--config` / `CREWFUSE_CONFIG`)
//! 3. Environment variables (`OPENAI_*`, `LANGFUSE_*`)
//! 4. Command-line flags

use std::path::{Path, PathBuf};
use std::time::Duration;

use crewfuse::llms::OpenAIConfig;
use crewfuse::trace::LangfuseConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Why settings could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// Not TOML, or a key this version does not know.
    #[error("malformed config: {0}")]
    Malformed(#[from] toml::de::Error),
    /// A value is out of range.
    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Result of loading settings.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Contents of the config file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Chat backend settings.
    #[serde(default)]
    pub llm: LlmSection,

    /// Trace backend settings.
    #[serde(default)]
    pub langfuse: LangfuseSection,
}

/// `[llm]` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LlmSection {
    /// API key for the OpenAI-compatible endpoint.
    pub api_key: Option<String>,
    /// Base URL, e.g. `http://localhost:11434/v1` for Ollama.
    pub base_url: Option<String>,
    /// Default model for both agents.
    pub model: Option<String>,
    /// Sampling temperature.
    pub temperature: Option<f32>,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

/// `[langfuse]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LangfuseSection {
    /// Langfuse public key.
    pub public_key: Option<String>,
    /// Langfuse secret key.
    pub secret_key: Option<String>,
    /// Langfuse host.
    pub host: Option<String>,
    /// Set to `false` to keep traces local.
    pub enabled: Option<bool>,
}

/// Flags that take precedence over file and environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// `--model`.
    pub model: Option<String>,
    /// `--no-trace`.
    pub no_trace: bool,
}

/// Fully resolved settings for a run.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Chat backend.
    pub llm: OpenAIConfig,
    /// Sampling temperature, if configured.
    pub temperature: Option<f32>,
    /// Trace backend.
    pub langfuse: LangfuseConfig,
    /// Whether traces are sent to Langfuse.
    pub tracing_enabled: bool,
}

impl Settings {
    /// Resolves settings from a parsed file, an environment lookup and flags.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for a temperature outside
    /// `0.0..=2.0`.
    pub fn resolve<E>(file: FileConfig, env: E, overrides: &Overrides) -> ConfigResult<Self>
    where
        E: Fn(&str) -> Option<String>,
    {
        let FileConfig { llm, langfuse } = file;

        let mut openai = OpenAIConfig {
            api_key: env("OPENAI_API_KEY").or(llm.api_key),
            ..OpenAIConfig::default()
        };
        if let Some(url) = env("OPENAI_BASE_URL").or(llm.base_url) {
            openai.base_url = url;
        }
        if let Some(model) = overrides.model.clone().or_else(|| env("OPENAI_MODEL")).or(llm.model) {
            openai.model = model;
        }
        if let Some(secs) = llm.timeout_secs {
            openai = openai.with_timeout(Duration::from_secs(secs));
        }

        if let Some(t) = llm.temperature
            && !(0.0..=2.0).contains(&t)
        {
            return Err(ConfigError::InvalidValue(format!(
                "llm.temperature must be between 0.0 and 2.0, got {t}"
            )));
        }

        let mut trace = LangfuseConfig::default();
        if let Some(key) = env("LANGFUSE_PUBLIC_KEY").or(langfuse.public_key) {
            trace.public_key = key;
        }
        if let Some(key) = env("LANGFUSE_SECRET_KEY").or(langfuse.secret_key) {
            trace.secret_key = key;
        }
        if let Some(host) = env("LANGFUSE_HOST").or(langfuse.host) {
            trace.host = host;
        }

        Ok(Self {
            llm: openai,
            temperature: llm.temperature,
            langfuse: trace,
            tracing_enabled: langfuse.enabled.unwrap_or(true) && !overrides.no_trace,
        })
    }
}

/// Get the default config directory path.
#[must_use]
pub fn default_config_dir() -> PathBuf {
    dirs_next::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".crewfuse")
}

/// Get the default config file path.
#[must_use]
pub fn config_path() -> PathBuf {
    default_config_dir().join("config.toml")
}

/// Parse config file contents.
///
/// # Errors
///
/// Returns a parse error for malformed TOML or unknown keys.
pub fn parse_config(content: &str) -> ConfigResult<FileConfig> {
    Ok(toml::from_str(content)?)
}

/// Load configuration from a specific path. A missing file yields defaults.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub async fn load_config_from(path: &Path) -> ConfigResult<FileConfig> {
    if !path.exists() {
        info!(path = %path.display(), "config file not found, using defaults");
        return Ok(FileConfig::default());
    }

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    let config = parse_config(&content)?;
    debug!(path = %path.display(), "loaded config file");

    Ok(config)
}

/// Load the file at `path` (or the default path) and resolve it against the
/// process environment and `overrides`.
///
/// # Errors
///
/// See [`load_config_from`] and [`Settings::resolve`].
pub async fn load_settings(path: Option<&Path>, overrides: &Overrides) -> ConfigResult<Settings> {
    let path = path.map_or_else(config_path, Path::to_path_buf);
    let file = load_config_from(&path).await?;
    Settings::resolve(file, |key| std::env::var(key).ok(), overrides)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_paths() {
        assert!(default_config_dir().ends_with(".crewfuse"));
        assert!(config_path().ends_with("config.toml"));
    }

    #[test]
    fn defaults_without_file_or_env() {
        let settings =
            Settings::resolve(FileConfig::default(), env_of(&[]), &Overrides::default()).unwrap();

        assert_eq!(settings.llm.model, OpenAIConfig::DEFAULT_MODEL);
        assert_eq!(settings.llm.base_url, OpenAIConfig::DEFAULT_BASE_URL);
        assert!(settings.llm.api_key.is_none());
        assert_eq!(settings.langfuse.host, LangfuseConfig::DEFAULT_HOST);
        assert!(settings.langfuse.is_placeholder());
        assert!(settings.tracing_enabled);
    }

    #[test]
    fn file_then_env_then_flags() {
        let file = parse_config(
            r#"
            [llm]
            api_key = "file-key"
            model = "file-model"
            base_url = "http://localhost:11434/v1"
            temperature = 0.2

            [langfuse]
            public_key = "pk-file"
            secret_key = "sk-file"
            host = "http://localhost:3000"
            "#,
        )
        .unwrap();

        let env = env_of(&[("OPENAI_MODEL", "env-model"), ("LANGFUSE_HOST", "https://eu.example")]);
        let settings = Settings::resolve(file.clone(), &env, &Overrides::default()).unwrap();
        assert_eq!(settings.llm.api_key.as_deref(), Some("file-key"));
        assert_eq!(settings.llm.model, "env-model");
        assert_eq!(settings.llm.base_url, "http://localhost:11434/v1");
        assert_eq!(settings.temperature, Some(0.2));
        assert_eq!(settings.langfuse.public_key, "pk-file");
        assert_eq!(settings.langfuse.host, "https://eu.example");

        let overrides = Overrides {
            model: Some("flag-model".into()),
            no_trace: true,
        };
        let settings = Settings::resolve(file, &env, &overrides).unwrap();
        assert_eq!(settings.llm.model, "flag-model");
        assert!(!settings.tracing_enabled);
    }

    #[test]
    fn tracing_can_be_disabled_in_file() {
        let file = parse_config("[langfuse]\nenabled = false\n").unwrap();
        let settings = Settings::resolve(file, env_of(&[]), &Overrides::default()).unwrap();
        assert!(!settings.tracing_enabled);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = parse_config("[llm]\nmodle = \"typo\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Malformed(_)));
    }

    #[test]
    fn out_of_range_temperature_is_rejected() {
        let file = parse_config("[llm]\ntemperature = 3.5\n").unwrap();
        let err = Settings::resolve(file, env_of(&[]), &Overrides::default()).unwrap_err();
        assert!(err.to_string().contains("llm.temperature"));
    }

    #[tokio::test]
    async fn missing_file_yields_defaults() {
        let path = std::env::temp_dir().join("crewfuse-missing-config-does-not-exist.toml");
        let config = load_config_from(&path).await.unwrap();
        assert_eq!(config, FileConfig::default());
    }

    #[tokio::test]
    async fn unreadable_path_names_the_file() {
        let dir = std::env::temp_dir();
        let err = load_config_from(&dir).await.unwrap_err();
        assert!(matches!(err, ConfigError::Read { ref path, .. } if *path == dir));
    }
}
