//! Langfuse ingestion client.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::trace::{TraceCollector, TraceError, TraceEvent, TraceRecord, TraceResult};

use super::config::LangfuseConfig;
use super::types::{IngestionBatch, IngestionEvent, IngestionResponse};

/// Buffers trace events and posts them to Langfuse on flush.
#[derive(Debug)]
pub struct LangfuseCollector {
    config: LangfuseConfig,
    client: Client,
    buffer: Mutex<Vec<TraceEvent>>,
}

impl LangfuseCollector {
    /// Creates a collector for the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: LangfuseConfig) -> TraceResult<Self> {
        if config.is_placeholder() {
            warn!(host = %config.host, "Langfuse keys are placeholders; the upload will be rejected");
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(timeout));
        }

        let client = builder
            .build()
            .map_err(|e| TraceError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            config,
            client,
            buffer: Mutex::new(Vec::new()),
        })
    }

    /// Creates a collector from `LANGFUSE_*` environment variables.
    ///
    /// # Errors
    ///
    /// See [`LangfuseCollector::new`].
    pub fn from_env() -> TraceResult<Self> {
        Self::new(LangfuseConfig::from_env())
    }

    /// The configured host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.config.host
    }

    /// Number of buffered events.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.lock().len()
    }

    pub(crate) fn ingestion_url(&self) -> String {
        format!("{}/api/public/ingestion", self.config.host.trim_end_matches('/'))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<TraceEvent>> {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, event: TraceEvent) {
        self.lock().push(event);
    }

    /// Post one batch and check the multi-status answer.
    async fn send(&self, events: &[TraceEvent]) -> TraceResult<()> {
        let batch = IngestionBatch {
            batch: events.iter().map(IngestionEvent::from).collect(),
        };

        let response = self
            .client
            .post(self.ingestion_url())
            .basic_auth(&self.config.public_key, Some(&self.config.secret_key))
            .json(&batch)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(TraceError::http_status(status.as_u16(), body));
        }

        let parsed: IngestionResponse = if body.trim().is_empty() {
            IngestionResponse::default()
        } else {
            serde_json::from_str(&body).map_err(|e| {
                TraceError::internal(format!(
                    "unreadable ingestion response (HTTP {}): {e}: {body}",
                    status.as_u16()
                ))
            })?
        };
        if !parsed.errors.is_empty() {
            return Err(TraceError::Rejected {
                rejected: parsed.errors.len(),
                total: batch.batch.len(),
                messages: parsed.errors.iter().map(|e| e.describe()).collect(),
            });
        }

        debug!(
            status = status.as_u16(),
            accepted = parsed.successes.len(),
            "Langfuse batch delivered"
        );
        Ok(())
    }
}

#[async_trait]
impl TraceCollector for LangfuseCollector {
    async fn begin_trace(&self, record: &TraceRecord) -> TraceResult<()> {
        self.push(TraceEvent::begin(record));
        Ok(())
    }

    async fn update_trace(&self, trace_id: &str, output: &str) -> TraceResult<()> {
        self.push(TraceEvent::update(trace_id, output));
        Ok(())
    }

    async fn flush(&self) -> TraceResult<()> {
        let events = std::mem::take(&mut *self.lock());
        if events.is_empty() {
            debug!("nothing to flush");
            return Ok(());
        }

        debug!(events = events.len(), url = %self.ingestion_url(), "flushing traces");
        let result = self.send(&events).await;
        if let Err(err) = &result {
            warn!(error = %err, dropped = events.len(), "Langfuse flush failed");
        }
        result
    }

    fn name(&self) -> &'static str {
        "langfuse"
    }
}
