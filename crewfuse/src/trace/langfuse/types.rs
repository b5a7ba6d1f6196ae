//! Langfuse ingestion API types.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

use crate::trace::TraceEvent;

/// Request body for `POST /api/public/ingestion`.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct IngestionBatch {
    pub batch: Vec<IngestionEvent>,
}

/// One event in an ingestion batch.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct IngestionEvent {
    /// Event ID, distinct from the trace ID.
    pub id: String,
    pub timestamp: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub body: TraceBody,
}

/// Body of a `trace-create` event. Absent fields are left untouched by the
/// upsert.
#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct TraceBody {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

/// Multi-status response of the ingestion endpoint.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct IngestionResponse {
    #[serde(default)]
    pub successes: Vec<IgnoredAny>,
    #[serde(default)]
    pub errors: Vec<IngestionFailure>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IngestionFailure {
    /// Missing when the endpoint cannot attribute the failure to an event.
    #[serde(default)]
    pub id: String,
    pub status: u16,
    #[serde(default)]
    pub message: Option<String>,
}

impl IngestionFailure {
    /// One-line description for error reports.
    pub fn describe(&self) -> String {
        let id = if self.id.is_empty() { "?" } else { &self.id };
        match &self.message {
            Some(message) => format!("{id} ({}): {message}", self.status),
            None => format!("{id} ({})", self.status),
        }
    }
}

fn rfc3339(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl From<&TraceEvent> for IngestionEvent {
    fn from(event: &TraceEvent) -> Self {
        let body = match event {
            TraceEvent::Begin {
                trace_id,
                name,
                metadata,
                timestamp,
            } => TraceBody {
                id: trace_id.clone(),
                timestamp: Some(rfc3339(*timestamp)),
                name: Some(name.clone()),
                metadata: Some(metadata.clone()),
                output: None,
            },
            TraceEvent::Update {
                trace_id, output, ..
            } => TraceBody {
                id: trace_id.clone(),
                output: Some(output.clone()),
                ..TraceBody::default()
            },
        };

        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: rfc3339(event.timestamp()),
            event_type: "trace-create".to_owned(),
            body,
        }
    }
}
