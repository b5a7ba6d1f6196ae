//! Trace records and the events derived from them.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Name, metadata and output of one traced invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceRecord {
    /// Unique trace ID (UUID v4 unless set explicitly).
    pub id: String,
    /// Trace name, e.g. `"crewai_research"`.
    pub name: String,
    /// Free-form string metadata.
    pub metadata: BTreeMap<String, String>,
    /// Stringified result, set once the run finished.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl TraceRecord {
    /// Creates a record with a fresh ID and no metadata.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            metadata: BTreeMap::new(),
            output: None,
        }
    }

    /// Uses a specific trace ID.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Adds one metadata entry.
    #[must_use]
    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// An event buffered by a collector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TraceEvent {
    /// A trace started.
    Begin {
        /// Trace ID.
        trace_id: String,
        /// Trace name.
        name: String,
        /// Trace metadata.
        metadata: BTreeMap<String, String>,
        /// When the event was recorded.
        timestamp: DateTime<Utc>,
    },
    /// A trace received its output.
    Update {
        /// Trace ID.
        trace_id: String,
        /// Stringified output.
        output: String,
        /// When the event was recorded.
        timestamp: DateTime<Utc>,
    },
}

impl TraceEvent {
    /// Builds a begin event stamped now.
    #[must_use]
    pub fn begin(record: &TraceRecord) -> Self {
        Self::Begin {
            trace_id: record.id.clone(),
            name: record.name.clone(),
            metadata: record.metadata.clone(),
            timestamp: Utc::now(),
        }
    }

    /// Builds an update event stamped now.
    #[must_use]
    pub fn update(trace_id: impl Into<String>, output: impl Into<String>) -> Self {
        Self::Update {
            trace_id: trace_id.into(),
            output: output.into(),
            timestamp: Utc::now(),
        }
    }

    /// The trace this event belongs to.
    #[must_use]
    pub fn trace_id(&self) -> &str {
        match self {
            Self::Begin { trace_id, .. } | Self::Update { trace_id, .. } => trace_id,
        }
    }

    /// When the event was recorded.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::Begin { timestamp, .. } | Self::Update { timestamp, .. } => *timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_generates_distinct_ids() {
        let a = TraceRecord::new("run");
        let b = TraceRecord::new("run");
        assert_ne!(a.id, b.id);
        assert!(a.metadata.is_empty());
        assert!(a.output.is_none());
    }

    #[test]
    fn begin_event_copies_record() {
        let record = TraceRecord::new("run")
            .with_id("t-1")
            .metadata("system", "multi-agent");

        let TraceEvent::Begin {
            trace_id,
            name,
            metadata,
            ..
        } = TraceEvent::begin(&record)
        else {
            unreachable!("begin() builds a Begin event");
        };

        assert_eq!(trace_id, "t-1");
        assert_eq!(name, "run");
        assert_eq!(metadata.get("system").map(String::as_str), Some("multi-agent"));
    }

    #[test]
    fn update_event_trace_id() {
        let event = TraceEvent::update("t-2", "done");
        assert_eq!(event.trace_id(), "t-2");
    }
}
