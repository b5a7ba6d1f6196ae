//! In-memory trace collector.
//!
//! Used by tests and by `--no-trace` runs: events are buffered like any other
//! collector and moved to a delivered list on flush.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use super::error::{TraceError, TraceResult};
use super::record::{TraceEvent, TraceRecord};
use super::TraceCollector;

#[derive(Debug, Default)]
struct State {
    pending: Vec<TraceEvent>,
    delivered: Vec<TraceEvent>,
    flush_count: usize,
}

/// Collector that keeps every event in memory.
#[derive(Debug, Default)]
pub struct MemoryCollector {
    state: Mutex<State>,
    fail_flush: bool,
}

impl MemoryCollector {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every flush fail with a network error. Pending events are
    /// dropped, as a real backend would lose them.
    #[must_use]
    pub const fn fail_flush(mut self) -> Self {
        self.fail_flush = true;
        self
    }

    /// Events recorded but not yet flushed.
    #[must_use]
    pub fn pending(&self) -> Vec<TraceEvent> {
        self.lock().pending.clone()
    }

    /// Events delivered by successful flushes, in recording order.
    #[must_use]
    pub fn delivered(&self) -> Vec<TraceEvent> {
        self.lock().delivered.clone()
    }

    /// Number of flush calls, successful or not.
    #[must_use]
    pub fn flush_count(&self) -> usize {
        self.lock().flush_count
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl TraceCollector for MemoryCollector {
    async fn begin_trace(&self, record: &TraceRecord) -> TraceResult<()> {
        self.lock().pending.push(TraceEvent::begin(record));
        Ok(())
    }

    async fn update_trace(&self, trace_id: &str, output: &str) -> TraceResult<()> {
        self.lock().pending.push(TraceEvent::update(trace_id, output));
        Ok(())
    }

    async fn flush(&self) -> TraceResult<()> {
        let mut state = self.lock();
        state.flush_count += 1;
        let events = std::mem::take(&mut state.pending);

        if self.fail_flush {
            return Err(TraceError::network(format!(
                "memory collector configured to fail; dropped {} events",
                events.len()
            )));
        }

        state.delivered.extend(events);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn flush_moves_pending_to_delivered() {
        let collector = MemoryCollector::new();
        let record = TraceRecord::new("run").with_id("t-1");

        collector.begin_trace(&record).await.unwrap();
        collector.update_trace("t-1", "out").await.unwrap();
        assert_eq!(collector.pending().len(), 2);
        assert!(collector.delivered().is_empty());

        collector.flush().await.unwrap();
        assert!(collector.pending().is_empty());
        assert_eq!(collector.delivered().len(), 2);
        assert_eq!(collector.flush_count(), 1);
    }

    #[tokio::test]
    async fn failing_flush_drops_events() {
        let collector = MemoryCollector::new().fail_flush();
        collector
            .begin_trace(&TraceRecord::new("run"))
            .await
            .unwrap();

        let err = collector.flush().await.unwrap_err();
        assert!(err.to_string().contains("dropped 1 events"));
        assert!(collector.pending().is_empty());
        assert!(collector.delivered().is_empty());
    }
}
