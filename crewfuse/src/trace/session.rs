//! Explicit trace sessions.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use super::error::{TraceError, TraceResult};
use super::record::TraceRecord;
use super::SharedTraceCollector;
use crate::error::Result;

/// Handle to one open trace.
///
/// Cloning is cheap; all clones share one [`TraceRecord`], so its output
/// can be set exactly once.
#[derive(Clone)]
pub struct TraceSession {
    collector: SharedTraceCollector,
    trace_id: String,
    record: Arc<Mutex<TraceRecord>>,
}

impl std::fmt::Debug for TraceSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraceSession")
            .field("collector", &self.collector.name())
            .field("record", &*self.lock())
            .finish()
    }
}

impl TraceSession {
    /// Emits the begin event for `record` and returns the session.
    ///
    /// # Errors
    ///
    /// Returns whatever the collector reports for the begin event.
    pub async fn open(collector: SharedTraceCollector, record: TraceRecord) -> TraceResult<Self> {
        collector.begin_trace(&record).await?;
        debug!(trace_id = %record.id, name = %record.name, "trace opened");

        Ok(Self {
            collector,
            trace_id: record.id.clone(),
            record: Arc::new(Mutex::new(record)),
        })
    }

    fn lock(&self) -> MutexGuard<'_, TraceRecord> {
        self.record.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The trace ID.
    #[must_use]
    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    /// Snapshot of the record, including the output once recorded.
    #[must_use]
    pub fn record(&self) -> TraceRecord {
        self.lock().clone()
    }

    /// Whether the output has been recorded.
    #[must_use]
    pub fn has_output(&self) -> bool {
        self.lock().output.is_some()
    }

    /// Records the trace output.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::OutputAlreadyRecorded`] on a second call, or the
    /// collector's error for the update event.
    pub async fn record_output(&self, output: &str) -> TraceResult<()> {
        {
            let mut record = self.lock();
            if record.output.is_some() {
                return Err(TraceError::OutputAlreadyRecorded(self.trace_id.clone()));
            }
            record.output = Some(output.to_owned());
        }
        self.collector.update_trace(&self.trace_id, output).await
    }

    /// Flushes the collector.
    ///
    /// # Errors
    ///
    /// Returns the collector's flush error.
    pub async fn close(self) -> TraceResult<()> {
        self.collector.flush().await?;
        debug!(trace_id = %self.trace_id, "trace flushed");
        Ok(())
    }
}

/// Runs `body` inside a trace session and flushes on every exit path.
///
/// If `body` fails its error is returned and a flush failure is only logged.
/// If `body` succeeds a flush failure is returned instead of the value.
///
/// # Errors
///
/// Returns the begin error, the body error, or the flush error, in that order
/// of precedence.
pub async fn scoped<T, F, Fut>(
    collector: SharedTraceCollector,
    record: TraceRecord,
    body: F,
) -> Result<T>
where
    F: FnOnce(TraceSession) -> Fut + Send,
    Fut: Future<Output = Result<T>> + Send,
    T: Send,
{
    let session = TraceSession::open(collector, record).await?;
    let result = body(session.clone()).await;

    match (result, session.close().await) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(flush_err)) => Err(flush_err.into()),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(flush_err)) => {
            warn!(error = %flush_err, "trace flush failed after run error");
            Err(err)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::clone_on_ref_ptr)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::trace::{MemoryCollector, TraceEvent};

    fn record() -> TraceRecord {
        TraceRecord::new("unit").with_id("t-1").metadata("k", "v")
    }

    #[tokio::test]
    async fn output_can_be_recorded_once() {
        let collector = Arc::new(MemoryCollector::new());
        let session = TraceSession::open(collector.clone(), record()).await.unwrap();

        session.record_output("first").await.unwrap();
        let err = session.clone().record_output("second").await.unwrap_err();
        assert!(matches!(err, TraceError::OutputAlreadyRecorded(id) if id == "t-1"));
        assert!(session.has_output());
        assert_eq!(session.record().output.as_deref(), Some("first"));
        assert_eq!(session.record().metadata.get("k").map(String::as_str), Some("v"));

        session.close().await.unwrap();
        let events = collector.delivered();
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[1], TraceEvent::Update { output, .. } if output == "first"));
    }

    #[tokio::test]
    async fn scoped_flushes_on_success() {
        let collector = Arc::new(MemoryCollector::new());

        let value = scoped(collector.clone(), record(), |session| async move {
            session.record_output("done").await?;
            Ok::<_, Error>(7)
        })
        .await
        .unwrap();

        assert_eq!(value, 7);
        assert_eq!(collector.flush_count(), 1);
        assert!(collector.pending().is_empty());
    }

    #[tokio::test]
    async fn scoped_flushes_on_body_error() {
        let collector = Arc::new(MemoryCollector::new());

        let err = scoped(collector.clone(), record(), |_session| async move {
            Err::<(), _>(Error::agent("boom"))
        })
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Agent(_)));
        assert_eq!(collector.flush_count(), 1);
        assert_eq!(collector.delivered().len(), 1);
    }

    #[tokio::test]
    async fn body_error_wins_over_flush_error() {
        let collector = Arc::new(MemoryCollector::new().fail_flush());

        let err = scoped(collector.clone(), record(), |_session| async move {
            Err::<(), _>(Error::agent("boom"))
        })
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Agent(_)));
        assert_eq!(collector.flush_count(), 1);
    }

    #[tokio::test]
    async fn flush_error_surfaces_after_success() {
        let collector = Arc::new(MemoryCollector::new().fail_flush());

        let err = scoped(collector, record(), |_session| async move { Ok::<_, Error>(()) })
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Trace(TraceError::Network(_))));
    }
}
