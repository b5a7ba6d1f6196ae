//! Trace reporting for crew runs.
//!
//! A run is reported as one trace: a begin event carrying the trace name and
//! metadata, and a single update carrying the stringified output. Collectors
//! buffer events and deliver them on [`TraceCollector::flush`].
//!
//! There is no ambient "current trace". Callers open a [`TraceSession`]
//! explicitly, pass it to whatever records the output, and close it; the
//! [`scoped`] helper guarantees the flush on every exit path.
//!
//! # Collectors
//!
//! - [`LangfuseCollector`]: batches events to the Langfuse ingestion API.
//! - [`MemoryCollector`]: keeps events in memory (tests, dry runs).
//!
//! # Example
//!
//! ```rust,ignore
//! use crewfuse::trace::{self, LangfuseCollector, TraceRecord};
//!
//! let collector = Arc::new(LangfuseCollector::from_env()?);
//! let record = TraceRecord::new("nightly_digest").metadata("system", "multi-agent");
//!
//! let output = trace::scoped(collector, record, |session| async move {
//!     let output = orchestrator.kickoff(&crew).await?;
//!     session.record_output(&output.to_string()).await?;
//!     Ok(output)
//! })
//! .await?;
//! ```

mod error;
mod langfuse;
mod memory;
mod record;
mod session;

use async_trait::async_trait;

pub use error::{TraceError, TraceResult};
pub use langfuse::{LangfuseCollector, LangfuseConfig};
pub use memory::MemoryCollector;
pub use record::{TraceEvent, TraceRecord};
pub use session::{TraceSession, scoped};

/// A shared, thread-safe [`TraceCollector`] trait object.
pub type SharedTraceCollector = std::sync::Arc<dyn TraceCollector>;

/// Receives trace events and delivers them to a backend.
///
/// Delivery may be deferred until [`flush`](TraceCollector::flush); callers
/// must flush before the process exits.
#[async_trait]
pub trait TraceCollector: Send + Sync {
    /// Record the start of a trace (name and metadata).
    async fn begin_trace(&self, record: &TraceRecord) -> TraceResult<()>;

    /// Record the output of a previously begun trace.
    async fn update_trace(&self, trace_id: &str, output: &str) -> TraceResult<()>;

    /// Deliver every buffered event. Blocks until the backend has answered.
    async fn flush(&self) -> TraceResult<()>;

    /// Backend name used in logs.
    fn name(&self) -> &'static str;
}
