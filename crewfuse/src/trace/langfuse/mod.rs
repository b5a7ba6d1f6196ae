//! Langfuse trace collector.
//!
//! Events are buffered in memory and posted as one batch to
//! `POST {host}/api/public/ingestion` on flush. Langfuse upserts traces by
//! ID, so the output update is sent as a second `trace-create` event for the
//! same trace.

mod client;
mod config;
mod types;

pub use client::LangfuseCollector;
pub use config::LangfuseConfig;
