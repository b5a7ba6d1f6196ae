//! Lifecycle hooks for crew runs.
//!
//! [`CrewHooks`] observes a run from assembly to completion. Every method has
//! a no-op default, so implementations override only what they need.
//!
//! - [`NoopCrewHooks`]: ignores everything.
//! - [`LoggingHooks`]: emits structured `tracing` events.

mod hooks;
mod logging;

pub use hooks::{CrewHooks, NoopCrewHooks, Phase, SharedCrewHooks};
pub use logging::LoggingHooks;
