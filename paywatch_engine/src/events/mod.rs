//! Application callbacks.
//!
//! The orchestrator reports what it sees through a set of optional async hooks, one per event type. See
//! [`EventHooks`] for how to register them.
mod event_types;
mod hooks;

pub use event_types::*;
pub use hooks::{EventHooks, Handler};
