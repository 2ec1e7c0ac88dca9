//! Event sink system for observability.
//!
//! Sinks are owned by a [`crate::context::RunContext`] and handed to each
//! stage explicitly; there is no process-wide sink.

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
