//! Per-build execution context.

use super::RunIdentity;
use crate::events::{EventSink, LoggingEventSink};
use serde_json::json;
use std::sync::Arc;
use tracing::{info_span, Span};

/// Context threaded explicitly through every stage of one build.
///
/// Cloning is cheap; clones share the event sink and tracing span.
#[derive(Debug, Clone)]
pub struct RunContext {
    identity: RunIdentity,
    event_sink: Arc<dyn EventSink>,
    span: Span,
}

impl RunContext {
    /// Creates a context that reports events through tracing.
    #[must_use]
    pub fn new(identity: RunIdentity) -> Self {
        Self::with_event_sink(identity, Arc::new(LoggingEventSink::default()))
    }

    /// Creates a context with a specific event sink.
    #[must_use]
    pub fn with_event_sink(identity: RunIdentity, event_sink: Arc<dyn EventSink>) -> Self {
        let span = info_span!(
            "pipeline",
            run_id = %identity.run_id,
            dataset = %identity.dataset_id,
        );
        Self {
            identity,
            event_sink,
            span,
        }
    }

    /// Returns the run identity.
    #[must_use]
    pub fn identity(&self) -> &RunIdentity {
        &self.identity
    }

    /// Returns the tracing span covering the whole build.
    #[must_use]
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Emits an event tagged with the run ID.
    pub fn emit(&self, event_type: &str, data: serde_json::Value) {
        let mut payload = json!({ "run_id": self.identity.run_id.to_string() });
        if let (Some(target), serde_json::Value::Object(extra)) = (payload.as_object_mut(), data) {
            target.extend(extra);
        }
        self.event_sink.emit(event_type, Some(payload));
    }

    /// Emits a stage lifecycle event.
    pub fn emit_stage(&self, event_type: &str, stage: &str) {
        self.emit(event_type, json!({ "stage": stage }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::CollectingEventSink;

    #[test]
    fn test_emit_tags_run_id() {
        let sink = Arc::new(CollectingEventSink::new());
        let identity = RunIdentity::new("GSE1");
        let run_id = identity.run_id.to_string();
        let ctx = RunContext::with_event_sink(identity, sink.clone());

        ctx.emit_stage("stage.started", "extract");
        ctx.emit("pipeline.completed", json!({ "target": "trim" }));

        let events = sink.events();
        assert_eq!(events.len(), 2);
        let first = events[0].1.as_ref().unwrap();
        assert_eq!(first["run_id"], run_id);
        assert_eq!(first["stage"], "extract");
        assert_eq!(events[1].1.as_ref().unwrap()["target"], "trim");
    }

    #[test]
    fn test_clones_share_sink() {
        let sink = Arc::new(CollectingEventSink::new());
        let ctx = RunContext::with_event_sink(RunIdentity::new("GSE1"), sink.clone());
        let clone = ctx.clone();

        clone.emit_stage("stage.skipped", "download");
        assert_eq!(sink.len(), 1);
        assert_eq!(ctx.identity().run_id, clone.identity().run_id);
    }
}
