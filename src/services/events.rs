// Event Sink
// Seam between services and whatever transport carries events to the UI

use serde::Serialize;
use serde_json::Value;

/// Event emitted whenever the build sequence changes state
pub const BUILD_STATUS_EVENT: &str = "build_status";

/// Event carrying a log record mirrored to the UI
pub const LOG_EVENT: &str = "log";

pub trait EventSink: Send + Sync {
    fn emit(&self, event: &str, payload: Value);
}

/// Sink that discards everything; used where no transport is attached
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn emit(&self, _event: &str, _payload: Value) {}
}

/// Serialize a payload and hand it to the sink; serialization failures are
/// dropped since events are advisory
pub fn emit_event<T: Serialize>(sink: &dyn EventSink, event: &str, payload: &T) {
    if let Ok(value) = serde_json::to_value(payload) {
        sink.emit(event, value);
    }
}
