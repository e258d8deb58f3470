//! UnhandledSink port - where unclaimed effect payloads are reported.

use serde_json::Value;
use tracing::warn;

/// UnhandledSink receives every payload no handler claimed.
///
/// It is set once, when the middleware is built.
pub trait UnhandledSink: Send + Sync {
    fn unhandled(&self, payload: &Value);
}

impl<F> UnhandledSink for F
where
    F: Fn(&Value) + Send + Sync,
{
    fn unhandled(&self, payload: &Value) {
        self(payload)
    }
}

/// Default sink: a `warn` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl UnhandledSink for TracingSink {
    fn unhandled(&self, payload: &Value) {
        warn!(effect = %payload, "unhandled effect");
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl UnhandledSink for NoopSink {
    fn unhandled(&self, _payload: &Value) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    #[test]
    fn closures_are_sinks() {
        let seen = Mutex::new(Vec::new());
        let sink = |payload: &Value| seen.lock().unwrap().push(payload.clone());

        sink.unhandled(&json!({ "type": "lost" }));
        NoopSink.unhandled(&json!({ "type": "ignored" }));

        assert_eq!(*seen.lock().unwrap(), vec![json!({ "type": "lost" })]);
    }
}
