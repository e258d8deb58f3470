//! Unhandled sink that remembers what it was given.

use parking_lot::Mutex;
use serde_json::Value;

use crate::ports::UnhandledSink;

#[derive(Debug, Default)]
pub struct CapturingSink {
    payloads: Mutex<Vec<Value>>,
}

impl CapturingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn payloads(&self) -> Vec<Value> {
        self.payloads.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.payloads.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl UnhandledSink for CapturingSink {
    fn unhandled(&self, payload: &Value) {
        self.payloads.lock().push(payload.clone());
    }
}
