//! The effects middleware.
//!
//! Installed into a store like any other middleware. Plain actions pass
//! through untouched; effect actions are normalized once, their payload is
//! run through the composed handler chain synchronously, and the resulting
//! settlement plus the continuation forest are handed to the resolver on a
//! spawned task.

use std::sync::Arc;

use serde_json::Value;
use tokio::runtime::Handle;
use tracing::{debug, trace, warn};

use super::compose::{compose, unhandled_effect};
use super::config::EffectsConfig;
use super::resolver::{DispatchFn, resolve};
use crate::domain::{Action, Dispatched, EffectAction, EffectError, EffectHandle};
use crate::observability::{Counters, EffectCounts};
use crate::ports::{
    DispatchResult, EffectHandler, Middleware, Next, StoreApi, TracingSink, UnhandledSink,
};

/// Outcome of classifying an incoming action.
#[derive(Debug)]
pub enum Classified {
    Plain(Action),
    Effect(EffectAction),
}

/// Decide whether `action` is an effect, converting legacy and JSON shapes
/// into the canonical `EffectAction`.
///
/// Malformed input is an error here, before anything asynchronous starts.
pub fn classify(action: Action, config: &EffectsConfig) -> Result<Classified, EffectError> {
    match action {
        Action::Effect(effect) => Ok(Classified::Effect(effect)),
        Action::Declarative(promise) => {
            if !config.accept_legacy {
                return Ok(Classified::Plain(Action::Plain(promise.action().clone())));
            }
            let effect = promise.to_canonical()?;
            if config.is_effect_tag(effect.tag()) {
                Ok(Classified::Effect(effect))
            } else {
                Ok(Classified::Plain(Action::Plain(effect.describe())))
            }
        }
        Action::Plain(value) => {
            let tag = match value.get("type").and_then(Value::as_str) {
                Some(tag) if config.is_effect_tag(tag) => tag.to_string(),
                _ => return Ok(Classified::Plain(Action::Plain(value))),
            };
            reject_json_steps(&value)?;
            let payload = value.get("payload").cloned().unwrap_or(Value::Null);
            Ok(Classified::Effect(EffectAction::new(payload).with_tag(tag)))
        }
    }
}

/// JSON cannot carry callbacks, so a JSON effect must not declare steps.
fn reject_json_steps(value: &Value) -> Result<(), EffectError> {
    let declared = [
        value.pointer("/meta/steps"),
        value.get("continuations"),
    ];
    for steps in declared.into_iter().flatten() {
        match steps {
            Value::Null => {}
            Value::Array(items) if items.is_empty() => {}
            Value::Array(_) => {
                return Err(EffectError::MalformedAction(
                    "continuation steps in a JSON action cannot carry callbacks".to_string(),
                ));
            }
            other => {
                return Err(EffectError::MalformedAction(format!(
                    "continuation steps must be an array, got {other}"
                )));
            }
        }
    }
    Ok(())
}

/// The installable effects middleware.
///
/// Cheap to clone; clones share handlers, sink and counters.
#[derive(Clone)]
pub struct EffectsMiddleware {
    handlers: Arc<[Arc<dyn EffectHandler>]>,
    sink: Arc<dyn UnhandledSink>,
    config: EffectsConfig,
    counters: Arc<Counters>,
}

impl EffectsMiddleware {
    pub fn new(handlers: Vec<Arc<dyn EffectHandler>>) -> Self {
        Self {
            handlers: handlers.into(),
            sink: Arc::new(TracingSink),
            config: EffectsConfig::default(),
            counters: Arc::new(Counters::default()),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn UnhandledSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_config(mut self, config: EffectsConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &EffectsConfig {
        &self.config
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    pub fn counts(&self) -> EffectCounts {
        self.counters.snapshot()
    }
}

impl Middleware for EffectsMiddleware {
    fn apply(&self, store: Arc<dyn StoreApi>, next: Next) -> Next {
        let counters = Arc::clone(&self.counters);
        let sink = Arc::clone(&self.sink);
        let counted: Arc<dyn UnhandledSink> = Arc::new(move |payload: &Value| {
            counters.unhandled();
            sink.unhandled(payload);
        });
        let chain = compose(&self.handlers, Arc::clone(&store), unhandled_effect(counted));

        let dispatch: DispatchFn = {
            let store = Arc::clone(&store);
            Arc::new(move |action: Action| -> DispatchResult { store.dispatch(action) })
        };
        let config = self.config.clone();
        let counters = Arc::clone(&self.counters);

        Arc::new(move |action: Action| -> DispatchResult {
            let effect = match classify(action, &config) {
                Ok(Classified::Plain(action)) => {
                    trace!(action_type = ?action.action_type(), "forwarding plain action");
                    counters.forwarded();
                    return next(action);
                }
                Ok(Classified::Effect(effect)) => effect,
                Err(err) => {
                    warn!(error = %err, "rejecting malformed effect action");
                    counters.malformed();
                    return Err(err);
                }
            };

            let runtime = Handle::try_current().map_err(|_| EffectError::NoRuntime)?;
            counters.effect();

            let (payload, steps) = effect.into_parts();
            debug!(effect = %payload, steps = steps.len(), "running effect");
            let resolution = chain(payload);
            let task = runtime.spawn(resolve(resolution, steps, Arc::clone(&dispatch)));
            Ok(Dispatched::Effect(EffectHandle::new(task)))
        })
    }
}

/// Build the middleware from an ordered list of handlers.
pub fn effects(handlers: Vec<Arc<dyn EffectHandler>>) -> EffectsMiddleware {
    EffectsMiddleware::new(handlers)
}
