//! InMemoryStore - 開発・テスト用の host store
//!
//! # 学習ポイント
//! - `Arc::new_cyclic` と Weak による自己参照
//! - ReentrantMutex による dispatch の直列化
//!
//! A minimal Redux-style store: a reducer over JSON state, a middleware
//! pipeline where the first middleware is outermost, and a store API whose
//! `dispatch` re-enters the full pipeline.
//!
//! Dispatch is serialized end to end: a dispatch from another thread, such
//! as a continuation running on a spawned task, waits until the in-flight
//! dispatch has returned through every middleware. Dispatches made from
//! inside the pipeline on the same thread re-enter.

use std::sync::{Arc, Weak};

use parking_lot::{Mutex, ReentrantMutex};
use serde_json::Value;

use crate::domain::{Action, Dispatched, EffectError};
use crate::ports::{DispatchResult, Middleware, Next, StoreApi};

pub struct InMemoryStore {
    state: Arc<Mutex<Value>>,
    dispatch: Next,
    writer: ReentrantMutex<()>,
}

/// What middlewares see. Holds the store weakly so the pipeline it is
/// captured in does not keep the store alive.
struct StoreHandle {
    store: Weak<InMemoryStore>,
}

impl StoreApi for StoreHandle {
    fn dispatch(&self, action: Action) -> DispatchResult {
        match self.store.upgrade() {
            Some(store) => store.dispatch(action),
            None => Err(EffectError::StoreDropped),
        }
    }

    fn get_state(&self) -> Value {
        self.store
            .upgrade()
            .map(|store| store.get_state())
            .unwrap_or(Value::Null)
    }
}

impl InMemoryStore {
    pub fn new<R>(reducer: R, initial: Value, middlewares: Vec<Arc<dyn Middleware>>) -> Arc<Self>
    where
        R: Fn(&Value, &Value) -> Value + Send + Sync + 'static,
    {
        let state = Arc::new(Mutex::new(initial));

        Arc::new_cyclic(|weak: &Weak<Self>| {
            let api: Arc<dyn StoreApi> = Arc::new(StoreHandle {
                store: weak.clone(),
            });

            // Effect actions that get here are reduced as their description.
            let reduce: Next = {
                let state = Arc::clone(&state);
                Arc::new(move |action: Action| -> DispatchResult {
                    let value = action.describe();
                    let mut current = state.lock();
                    *current = reducer(&current, &value);
                    Ok(Dispatched::Value(value))
                })
            };

            let dispatch = middlewares
                .iter()
                .rev()
                .fold(reduce, |next, middleware| middleware.apply(Arc::clone(&api), next));

            Self {
                state,
                dispatch,
                writer: ReentrantMutex::new(()),
            }
        })
    }

    /// Store whose state is the array of every action the reducer saw.
    pub fn recording() -> Arc<Self> {
        Self::recording_with(Vec::new())
    }

    pub fn recording_with(middlewares: Vec<Arc<dyn Middleware>>) -> Arc<Self> {
        Self::new(record, Value::Array(Vec::new()), middlewares)
    }
}

fn record(state: &Value, action: &Value) -> Value {
    let mut log = match state {
        Value::Array(items) => items.clone(),
        _ => Vec::new(),
    };
    log.push(action.clone());
    Value::Array(log)
}

impl StoreApi for InMemoryStore {
    fn dispatch(&self, action: Action) -> DispatchResult {
        let _writer = self.writer.lock();
        (self.dispatch)(action)
    }

    fn get_state(&self) -> Value {
        self.state.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EffectAction;
    use serde_json::json;

    fn counter(state: &Value, action: &Value) -> Value {
        let n = state.as_i64().unwrap_or(0);
        match action["type"].as_str() {
            Some("INCREMENT") => json!(n + 1),
            Some("DECREMENT") => json!(n - 1),
            _ => state.clone(),
        }
    }

    #[test]
    fn reducer_sees_plain_actions() {
        let store = InMemoryStore::new(counter, json!(0), vec![]);
        store.dispatch(Action::plain(json!({ "type": "INCREMENT" }))).unwrap();
        store.dispatch(Action::plain(json!({ "type": "INCREMENT" }))).unwrap();
        store.dispatch(Action::plain(json!({ "type": "DECREMENT" }))).unwrap();
        assert_eq!(store.get_state(), json!(1));
    }

    #[test]
    fn dispatch_returns_the_action() {
        let store = InMemoryStore::recording();
        let dispatched = store.dispatch(Action::plain(json!({ "type": "A" }))).unwrap();
        assert_eq!(dispatched.into_value(), json!({ "type": "A" }));
    }

    #[test]
    fn effect_without_middleware_reaches_reducer_as_description() {
        let store = InMemoryStore::recording();
        store
            .dispatch(EffectAction::new(json!({ "type": "fetch" })).into())
            .unwrap();
        assert_eq!(
            store.get_state(),
            json!([{ "type": "EFFECT", "payload": { "type": "fetch" } }])
        );
    }

    #[test]
    fn first_middleware_is_outermost() {
        fn tagging(tag: &'static str) -> Arc<dyn Middleware> {
            Arc::new(move |_store: Arc<dyn StoreApi>, next: Next| -> Next {
                Arc::new(move |action: Action| -> DispatchResult {
                    let mut value = action.describe();
                    let mut trail = value["trail"].as_array().cloned().unwrap_or_default();
                    trail.push(json!(tag));
                    value["trail"] = Value::Array(trail);
                    next(Action::plain(value))
                })
            })
        }

        let store = InMemoryStore::recording_with(vec![tagging("outer"), tagging("inner")]);
        store.dispatch(Action::plain(json!({ "type": "A" }))).unwrap();

        assert_eq!(
            store.get_state(),
            json!([{ "type": "A", "trail": ["outer", "inner"] }])
        );
    }

    #[test]
    fn middleware_store_api_re_enters_the_pipeline() {
        // Rewrites PING into a PONG dispatched through the store API.
        let pong: Arc<dyn Middleware> = Arc::new(|store: Arc<dyn StoreApi>, next: Next| -> Next {
            Arc::new(move |action: Action| -> DispatchResult {
                if action.action_type() == Some("PING") {
                    store.dispatch(Action::plain(json!({ "type": "PONG" })))
                } else {
                    next(action)
                }
            })
        });

        let store = InMemoryStore::recording_with(vec![pong]);
        store.dispatch(Action::plain(json!({ "type": "PING" }))).unwrap();

        assert_eq!(store.get_state(), json!([{ "type": "PONG" }]));
    }

    #[test]
    fn handle_reports_dropped_store() {
        let handle = StoreHandle { store: Weak::new() };
        let err = handle.dispatch(Action::plain(json!({}))).unwrap_err();
        assert_eq!(err, EffectError::StoreDropped);
        assert_eq!(handle.get_state(), Value::Null);
    }
}
