//! Action model: plain actions, effect actions, and what dispatch returns.

use serde_json::{Value, json};
use tokio::task::JoinHandle;

use super::continuation::{ContinuationStep, OnFailure, OnSuccess};
use super::declarative::DeclarativePromise;
use super::errors::EffectError;

/// Canonical discriminator for effect actions.
pub const EFFECT: &str = "EFFECT";

/// Discriminator used by composed effect action creators.
pub const EFFECT_COMPOSE: &str = "EFFECT_COMPOSE";

/// Anything that can be dispatched into the store.
///
/// The variant is the action kind. `Declarative` is the legacy builder shape;
/// it is normalized into an `EffectAction` once, at the middleware boundary.
#[derive(Debug, Clone)]
pub enum Action {
    Plain(Value),
    Effect(EffectAction),
    Declarative(DeclarativePromise),
}

impl Action {
    pub fn plain(value: Value) -> Self {
        Self::Plain(value)
    }

    /// The `type` field of a plain action or the tag of an effect action.
    pub fn action_type(&self) -> Option<&str> {
        match self {
            Self::Plain(value) => value.get("type").and_then(Value::as_str),
            Self::Effect(effect) => Some(effect.tag()),
            Self::Declarative(promise) => promise.action().get("type").and_then(Value::as_str),
        }
    }

    /// JSON description of the action, without callbacks.
    ///
    /// This is what a reducer sees when an effect action reaches it.
    pub fn describe(&self) -> Value {
        match self {
            Self::Plain(value) => value.clone(),
            Self::Effect(effect) => effect.describe(),
            Self::Declarative(promise) => promise.action().clone(),
        }
    }
}

impl From<Value> for Action {
    fn from(value: Value) -> Self {
        Self::Plain(value)
    }
}

impl From<EffectAction> for Action {
    fn from(effect: EffectAction) -> Self {
        Self::Effect(effect)
    }
}

impl From<DeclarativePromise> for Action {
    fn from(promise: DeclarativePromise) -> Self {
        Self::Declarative(promise)
    }
}

/// An action whose payload describes a side effect to run.
#[derive(Debug, Clone)]
pub struct EffectAction {
    tag: String,
    payload: Value,
    continuations: Option<Vec<ContinuationStep>>,
}

impl EffectAction {
    pub fn new(payload: Value) -> Self {
        Self {
            tag: EFFECT.to_string(),
            payload,
            continuations: None,
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Replace the continuation forest.
    pub fn with_continuations(mut self, steps: Vec<ContinuationStep>) -> Self {
        self.continuations = Some(steps);
        self
    }

    /// Append one top-level continuation step.
    pub fn step(mut self, step: ContinuationStep) -> Self {
        self.continuations.get_or_insert_with(Vec::new).push(step);
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn continuations(&self) -> Option<&[ContinuationStep]> {
        self.continuations.as_deref()
    }

    pub fn into_parts(self) -> (Value, Vec<ContinuationStep>) {
        (self.payload, self.continuations.unwrap_or_default())
    }

    pub fn describe(&self) -> Value {
        json!({ "type": self.tag, "payload": self.payload })
    }
}

/// Build a single-step effect action.
pub fn bind(
    payload: Value,
    on_success: Option<OnSuccess>,
    on_failure: Option<OnFailure>,
) -> EffectAction {
    EffectAction::new(payload).step(ContinuationStep::from_parts(on_success, on_failure))
}

/// Result of a dispatch call.
#[derive(Debug)]
pub enum Dispatched {
    /// Whatever the reducer end of the pipeline returned (the action itself).
    Value(Value),
    /// An effect was started; its continuations run in the background.
    Effect(EffectHandle),
}

impl Dispatched {
    /// The value a parent continuation step passes to its children.
    ///
    /// Effect dispatches yield `null` and are detached.
    pub fn into_value(self) -> Value {
        match self {
            Self::Value(value) => value,
            Self::Effect(_) => Value::Null,
        }
    }

    pub fn into_effect(self) -> Option<EffectHandle> {
        match self {
            Self::Effect(handle) => Some(handle),
            Self::Value(_) => None,
        }
    }

    pub fn is_effect(&self) -> bool {
        matches!(self, Self::Effect(_))
    }
}

/// Handle on the continuation forest of one effect dispatch.
///
/// Dropping the handle detaches the forest; it still runs to completion.
#[derive(Debug)]
pub struct EffectHandle {
    task: JoinHandle<()>,
}

impl EffectHandle {
    pub(crate) fn new(task: JoinHandle<()>) -> Self {
        Self { task }
    }

    /// Wait until every branch of the forest has settled.
    pub async fn settled(self) -> Result<(), EffectError> {
        self.task
            .await
            .map_err(|e| EffectError::Aborted(e.to_string()))
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
