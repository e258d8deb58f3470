//! Legacy "declarative promise" action shape.
//!
//! Older action creators build an effect as a root promise carrying the raw
//! action JSON plus a linear chain of steps, where every step observes the
//! previous one. Such values are converted into the canonical `EffectAction`
//! exactly once, when they enter the middleware.

use serde_json::Value;

use super::action::EffectAction;
use super::continuation::{ContinuationStep, OnFailure, OnSuccess};
use super::errors::EffectError;

#[derive(Debug, Clone)]
pub struct DeclarativePromise {
    action: Value,
    root: bool,
    chain: Vec<ContinuationStep>,
}

impl DeclarativePromise {
    /// A root promise wrapping `{ "type": <tag>, "payload": ... }`.
    pub fn new(action: Value) -> Self {
        Self {
            action,
            root: true,
            chain: Vec::new(),
        }
    }

    /// A promise that is not a root. It cannot be dispatched on its own.
    pub fn detached(action: Value) -> Self {
        Self {
            action,
            root: false,
            chain: Vec::new(),
        }
    }

    /// Attach the next link of the chain.
    pub fn step(self, on_success: Option<OnSuccess>, on_failure: Option<OnFailure>) -> Self {
        self.then(ContinuationStep::from_parts(on_success, on_failure))
    }

    pub fn then(mut self, step: ContinuationStep) -> Self {
        self.chain.push(step);
        self
    }

    pub fn action(&self) -> &Value {
        &self.action
    }

    pub fn is_root(&self) -> bool {
        self.root
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Convert into the canonical effect action.
    ///
    /// The linear chain `a -> b -> c` becomes the single-path tree
    /// `a.next = [b]`, `b.next = [c]`.
    pub fn to_canonical(self) -> Result<EffectAction, EffectError> {
        if !self.root {
            return Err(EffectError::MalformedAction(
                "declarative promise is not a root".to_string(),
            ));
        }

        let tag = self
            .action
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                EffectError::MalformedAction(
                    "declarative promise action has no string `type`".to_string(),
                )
            })?
            .to_string();
        let payload = self.action.get("payload").cloned().unwrap_or(Value::Null);

        let tree = self.chain.into_iter().rev().fold(None, |child, mut step| {
            if let Some(child) = child {
                step.next.push(child);
            }
            Some(step)
        });

        let effect = EffectAction::new(payload).with_tag(tag);
        Ok(match tree {
            Some(step) => effect.with_continuations(vec![step]),
            None => effect,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::action::{Action, EFFECT};
    use crate::domain::continuation::success;
    use serde_json::json;

    #[test]
    fn chain_becomes_single_path_tree() {
        let promise = DeclarativePromise::new(json!({ "type": EFFECT, "payload": { "type": "fetch" } }))
            .step(Some(success(|v| Some(Action::plain(v)))), None)
            .then(ContinuationStep::new())
            .then(ContinuationStep::new().on_failure(|_| None));
        assert_eq!(promise.len(), 3);

        let effect = promise.to_canonical().unwrap();
        assert_eq!(effect.tag(), EFFECT);
        assert_eq!(effect.payload(), &json!({ "type": "fetch" }));

        let roots = effect.continuations().unwrap();
        assert_eq!(roots.len(), 1);
        assert!(roots[0].has_on_success());
        assert_eq!(roots[0].size(), 3);

        let last = &roots[0].children()[0].children()[0];
        assert!(last.has_on_failure());
        assert!(last.children().is_empty());
    }

    #[test]
    fn empty_chain_has_no_continuations() {
        let effect = DeclarativePromise::new(json!({ "type": EFFECT }))
            .to_canonical()
            .unwrap();
        assert_eq!(effect.payload(), &Value::Null);
        assert!(effect.continuations().is_none());
    }

    #[test]
    fn detached_promise_is_rejected() {
        let err = DeclarativePromise::detached(json!({ "type": EFFECT, "payload": {} }))
            .to_canonical()
            .unwrap_err();
        assert!(matches!(err, EffectError::MalformedAction(_)));
    }

    #[test]
    fn missing_type_is_rejected() {
        let err = DeclarativePromise::new(json!({ "payload": {} }))
            .to_canonical()
            .unwrap_err();
        assert!(matches!(err, EffectError::MalformedAction(msg) if msg.contains("type")));
    }
}
