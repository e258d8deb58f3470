//! Continuation steps: success/failure callbacks attached to an effect.
//!
//! Steps form a forest. Every step reacts to the settlement of its parent
//! (or of the effect itself, for top-level steps) and its own settlement is
//! what its `next` children observe.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::action::Action;
use super::errors::EffectError;

/// Reaction to a successful settlement.
pub type OnSuccess = Arc<dyn Fn(Value) -> Result<Option<Action>, EffectError> + Send + Sync>;

/// Reaction to a failed settlement.
pub type OnFailure = Arc<dyn Fn(EffectError) -> Result<Option<Action>, EffectError> + Send + Sync>;

/// Wrap an infallible success callback.
pub fn success<F>(f: F) -> OnSuccess
where
    F: Fn(Value) -> Option<Action> + Send + Sync + 'static,
{
    Arc::new(move |value: Value| -> Result<Option<Action>, EffectError> { Ok(f(value)) })
}

/// Wrap an infallible failure callback.
pub fn failure<F>(f: F) -> OnFailure
where
    F: Fn(EffectError) -> Option<Action> + Send + Sync + 'static,
{
    Arc::new(move |err: EffectError| -> Result<Option<Action>, EffectError> { Ok(f(err)) })
}

/// A success/failure callback pair with optional nested children.
///
/// A step with neither callback is a pass-through: its children observe the
/// same settlement it did.
#[derive(Clone, Default)]
pub struct ContinuationStep {
    pub(crate) on_success: Option<OnSuccess>,
    pub(crate) on_failure: Option<OnFailure>,
    pub(crate) next: Vec<ContinuationStep>,
}

impl ContinuationStep {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: Fn(Value) -> Option<Action> + Send + Sync + 'static,
    {
        self.on_success = Some(success(f));
        self
    }

    pub fn try_on_success<F>(mut self, f: F) -> Self
    where
        F: Fn(Value) -> Result<Option<Action>, EffectError> + Send + Sync + 'static,
    {
        self.on_success = Some(Arc::new(f));
        self
    }

    pub fn on_failure<F>(mut self, f: F) -> Self
    where
        F: Fn(EffectError) -> Option<Action> + Send + Sync + 'static,
    {
        self.on_failure = Some(failure(f));
        self
    }

    pub fn try_on_failure<F>(mut self, f: F) -> Self
    where
        F: Fn(EffectError) -> Result<Option<Action>, EffectError> + Send + Sync + 'static,
    {
        self.on_failure = Some(Arc::new(f));
        self
    }

    /// Append a child step, run after this step settles.
    pub fn then(mut self, child: ContinuationStep) -> Self {
        self.next.push(child);
        self
    }

    pub fn with_next(mut self, children: Vec<ContinuationStep>) -> Self {
        self.next = children;
        self
    }

    pub(crate) fn from_parts(
        on_success: Option<OnSuccess>,
        on_failure: Option<OnFailure>,
    ) -> Self {
        Self {
            on_success,
            on_failure,
            next: Vec::new(),
        }
    }

    pub fn has_on_success(&self) -> bool {
        self.on_success.is_some()
    }

    pub fn has_on_failure(&self) -> bool {
        self.on_failure.is_some()
    }

    pub fn children(&self) -> &[ContinuationStep] {
        &self.next
    }

    /// Number of steps in this subtree, this one included.
    pub fn size(&self) -> usize {
        1 + self.next.iter().map(ContinuationStep::size).sum::<usize>()
    }
}

impl fmt::Debug for ContinuationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContinuationStep")
            .field("on_success", &self.on_success.is_some())
            .field("on_failure", &self.on_failure.is_some())
            .field("next", &self.next)
            .finish()
    }
}
