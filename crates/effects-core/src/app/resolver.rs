//! Continuation resolver.
//!
//! Walks a continuation forest against the settlement of one effect. Every
//! node's own settlement is an explicit shared future: siblings observe the
//! same upstream future, children observe their parent's.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use futures::future::{self, BoxFuture, FutureExt, Shared};
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::{
    Action, ContinuationStep, EffectError, OnFailure, OnSuccess, Resolution, Settled,
};
use crate::ports::DispatchResult;

/// How derived actions get dispatched.
pub type DispatchFn = Arc<dyn Fn(Action) -> DispatchResult + Send + Sync>;

/// A settlement observed by more than one step.
type Settlement = Shared<BoxFuture<'static, Settled>>;

/// Resolve `initial` and run `steps` against it.
///
/// The returned future completes once the initial settlement and every branch
/// of the forest have settled. Dropping it cancels whatever has not run yet.
pub fn resolve(
    initial: Resolution,
    steps: Vec<ContinuationStep>,
    dispatch: DispatchFn,
) -> BoxFuture<'static, ()> {
    let upstream = initial.into_future().shared();
    let root = upstream.clone();
    let forest = walk(upstream, steps, dispatch);

    // The effect runs even when nothing observes it. A failed root is left to
    // the steps; nothing is logged for it here.
    future::join(root, forest).map(|_| ()).boxed()
}

fn walk(upstream: Settlement, steps: Vec<ContinuationStep>, dispatch: DispatchFn) -> BoxFuture<'static, ()> {
    let branches: Vec<BoxFuture<'static, ()>> = steps
        .into_iter()
        .map(|step| {
            let ContinuationStep {
                on_success,
                on_failure,
                next,
            } = step;
            let is_leaf = next.is_empty();
            let settled = react(upstream.clone(), on_success, on_failure, is_leaf, dispatch.clone())
                .boxed()
                .shared();
            let children = walk(settled.clone(), next, dispatch.clone());

            async move {
                let _ = settled.await;
                children.await;
            }
            .boxed()
        })
        .collect();

    future::join_all(branches).map(|_| ()).boxed()
}

/// Settle one step: run the matching callback and dispatch what it returns.
async fn react(
    upstream: Settlement,
    on_success: Option<OnSuccess>,
    on_failure: Option<OnFailure>,
    is_leaf: bool,
    dispatch: DispatchFn,
) -> Settled {
    let produced = match upstream.await {
        Ok(value) => match on_success {
            Some(callback) => invoke(|| callback(value)),
            None => return Ok(value),
        },
        Err(err) => match on_failure {
            Some(callback) => invoke(|| callback(err)),
            None => {
                if is_leaf {
                    debug!(error = %err, "failure reached a leaf without on_failure");
                }
                return Err(err);
            }
        },
    };

    match produced? {
        Some(action) => match dispatch(action) {
            Ok(dispatched) => Ok(dispatched.into_value()),
            Err(err) => {
                warn!(error = %err, "dispatch of continuation action failed");
                Err(err)
            }
        },
        None => Ok(Value::Null),
    }
}

fn invoke<F>(callback: F) -> Result<Option<Action>, EffectError>
where
    F: FnOnce() -> Result<Option<Action>, EffectError>,
{
    catch_unwind(AssertUnwindSafe(callback))
        .unwrap_or_else(|panic| Err(EffectError::CallbackPanicked(panic_message(panic.as_ref()))))
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
