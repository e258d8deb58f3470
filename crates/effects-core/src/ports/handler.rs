//! EffectHandler port - one link of the handler chain.

use std::sync::Arc;

use serde_json::Value;

use super::store::StoreApi;
use crate::domain::Resolution;

/// The remainder of the handler chain, ending at the unhandled fallback.
pub type EffectNext = Arc<dyn Fn(Value) -> Resolution + Send + Sync>;

/// EffectHandler either resolves a payload itself or passes it on.
///
/// Passing on means calling `next(payload)` and returning its resolution.
/// The synchronous part runs inside `dispatch`; anything asynchronous goes
/// into `Resolution::Pending` / `Resolution::Join`.
///
/// # Example
/// ```ignore
/// let fetch = handler_fn(|_store, payload, next| {
///     if payload["type"] == "fetch" {
///         Resolution::future(async move { Ok(json!({ "status": 200 })) })
///     } else {
///         next(payload)
///     }
/// });
/// ```
pub trait EffectHandler: Send + Sync {
    fn handle(&self, store: &Arc<dyn StoreApi>, payload: Value, next: &EffectNext) -> Resolution;
}

impl<F> EffectHandler for F
where
    F: Fn(&Arc<dyn StoreApi>, Value, &EffectNext) -> Resolution + Send + Sync,
{
    fn handle(&self, store: &Arc<dyn StoreApi>, payload: Value, next: &EffectNext) -> Resolution {
        self(store, payload, next)
    }
}

/// Pin a closure to the handler signature so its argument types are inferred.
pub fn handler_fn<F>(f: F) -> F
where
    F: Fn(&Arc<dyn StoreApi>, Value, &EffectNext) -> Resolution + Send + Sync,
{
    f
}
